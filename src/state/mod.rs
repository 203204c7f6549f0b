pub mod camera;
pub mod drag;
pub mod touch;
pub mod viewport;

pub use camera::ViewportState;
pub use drag::DragState;
pub use touch::PinchState;
pub use viewport::ViewportEngine;
