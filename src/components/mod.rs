pub mod app;
pub mod info_panel;
pub mod pixel_canvas;
pub mod viewport_controls;
