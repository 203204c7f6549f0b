mod components;
mod config;
mod error;
mod model;
mod render;
mod source;
mod state;
mod surface;
mod util;

use components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("console logger unavailable: {err}").into());
    }
    log::info!("pixel inspector starting");
    yew::Renderer::<App>::new().render();
}
