use super::{info_panel::InfoPanel, pixel_canvas::PixelCanvas};
use crate::config::ViewerConfig;
use crate::model::{Cell, Grid};
use crate::source::PictureLoader;
use std::rc::Rc;
use yew::prelude::*;

enum Picture {
    Loading,
    Ready(Rc<Grid>),
    Failed(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| ViewerConfig::from_document());
    let picture = use_state(|| Picture::Loading);
    let active = use_state(|| None::<Cell>);

    // Load the picture once and build its grid
    {
        let picture = picture.clone();
        use_effect_with(config.image_src.clone(), move |src| {
            let on_done = {
                let picture = picture.clone();
                move |result: Result<Grid, crate::error::ViewerError>| match result {
                    Ok(grid) => {
                        log::info!(
                            "picture loaded: {}x{} cells",
                            grid.column_count(0),
                            grid.row_count()
                        );
                        picture.set(Picture::Ready(Rc::new(grid)));
                    }
                    Err(err) => {
                        log::error!("{err}");
                        picture.set(Picture::Failed(err.to_string()));
                    }
                }
            };
            let loader = match PictureLoader::start(src, on_done) {
                Ok(loader) => Some(loader),
                Err(err) => {
                    log::error!("{err}");
                    picture.set(Picture::Failed(err.to_string()));
                    None
                }
            };
            move || drop(loader)
        });
    }

    let on_active_change = {
        let active = active.clone();
        Callback::from(move |cell: Option<Cell>| active.set(cell))
    };

    let message_style = "display:flex; width:100%; height:100%; align-items:center; justify-content:center; color:#8b949e; background:#0e1116;";
    let (content, size) = match &*picture {
        Picture::Loading => (
            html! { <div style={message_style}>{"Loading picture…"}</div> },
            None,
        ),
        Picture::Failed(msg) => (
            html! { <div style={format!("{message_style} color:#f85149;")}>{ msg.clone() }</div> },
            None,
        ),
        Picture::Ready(grid) if grid.is_empty() => (
            html! { <div style={message_style}>{"The picture has no pixels"}</div> },
            Some((0, 0)),
        ),
        Picture::Ready(grid) => (
            html! { <PixelCanvas grid={grid.clone()} config={config.clone()} on_active_change={on_active_change} /> },
            Some((grid.column_count(0), grid.row_count())),
        ),
    };

    html! {<div style="display:flex; width:100vw; height:100vh; background:#0e1116;">
        <div style="position:relative; flex:1; min-width:0;">{ content }</div>
        <InfoPanel cell={*active} origin={config.picture_start_point} size={size} />
    </div>}
}
