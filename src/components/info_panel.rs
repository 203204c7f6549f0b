use crate::config::PictureStart;
use crate::model::Cell;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct InfoPanelProps {
    pub cell: Option<Cell>,
    /// Added to the 0-based grid coordinates before display.
    pub origin: PictureStart,
    /// Picture size in cells, once loaded.
    pub size: Option<(usize, usize)>,
}

/// Displayed coordinates of `cell` relative to `origin`.
pub fn display_coords(cell: &Cell, origin: PictureStart) -> (i64, i64) {
    (
        i64::from(cell.position.x) + origin.x,
        i64::from(cell.position.y) + origin.y,
    )
}

#[function_component(InfoPanel)]
pub fn info_panel(props: &InfoPanelProps) -> Html {
    let panel_style = "width:260px; flex-shrink:0; box-sizing:border-box; height:100%; \
        background:rgba(22,27,34,0.95); border-left:1px solid #30363d; \
        padding:12px 16px; font-size:13px; color:#c9d1d9; overflow:auto;";
    let header_style = "font-weight:600; font-size:15px; margin-bottom:8px;";
    let section_style = "margin-top:10px; padding-top:8px; border-top:1px solid #30363d;";
    let stat_row_style =
        "display:flex; justify-content:space-between; margin:4px 0; font-size:12px;";
    let stat_label_style = "color:#8b949e;";
    let stat_value_style = "font-weight:500; font-variant-numeric:tabular-nums;";

    let size_row = match props.size {
        Some((w, h)) => html! {
            <div style={stat_row_style}>
                <span style={stat_label_style}>{"Picture"}</span>
                <span style={stat_value_style}>{format!("{w} x {h}")}</span>
            </div>
        },
        None => html! {},
    };

    let body = match &props.cell {
        Some(cell) => {
            let (x, y) = display_coords(cell, props.origin);
            let c = cell.color;
            html! {
                <div style={section_style}>
                    <div style="display:flex; align-items:center; gap:10px; margin-bottom:8px;">
                        <span style={format!("display:inline-block; width:28px; height:28px; border:1px solid #30363d; border-radius:4px; background:{};", c.css_rgba())}></span>
                        <span style="font-weight:600;">{c.hex()}</span>
                    </div>
                    <div style={stat_row_style}>
                        <span style={stat_label_style}>{"X"}</span>
                        <span style={stat_value_style}>{x}</span>
                    </div>
                    <div style={stat_row_style}>
                        <span style={stat_label_style}>{"Y"}</span>
                        <span style={stat_value_style}>{y}</span>
                    </div>
                    <div style={stat_row_style}>
                        <span style={stat_label_style}>{"RGBA"}</span>
                        <span style={stat_value_style}>{format!("{}, {}, {}, {}", c.r, c.g, c.b, c.a)}</span>
                    </div>
                </div>
            }
        }
        None => html! {
            <div style={section_style}>
                <div style="font-size:11px; color:#8b949e;">
                    {"Hover over the picture to inspect a pixel"}
                </div>
            </div>
        },
    };

    html! {
        <div style={panel_style}>
            <div style={header_style}>{"Pixel"}</div>
            {size_row}
            {body}
            <div style={section_style}>
                <div style="font-size:11px; color:#8b949e; line-height:1.5;">
                    {"Drag to pan, scroll or pinch to zoom"}
                </div>
            </div>
        </div>
    }
}
