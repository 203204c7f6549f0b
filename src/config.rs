//! Viewer configuration: shared constants plus an optional JSON block embedded
//! in the host page.

use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Edge length of one cell in screen units at scale 1.
pub const PIXEL_SIZE: f64 = 50.0;

/// Fraction by which one wheel notch grows or shrinks the scale.
pub const ZOOM_STEP: f64 = 0.1;

/// Smallest scale a zoom step may reach; steps below it are refused.
pub const MIN_SCALE: f64 = 1e-3;

/// Largest scale a zoom step may reach; steps above it are refused.
pub const MAX_SCALE: f64 = 1e3;

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

/// Origin added to grid coordinates before they are shown to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PictureStart {
    pub x: i64,
    pub y: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub image_src: String,
    pub pixel_size: f64,
    pub zoom_step: f64,
    pub picture_start_point: PictureStart,
    pub highlight_color: String,
    /// Outline width in screen pixels, independent of zoom.
    pub highlight_width: f64,
    pub background: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            image_src: "picture.png".to_string(),
            pixel_size: PIXEL_SIZE,
            zoom_step: ZOOM_STEP,
            picture_start_point: PictureStart::default(),
            highlight_color: "#ff0000".to_string(),
            highlight_width: 3.0,
            background: "#ffffff".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parse overrides from JSON; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::sanitized)
    }

    /// Read the page's config block, falling back to defaults.
    #[must_use]
    pub fn from_document() -> Self {
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        else {
            return Self::default();
        };
        let raw = element
            .dyn_ref::<HtmlElement>()
            .map(HtmlElement::inner_text)
            .or_else(|| element.text_content())
            .unwrap_or_default();
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed #{CONFIG_ELEMENT_ID}: {err}");
                Self::default()
            }
        }
    }

    /// Replace values that would break the viewport invariants.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            self.pixel_size = defaults.pixel_size;
        }
        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            self.zoom_step = defaults.zoom_step;
        }
        if !(self.highlight_width.is_finite() && self.highlight_width >= 0.0) {
            self.highlight_width = defaults.highlight_width;
        }
        self
    }
}
