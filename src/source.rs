//! Grid source: load the picture through an `<img>` element and read its
//! pixels back into a [`Grid`].

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use crate::error::ViewerError;
use crate::model::{build_grid, Bitmap, Grid};
use crate::surface::context_2d;
use crate::util::js_error_message;

/// Read the RGBA samples of a fully loaded image via a transient canvas.
pub fn decode_image(image: &HtmlImageElement) -> Result<Bitmap, ViewerError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(ViewerError::SurfaceUnavailable)?;
    let canvas = document
        .create_element("canvas")
        .map_err(|_| ViewerError::SurfaceUnavailable)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ViewerError::SurfaceUnavailable)?;
    let (width, height) = (image.natural_width(), image.natural_height());
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = context_2d(&canvas)?;
    if width == 0 || height == 0 {
        return Bitmap::new(width, height, Vec::new());
    }
    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|e| ViewerError::ImageDecode(js_error_message(&e)))?;
    let data = ctx
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(|e| ViewerError::ImageDecode(js_error_message(&e)))?;
    Bitmap::new(width, height, data.data().0)
}

/// An in-flight image load. Dropping it detaches the handlers, so a late
/// `onload` after teardown does nothing.
pub struct PictureLoader {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl PictureLoader {
    /// Start loading `src`; `on_done` receives the grid or the failure.
    pub fn start(
        src: &str,
        on_done: impl Fn(Result<Grid, ViewerError>) + 'static,
    ) -> Result<Self, ViewerError> {
        let image = HtmlImageElement::new().map_err(|e| ViewerError::Dom(js_error_message(&e)))?;
        let on_done = std::rc::Rc::new(on_done);

        let onload = {
            let image = image.clone();
            let on_done = on_done.clone();
            Closure::wrap(Box::new(move || {
                let result = decode_image(&image).map(|bitmap| build_grid(&bitmap));
                on_done(result);
            }) as Box<dyn FnMut()>)
        };
        let onerror = {
            let src = src.to_string();
            Closure::wrap(Box::new(move || {
                on_done(Err(ViewerError::ImageLoad(src.clone())));
            }) as Box<dyn FnMut()>)
        };

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        // Same-origin or CORS-enabled sources keep the decode canvas readable.
        image.set_cross_origin(Some("anonymous"));
        image.set_src(src);

        Ok(Self {
            image,
            _onload: onload,
            _onerror: onerror,
        })
    }
}

impl Drop for PictureLoader {
    fn drop(&mut self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}
