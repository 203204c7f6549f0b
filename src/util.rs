// DOM helpers shared by the components
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, Touch};

use crate::model::Point;

/// Readable text for an error thrown by a web API.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Client coordinates relative to the top-left corner of `element`.
pub fn local_point(element: &Element, client_x: f64, client_y: f64) -> Point {
    let rect = element.get_bounding_client_rect();
    Point::new(client_x - rect.left(), client_y - rect.top())
}

/// Whether a point from [`local_point`] lies inside `element`'s box.
pub fn contains(element: &Element, local: Point) -> bool {
    let rect = element.get_bounding_client_rect();
    local.x >= 0.0 && local.y >= 0.0 && local.x < rect.width() && local.y < rect.height()
}

pub fn touch_point(element: &Element, touch: &Touch) -> Point {
    local_point(element, f64::from(touch.client_x()), f64::from(touch.client_y()))
}

/// A DOM listener that unregisters itself when dropped.
pub struct EventListener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        name: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            name,
            closure,
        })
    }

    /// Like [`EventListener::new`], but registered as non-passive so the
    /// handler may call `prevent_default` on scroll and touch events.
    pub fn new_active(
        target: &EventTarget,
        name: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            name,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("removing {} listener failed: {}", self.name, js_error_message(&err));
        }
    }
}
