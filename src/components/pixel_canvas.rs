use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent, Window};
use yew::prelude::*;

use super::viewport_controls::ViewportControls;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::model::{Cell, Grid, Point};
use crate::render::Style;
use crate::state::ViewportEngine;
use crate::surface::CanvasSurface;
use crate::util::{contains, js_error_message, local_point, touch_point, EventListener};

#[derive(Properties, PartialEq, Clone)]
pub struct PixelCanvasProps {
    pub grid: Rc<Grid>,
    pub config: Rc<ViewerConfig>,
    pub on_active_change: Callback<Option<Cell>>,
}

type DrawSlot = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Runs an engine operation, then redraws immediately and reports the scale.
#[derive(Clone)]
struct Dispatch {
    engine: Rc<RefCell<ViewportEngine>>,
    draw: Rc<dyn Fn()>,
    on_scale: Callback<f64>,
}

impl Dispatch {
    fn apply(&self, op: impl FnOnce(&mut ViewportEngine)) {
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            log::debug!("engine busy, event dropped");
            return;
        };
        let before = engine.viewport().scale;
        op(&mut *engine);
        let after = engine.viewport().scale;
        drop(engine);
        (self.draw)();
        if after != before {
            self.on_scale.emit(after);
        }
    }
}

/// `requestAnimationFrame` loop; stops rescheduling once dropped.
struct RenderLoop {
    window: Window,
    running: Rc<RefCell<bool>>,
    frame_id: Rc<RefCell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl RenderLoop {
    fn start(window: &Window, draw: Rc<dyn Fn()>) -> Self {
        let running = Rc::new(RefCell::new(true));
        let frame_id = Rc::new(RefCell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        {
            let running = running.clone();
            let frame_id = frame_id.clone();
            let callback_next = callback.clone();
            let window_loop = window.clone();
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                if !*running.borrow() {
                    return;
                }
                draw();
                if let Some(cb) = callback_next.borrow().as_ref() {
                    schedule(&window_loop, cb, &frame_id);
                }
            }) as Box<dyn FnMut()>));
        }
        if let Some(cb) = callback.borrow().as_ref() {
            schedule(window, cb, &frame_id);
        }
        Self {
            window: window.clone(),
            running,
            frame_id,
            callback,
        }
    }
}

fn schedule(window: &Window, cb: &Closure<dyn FnMut()>, frame_id: &RefCell<Option<i32>>) {
    match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        Ok(id) => *frame_id.borrow_mut() = Some(id),
        Err(err) => log::warn!("requestAnimationFrame failed: {}", js_error_message(&err)),
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        *self.running.borrow_mut() = false;
        if let Some(id) = self.frame_id.borrow_mut().take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {}", js_error_message(&err));
            }
        }
        // Breaks the closure's reference to its own cell.
        self.callback.borrow_mut().take();
    }
}

/// Everything installed on mount; dropping it tears the viewer down.
struct Mounted {
    _listeners: Vec<EventListener>,
    _render_loop: RenderLoop,
}

fn touches_at(canvas: &HtmlCanvasElement, touches: &TouchList) -> Vec<Point> {
    (0..touches.length())
        .filter_map(|i| touches.item(i))
        .map(|t| touch_point(canvas, &t))
        .collect()
}

fn mount(
    canvas: HtmlCanvasElement,
    engine: Rc<RefCell<ViewportEngine>>,
    style: Style,
    draw_slot: &DrawSlot,
    on_scale: Callback<f64>,
) -> Result<Mounted, ViewerError> {
    let window = web_sys::window().ok_or(ViewerError::SurfaceUnavailable)?;
    let surface = Rc::new(CanvasSurface::new(canvas, style)?);
    surface.fit_to_container();

    let draw: Rc<dyn Fn()> = {
        let surface = surface.clone();
        let engine = engine.clone();
        Rc::new(move || {
            let Ok(engine) = engine.try_borrow() else {
                return;
            };
            if let Err(err) = surface.render(&*engine) {
                log::warn!("render failed: {}", js_error_message(&err));
            }
        })
    };
    *draw_slot.borrow_mut() = Some(draw.clone());
    draw();

    let dispatch = Dispatch {
        engine,
        draw: draw.clone(),
        on_scale,
    };
    let canvas_target: &EventTarget = surface.canvas().as_ref();
    let window_target: &EventTarget = window.as_ref();
    let dom = |err: wasm_bindgen::JsValue| ViewerError::Dom(js_error_message(&err));
    let mut listeners = Vec::new();

    // Mouse: press on the canvas, track and release on the window so a drag
    // keeps following the pointer outside the canvas.
    {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new(canvas_target, "mousedown", move |e| {
                let Some(e) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if e.button() != 0 {
                    return;
                }
                let p = local_point(surface.canvas(), f64::from(e.client_x()), f64::from(e.client_y()));
                dispatch.apply(|engine| engine.drag_start(p));
            })
            .map_err(dom)?,
        );
    }
    {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new(window_target, "mousemove", move |e| {
                let Some(e) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let canvas = surface.canvas();
                let p = local_point(canvas, f64::from(e.client_x()), f64::from(e.client_y()));
                let inside = contains(canvas, p);
                dispatch.apply(|engine| {
                    if engine.is_dragging() || inside {
                        engine.pointer_move(p);
                    } else {
                        engine.pointer_out();
                    }
                });
            })
            .map_err(dom)?,
        );
    }
    {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new(window_target, "mouseup", move |e| {
                let Some(e) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let canvas = surface.canvas();
                let p = local_point(canvas, f64::from(e.client_x()), f64::from(e.client_y()));
                let at = contains(canvas, p).then_some(p);
                dispatch.apply(|engine| engine.pointer_up(at));
            })
            .map_err(dom)?,
        );
    }
    {
        let dispatch = dispatch.clone();
        listeners.push(
            EventListener::new(canvas_target, "mouseleave", move |_e| {
                dispatch.apply(|engine| {
                    if !engine.is_dragging() {
                        engine.pointer_out();
                    }
                });
            })
            .map_err(dom)?,
        );
    }

    // Wheel zoom, anchored at the cursor
    {
        let dispatch = dispatch.clone();
        listeners.push(
            EventListener::new_active(canvas_target, "wheel", move |e| {
                let Some(e) = e.dyn_ref::<WheelEvent>() else {
                    return;
                };
                e.prevent_default();
                let p = Point::new(f64::from(e.offset_x()), f64::from(e.offset_y()));
                let delta = e.delta_y();
                dispatch.apply(|engine| {
                    engine.wheel(p, delta);
                    engine.hover(p);
                });
            })
            .map_err(dom)?,
        );
    }

    // Touch: one finger pans, two fingers pinch
    {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new_active(canvas_target, "touchstart", move |e| {
                let Some(e) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                e.prevent_default();
                let points = touches_at(surface.canvas(), &e.touches());
                dispatch.apply(|engine| match points.as_slice() {
                    [p] => {
                        engine.pinch_end();
                        engine.hover(*p);
                        engine.drag_start(*p);
                    }
                    [a, b, ..] => {
                        engine.drag_end();
                        engine.pinch_start(*a, *b);
                    }
                    [] => {}
                });
            })
            .map_err(dom)?,
        );
    }
    {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new_active(canvas_target, "touchmove", move |e| {
                let Some(e) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                e.prevent_default();
                let points = touches_at(surface.canvas(), &e.touches());
                dispatch.apply(|engine| match points.as_slice() {
                    [p] => {
                        engine.drag_move(*p);
                    }
                    [a, b, ..] => {
                        engine.pinch_change(*a, *b);
                    }
                    [] => {}
                });
            })
            .map_err(dom)?,
        );
    }
    for name in ["touchend", "touchcancel"] {
        let dispatch = dispatch.clone();
        let surface = surface.clone();
        listeners.push(
            EventListener::new_active(canvas_target, name, move |e| {
                let Some(e) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                e.prevent_default();
                let points = touches_at(surface.canvas(), &e.touches());
                dispatch.apply(|engine| {
                    if let Some(distance) = engine.pinch().start_distance {
                        log::debug!("pinch ended at distance {distance:.1}");
                    }
                    engine.touch_end(&points);
                });
            })
            .map_err(dom)?,
        );
    }

    // WebKit also reports pinches as gesture events. The two-touch handlers
    // above already drive the zoom, so these are only suppressed to stop the
    // page itself from zooming.
    for name in ["gesturestart", "gesturechange", "contextmenu"] {
        listeners.push(
            EventListener::new_active(canvas_target, name, |e| e.prevent_default()).map_err(dom)?,
        );
    }

    {
        let surface = surface.clone();
        let draw = draw.clone();
        listeners.push(
            EventListener::new(window_target, "resize", move |_e| {
                surface.fit_to_container();
                draw();
            })
            .map_err(dom)?,
        );
    }

    let render_loop = RenderLoop::start(&window, draw);
    log::info!("viewer ready");
    Ok(Mounted {
        _listeners: listeners,
        _render_loop: render_loop,
    })
}

fn redraw(draw_slot: &DrawSlot) {
    if let Some(f) = &*draw_slot.borrow() {
        f();
    }
}

#[function_component(PixelCanvas)]
pub fn pixel_canvas(props: &PixelCanvasProps) -> Html {
    let canvas_ref = use_node_ref();
    let engine = {
        let grid = props.grid.clone();
        let config = props.config.clone();
        use_mut_ref(move || ViewportEngine::new(grid, &config))
    };
    let draw_ref: DrawSlot = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let scale = use_state(|| 1.0_f64);
    let failure = use_state(|| None::<String>);

    // Main mount effect (surface, events, render loop)
    {
        let canvas_ref = canvas_ref.clone();
        let engine = engine.clone();
        let draw_ref = draw_ref.clone();
        let failure = failure.clone();
        let on_active_change = props.on_active_change.clone();
        let on_scale = {
            let scale = scale.clone();
            Callback::from(move |s: f64| scale.set(s))
        };
        let style = Style {
            background: props.config.background.clone(),
            highlight_color: props.config.highlight_color.clone(),
            highlight_width: props.config.highlight_width,
        };
        use_effect_with((), move |_| {
            engine.borrow_mut().set_observer(move |cell: Option<Cell>| {
                log::debug!("active cell: {:?}", cell.map(|c| c.position));
                on_active_change.emit(cell);
            });
            let mounted = match canvas_ref.cast::<HtmlCanvasElement>() {
                Some(canvas) => mount(canvas, engine.clone(), style, &draw_ref, on_scale),
                None => Err(ViewerError::SurfaceUnavailable),
            };
            let mounted = match mounted {
                Ok(mounted) => Some(mounted),
                Err(err) => {
                    log::error!("viewer failed to start: {err}");
                    failure.set(Some(err.to_string()));
                    None
                }
            };
            move || {
                drop(mounted);
                *draw_ref.borrow_mut() = None;
                engine.borrow_mut().clear_observer();
            }
        });
    }

    let zoom_cb = |delta: f64| {
        let engine = engine.clone();
        let draw_ref = draw_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let scale = scale.clone();
        Callback::from(move |()| {
            let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() else {
                return;
            };
            let center = Point::new(
                f64::from(canvas.width()) * 0.5,
                f64::from(canvas.height()) * 0.5,
            );
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.wheel(center, delta);
                scale.set(engine.viewport().scale);
            }
            redraw(&draw_ref);
        })
    };
    let reset_cb = {
        let engine = engine.clone();
        let draw_ref = draw_ref.clone();
        let scale = scale.clone();
        Callback::from(move |()| {
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.reset_view();
            }
            scale.set(1.0);
            redraw(&draw_ref);
        })
    };

    let failure_overlay = match &*failure {
        Some(msg) => html! {
            <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; color:#f85149; background:#0e1116;">
                { format!("Viewer unavailable: {msg}") }
            </div>
        },
        None => html! {},
    };

    html! {<div style="position:relative; width:100%; height:100%; overflow:hidden;">
        <canvas ref={canvas_ref.clone()} style="display:block; width:100%; height:100%; touch-action:none; cursor:crosshair;"></canvas>
        <ViewportControls on_zoom_in={zoom_cb(-1.0)} on_zoom_out={zoom_cb(1.0)} on_reset={reset_cb} scale={*scale} />
        {failure_overlay}
    </div>}
}
