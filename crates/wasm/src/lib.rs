#![deny(unsafe_code)]
//! Browser host for the glyph field.
//!
//! [`GlyphField::mount`] binds a simulation to an `HtmlCanvasElement`,
//! subscribes to window `pointermove` and `resize`, and drives frames from
//! `requestAnimationFrame`. [`GlyphField::unmount`] tears all three down
//! together.

pub mod canvas;

use canvas::Canvas2dSurface;
use glyph_field_core::{FieldConfig, Simulation, Viewport};
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, Window};

type FrameCallback = Closure<dyn FnMut(f64)>;

struct State {
    sim: Simulation,
    surface: Canvas2dSurface,
    canvas: HtmlCanvasElement,
    pending_frame: Option<i32>,
    running: bool,
}

impl State {
    /// Reads the canvas layout box and sizes the backing store to match.
    fn measure(canvas: &HtmlCanvasElement, window: &Window) -> Result<Viewport, JsError> {
        let rect = canvas.get_bounding_client_rect();
        let dpr = window.device_pixel_ratio();
        let viewport = Viewport::new(rect.width(), rect.height(), dpr)?;
        canvas.set_width(viewport.backing_width());
        canvas.set_height(viewport.backing_height());
        Ok(viewport)
    }
}

struct Mounted {
    window: Window,
    state: Rc<RefCell<State>>,
    on_pointer: Closure<dyn FnMut(PointerEvent)>,
    on_resize: Closure<dyn FnMut()>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
}

impl Mounted {
    /// Subscribes both listeners and requests the first frame.
    fn start(&self) -> Result<(), JsError> {
        self.window
            .add_event_listener_with_callback("pointermove", self.on_pointer.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("failed to subscribe to pointermove"))?;
        self.window
            .add_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("failed to subscribe to resize"))?;
        let handle = {
            let frame = self.frame.borrow();
            let callback = frame
                .as_ref()
                .ok_or_else(|| JsError::new("frame callback missing"))?;
            let handle = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .map_err(|_| JsError::new("requestAnimationFrame failed"))?;
            handle
        };
        self.state.borrow_mut().pending_frame = Some(handle);
        Ok(())
    }

    fn teardown(self) {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.running = false;
            state.pending_frame.take()
        };
        if let Some(handle) = handle {
            let _ = self.window.cancel_animation_frame(handle);
        }
        let _ = self.window.remove_event_listener_with_callback(
            "pointermove",
            self.on_pointer.as_ref().unchecked_ref(),
        );
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
        // Breaks the frame callback's reference to itself.
        self.frame.borrow_mut().take();
    }
}

/// A glyph field mounted on one canvas.
#[wasm_bindgen]
pub struct GlyphField {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl GlyphField {
    /// Mounts a field on `canvas`. `params_json` overrides the default
    /// parameters (see `FieldConfig::param_schema`).
    pub fn mount(canvas: HtmlCanvasElement, params_json: Option<String>) -> Result<GlyphField, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let config = match params_json {
            Some(json) => {
                let params: serde_json::Value = serde_json::from_str(&json)?;
                FieldConfig::from_json(&params)?
            }
            None => FieldConfig::default(),
        };

        let viewport = State::measure(&canvas, &window)?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| JsError::new("2d context request failed"))?
            .ok_or_else(|| JsError::new("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsError::new("unexpected 2d context type"))?;

        let state = Rc::new(RefCell::new(State {
            sim: Simulation::new(config, viewport, entropy_seed(&window))?,
            surface: Canvas2dSurface::new(ctx, viewport),
            canvas,
            pending_frame: None,
            running: true,
        }));

        let on_pointer = {
            let state = state.clone();
            Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
                let mut state = state.borrow_mut();
                // The canvas can move under a fixed pointer when the page scrolls.
                let rect = state.canvas.get_bounding_client_rect();
                let (x, y) = canvas_point(event.client_x(), event.client_y(), rect.left(), rect.top());
                state.sim.pointer_moved(x, y);
            })
        };

        let on_resize = {
            let state = state.clone();
            let window = window.clone();
            Closure::<dyn FnMut()>::new(move || {
                let state = &mut *state.borrow_mut();
                match State::measure(&state.canvas, &window) {
                    Ok(viewport) => {
                        state.surface.resize(viewport);
                        state.sim.resize(viewport);
                    }
                    Err(_) => warn!("ignoring resize to an empty canvas"),
                }
            })
        };

        let frame: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        {
            let state = state.clone();
            let window = window.clone();
            let this = frame.clone();
            *frame.borrow_mut() = Some(Closure::new(move |timestamp_ms: f64| {
                let state = &mut *state.borrow_mut();
                state.pending_frame = None;
                if !state.running {
                    return;
                }
                state.sim.frame(timestamp_ms / 1000.0, &mut state.surface);
                if let Some(callback) = this.borrow().as_ref() {
                    state.pending_frame = window
                        .request_animation_frame(callback.as_ref().unchecked_ref())
                        .ok();
                }
            }));
        }

        let mounted = Mounted {
            window,
            state,
            on_pointer,
            on_resize,
            frame,
        };
        if let Err(e) = mounted.start() {
            mounted.teardown();
            return Err(e);
        }

        Ok(GlyphField {
            mounted: Some(mounted),
        })
    }

    /// Stops the frame loop and removes both listeners. Safe to call more
    /// than once.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.teardown();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Applies new parameters to a mounted field. The capacity cannot change.
    pub fn set_params(&mut self, params_json: &str) -> Result<(), JsError> {
        let mounted = self
            .mounted
            .as_ref()
            .ok_or_else(|| JsError::new("field is not mounted"))?;
        let params: serde_json::Value = serde_json::from_str(params_json)?;
        let config = FieldConfig::from_json(&params)?;
        mounted.state.borrow_mut().sim.reconfigure(config)?;
        Ok(())
    }

    /// Live particle count, 0 when unmounted.
    pub fn alive_count(&self) -> usize {
        self.mounted
            .as_ref()
            .map_or(0, |m| m.state.borrow().sim.pool().alive_count())
    }
}

impl Drop for GlyphField {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Client coordinates relative to a canvas whose box starts at `(left, top)`.
fn canvas_point(client_x: i32, client_y: i32, left: f64, top: f64) -> (f64, f64) {
    (f64::from(client_x) - left, f64::from(client_y) - top)
}

/// Seeds from `crypto.getRandomValues`, falling back to the clock.
fn entropy_seed(window: &Window) -> u64 {
    let mut bytes = [0u8; 8];
    let filled = window
        .crypto()
        .and_then(|crypto| crypto.get_random_values_with_u8_array(&mut bytes))
        .is_ok();
    if filled {
        return u64::from_le_bytes(bytes);
    }
    window
        .performance()
        .map_or(0, |performance| performance.now().to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_point_follows_the_current_box() {
        assert_eq!(canvas_point(120, 80, 20.0, 30.0), (100.0, 50.0));
        // Same pointer after the page scrolled the canvas up by 200px.
        assert_eq!(canvas_point(120, 80, 20.0, -170.0), (100.0, 250.0));
    }
}
