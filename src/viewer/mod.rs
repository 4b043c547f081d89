//! `ProgressView` - the JS entry point.
//!
//! A view owns one progress bar, the renderer it draws through and the
//! scheduler driving its animations. Frames come from
//! `requestAnimationFrame` while anything is animating; events go to the
//! callback registered with `onEvent`.

mod events;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::animation::{FrameLoop, Scheduler};
use crate::progress::{ProgressBar, ProgressConfig};
use crate::render::{BackendKind, Renderer};
use crate::types::Size;

/// State shared with the frame callback.
pub(crate) struct SharedState {
    bar: ProgressBar,
    renderer: Renderer,
    scheduler: Scheduler,
    event_callback: Option<Function>,
}

#[wasm_bindgen]
pub struct ProgressView {
    state: Rc<RefCell<SharedState>>,
    frames: Option<FrameLoop>,
}

fn backend_kind(mode: &str) -> Result<BackendKind, JsValue> {
    match mode.to_ascii_lowercase().as_str() {
        "svg" => Ok(BackendKind::Svg),
        "canvas" => Ok(BackendKind::Canvas),
        other => Err(JsValue::from_str(&format!(
            "Unknown render mode `{other}`, expected \"svg\" or \"canvas\""
        ))),
    }
}

/// Client size of the host element, if it exists.
fn host_size(host_id: &str) -> Option<Size> {
    let host = web_sys::window()?.document()?.get_element_by_id(host_id)?;
    Some(Size::new(
        f64::from(host.client_width()),
        f64::from(host.client_height()),
    ))
}

#[wasm_bindgen]
impl ProgressView {
    /// Mount a progress bar on the element `host_id`.
    ///
    /// `mode` is `"svg"` (host is a container) or `"canvas"` (host is the
    /// `<canvas>`). `config` is a plain object in the camelCase
    /// configuration shape. Nothing is drawn until [`ProgressView::render`].
    #[wasm_bindgen(constructor)]
    pub fn new(host_id: &str, mode: &str, config: JsValue) -> Result<ProgressView, JsValue> {
        console_error_panic_hook::set_once();

        let config: ProgressConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {e}")))?;
        let kind = backend_kind(mode)?;
        let container = host_size(host_id).filter(|s| !s.is_empty());
        let size = config.surface_size(container);
        let bar = ProgressBar::new(host_id, config)?;
        let renderer = Renderer::attach(kind, host_id, Some(size))?;
        debug!(host_id, ?kind, width = size.width, height = size.height, "progress view mounted");

        Ok(ProgressView {
            state: Rc::new(RefCell::new(SharedState {
                bar,
                renderer,
                scheduler: Scheduler::new(),
                event_callback: None,
            })),
            frames: None,
        })
    }

    /// Register the event callback. It receives objects tagged by `name`:
    /// `valueChanged`, `progressCompleted`, `textRender`, `animationComplete`.
    #[wasm_bindgen(js_name = "onEvent")]
    pub fn on_event(&mut self, callback: Function) {
        self.state.borrow_mut().event_callback = Some(callback);
    }

    /// Draw the bar and start its animations.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<(), JsValue> {
        let (events, callback) = {
            let mut guard = self.state.borrow_mut();
            let s = &mut *guard;
            let events = s.bar.render(&mut s.renderer, &mut s.scheduler)?;
            (events, s.event_callback.clone())
        };
        Self::dispatch_events(callback.as_ref(), &events);
        self.ensure_frames()
    }

    /// Change the value, animating from the current extent.
    #[wasm_bindgen(js_name = "setValue")]
    pub fn set_value(&mut self, value: f64) -> Result<(), JsValue> {
        let (events, callback) = {
            let mut guard = self.state.borrow_mut();
            let s = &mut *guard;
            let events = s.bar.set_value(value, &mut s.renderer, &mut s.scheduler)?;
            (events, s.event_callback.clone())
        };
        Self::dispatch_events(callback.as_ref(), &events);
        self.ensure_frames()
    }

    /// Stop every animation, looping effects included. Shapes stay as
    /// they are.
    #[wasm_bindgen]
    pub fn stop(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.stop();
        }
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        s.bar.stop(&mut s.scheduler);
    }

    /// Whether any animation is still scheduled.
    #[wasm_bindgen(js_name = "isAnimating")]
    pub fn is_animating(&self) -> bool {
        !self.state.borrow().scheduler.is_idle()
    }

    /// Current value, `undefined` when unset.
    #[wasm_bindgen(getter)]
    pub fn value(&self) -> Option<f64> {
        self.state.borrow().bar.config().value
    }

    /// Start the frame loop unless it is already running or nothing animates.
    fn ensure_frames(&mut self) -> Result<(), JsValue> {
        if self.frames.as_ref().is_some_and(FrameLoop::is_running) || !self.is_animating() {
            return Ok(());
        }
        let state = Rc::clone(&self.state);
        self.frames = Some(FrameLoop::start(move |now| Self::frame(&state, now))?);
        Ok(())
    }
}
