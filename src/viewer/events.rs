//! Frame ticking and event delivery for `ProgressView`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use tracing::warn;
use wasm_bindgen::prelude::*;

use super::{ProgressView, SharedState};
use crate::progress::ProgressEvent;

impl ProgressView {
    /// Advance the scheduler to `now`. Returns whether another frame is
    /// needed.
    pub(crate) fn frame(state: &Rc<RefCell<SharedState>>, now: f64) -> bool {
        let (events, callback, more) = {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            let completed = match s.scheduler.tick(now, &mut s.renderer) {
                Ok(completed) => completed,
                Err(err) => {
                    warn!(%err, "animation frame failed");
                    s.scheduler.stop_all();
                    return false;
                }
            };
            (
                s.bar.completions(&completed),
                s.event_callback.clone(),
                !s.scheduler.is_idle(),
            )
        };
        // The borrow is released so the callback may call back into the view.
        Self::dispatch_events(callback.as_ref(), &events);
        more
    }

    pub(crate) fn dispatch_events(callback: Option<&Function>, events: &[ProgressEvent]) {
        let Some(callback) = callback else {
            return;
        };
        for event in events {
            match serde_wasm_bindgen::to_value(event) {
                Ok(value) => {
                    if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                        warn!(?err, "event callback threw");
                    }
                }
                Err(err) => warn!(%err, "event serialization failed"),
            }
        }
    }
}
