//! `requestAnimationFrame` driver for the scheduler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::error::Result;

type FrameClosure = Closure<dyn FnMut(f64)>;

/// A self-rescheduling animation frame callback.
///
/// Looping effects never end on their own, so the loop only stops when the
/// callback returns `false` or [`FrameLoop::stop`] is called. Dropping the
/// loop stops it too.
pub struct FrameLoop {
    stopped: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<FrameClosure>>>,
}

impl FrameLoop {
    /// Start calling `on_frame` with the frame timestamp (milliseconds).
    pub fn start<F>(mut on_frame: F) -> Result<Self>
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let window = web_sys::window().ok_or("No window available")?;
        let stopped = Rc::new(Cell::new(false));
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let closure: Rc<RefCell<Option<FrameClosure>>> = Rc::new(RefCell::new(None));

        let weak_closure = Rc::downgrade(&closure);
        let loop_stopped = Rc::clone(&stopped);
        let loop_pending = Rc::clone(&pending);
        let loop_window = window.clone();
        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            loop_pending.set(None);
            if loop_stopped.get() {
                return;
            }
            if !on_frame(timestamp) {
                loop_stopped.set(true);
                debug!("frame loop finished");
                return;
            }
            let Some(closure) = weak_closure.upgrade() else {
                return;
            };
            let Ok(slot) = closure.try_borrow() else {
                return;
            };
            if let Some(callback) = slot.as_ref() {
                if let Ok(id) = loop_window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    loop_pending.set(Some(id));
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(callback) = closure.borrow().as_ref() {
            let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
            pending.set(Some(id));
        }
        debug!("frame loop started");
        Ok(Self {
            stopped,
            pending,
            closure,
        })
    }

    /// Cancel the pending frame. Must not be called from inside the callback.
    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        debug!("frame loop stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        if let Ok(mut slot) = self.closure.try_borrow_mut() {
            slot.take();
        }
    }
}
