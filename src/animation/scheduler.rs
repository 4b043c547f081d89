//! Tick-driven animation scheduler.
//!
//! The scheduler owns every piece of mutable interpolation state. The host
//! calls [`Scheduler::tick`] with a monotonic timestamp (milliseconds) once
//! per frame; each live animation moves through `Pending -> Running ->
//! Complete` and pushes its frame to the renderer.

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::request::{AnimationRequest, CompletionPayload, Frame, LoopMode, Slot};
use crate::error::{DrawkitError, Result};
use crate::render::RenderBackend;
use crate::types::AttributeUpdate;

/// Identifies one animation issued to a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AnimationId(u64);

impl AnimationId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Lifecycle of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for the delay to elapse.
    Pending,
    Running,
    Complete,
}

/// Something the host may want to forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnimationEvent {
    /// A traversal finished and its end value was applied exactly.
    Completed {
        id: AnimationId,
        payload: Option<CompletionPayload>,
        /// Whether another traversal follows.
        looping: bool,
    },
    /// Applying a frame failed; the animation was dropped. Other animations
    /// keep running.
    Failed { id: AnimationId, error: String },
}

impl AnimationEvent {
    pub fn id(&self) -> AnimationId {
        match self {
            Self::Completed { id, .. } | Self::Failed { id, .. } => *id,
        }
    }
}

struct Running {
    id: AnimationId,
    request: AnimationRequest,
    /// Timestamp the current traversal is measured from, set on its first tick.
    origin: Option<f64>,
    last_tick: Option<f64>,
    phase: Phase,
    /// Start and change of the current traversal.
    start: f64,
    change: f64,
    shown: bool,
    iteration: u32,
}

impl Running {
    fn frame(&self, elapsed: f64, is_final: bool) -> Frame {
        let duration = self.request.duration;
        let elapsed = elapsed.clamp(0.0, duration.max(0.0));
        Frame {
            elapsed,
            duration,
            value: self.request.easing.value(
                elapsed,
                self.start,
                self.change,
                duration,
                self.request.rtl,
            ),
            is_final,
        }
    }

    fn set_visible(&mut self, renderer: &mut dyn RenderBackend, visible: bool) -> Result<()> {
        self.shown = visible;
        match self.request.target.shape() {
            Some(shape) if self.request.hide_until_start => {
                renderer.update_attributes(shape, &AttributeUpdate::new().visible(visible))
            }
            _ => Ok(()),
        }
    }

    /// Move to `now`. Returns the completion event if a traversal ended.
    fn advance(
        &mut self,
        now: f64,
        renderer: &mut dyn RenderBackend,
    ) -> Result<Option<AnimationEvent>> {
        if self.last_tick.is_some_and(|last| now <= last) {
            return Ok(None);
        }
        self.last_tick = Some(now);
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now - origin - self.request.delay;
        if elapsed < 0.0 {
            self.phase = Phase::Pending;
            return Ok(None);
        }
        if !self.shown {
            self.set_visible(renderer, true)?;
        }

        if elapsed < self.request.duration {
            self.phase = Phase::Running;
            let frame = self.frame(elapsed, false);
            trace!(id = self.id.0, value = frame.value, "frame");
            self.request.target.apply(renderer, frame)?;
            return Ok(None);
        }

        self.phase = Phase::Complete;
        let frame = self.frame(self.request.duration, true);
        self.request.target.apply(renderer, frame)?;
        let looping = self.request.repeat;
        debug!(id = self.id.0, value = frame.value, looping, "animation complete");
        let event = AnimationEvent::Completed {
            id: self.id,
            payload: self.request.payload.clone(),
            looping,
        };
        if looping {
            self.rewind();
            // The next traversal is measured from this tick.
            self.origin = Some(now);
            if self.request.delay > 0.0 && self.request.hide_until_start {
                self.set_visible(renderer, false)?;
            }
        }
        Ok(Some(event))
    }

    /// Set up the next traversal after a completed one.
    fn rewind(&mut self) {
        let end = super::easing::end_value(self.start, self.change, self.request.rtl);
        match self.request.loop_mode {
            LoopMode::Restart => {
                self.start = self.request.start;
                self.change = self.request.change;
            }
            LoopMode::Swap => {
                self.start = end;
                self.change = -self.change;
            }
            LoopMode::Continue => self.start = end,
        }
        self.phase = Phase::Pending;
        self.iteration += 1;
    }
}

/// Owns and advances all in-flight animations.
#[derive(Default)]
pub struct Scheduler {
    next_id: u64,
    animations: Vec<Running>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an animation.
    ///
    /// An animation already driving the same attribute of the same shape is
    /// dropped without being completed. Targets hidden until start are
    /// hidden right away.
    pub fn animate(
        &mut self,
        renderer: &mut dyn RenderBackend,
        request: AnimationRequest,
    ) -> Result<AnimationId> {
        request.validate()?;
        if let Some(slot) = request.target.slot() {
            self.evict(&slot);
        }
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        debug!(
            id = id.0,
            target = ?request.target,
            duration = request.duration,
            delay = request.delay,
            repeat = request.repeat,
            "animate"
        );
        let mut running = Running {
            id,
            start: request.start,
            change: request.change,
            request,
            origin: None,
            last_tick: None,
            phase: Phase::Pending,
            shown: true,
            iteration: 0,
        };
        if running.request.hide_until_start {
            running.set_visible(renderer, false)?;
        }
        self.animations.push(running);
        Ok(id)
    }

    fn evict(&mut self, slot: &Slot) {
        let before = self.animations.len();
        self.animations
            .retain(|a| a.request.target.slot().as_ref() != Some(slot));
        if self.animations.len() != before {
            debug!(?slot, "replaced running animation");
        }
    }

    /// Advance every animation to `now`.
    ///
    /// A timestamp not later than an animation's previous tick is ignored for
    /// that animation. Returns the completions and failures of this tick; an
    /// animation whose frame cannot be applied is dropped and reported as
    /// [`AnimationEvent::Failed`] without holding up the others.
    pub fn tick(
        &mut self,
        now: f64,
        renderer: &mut dyn RenderBackend,
    ) -> Result<Vec<AnimationEvent>> {
        if !now.is_finite() {
            return Err(DrawkitError::Animation(format!("invalid timestamp {now}")));
        }
        let mut events = Vec::new();
        let mut finished = Vec::new();
        for animation in &mut self.animations {
            match animation.advance(now, renderer) {
                Ok(None) => {}
                Ok(Some(event)) => {
                    if !animation.request.repeat {
                        finished.push(animation.id);
                    }
                    events.push(event);
                }
                Err(err) => {
                    warn!(id = animation.id.0, %err, "animation frame failed, dropping it");
                    finished.push(animation.id);
                    events.push(AnimationEvent::Failed {
                        id: animation.id,
                        error: err.to_string(),
                    });
                }
            }
        }
        self.animations.retain(|a| !finished.contains(&a.id));
        Ok(events)
    }

    /// Stop an animation where it is. Returns whether it was live.
    pub fn stop(&mut self, id: AnimationId) -> bool {
        let before = self.animations.len();
        self.animations.retain(|a| a.id != id);
        let stopped = self.animations.len() != before;
        if stopped {
            debug!(id = id.0, "animation stopped");
        }
        stopped
    }

    /// Stop everything, looping effects included.
    pub fn stop_all(&mut self) {
        if !self.animations.is_empty() {
            debug!(count = self.animations.len(), "all animations stopped");
        }
        self.animations.clear();
    }

    /// Phase of a live animation; `None` once it has finished or stopped.
    pub fn phase(&self, id: AnimationId) -> Option<Phase> {
        self.animations.iter().find(|a| a.id == id).map(|a| a.phase)
    }

    /// Completed traversals of a looping animation.
    pub fn iterations(&self, id: AnimationId) -> Option<u32> {
        self.animations.iter().find(|a| a.id == id).map(|a| a.iteration)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// No animation left to run.
    pub fn is_idle(&self) -> bool {
        self.is_empty()
    }
}
