//! Time-driven interpolation of visual attributes.
//!
//! Callers describe an interpolation as an [`AnimationRequest`] and hand it
//! to a [`Scheduler`], which owns all mutable state and pushes each frame to
//! a [`crate::render::RenderBackend`]. Looping effects run until stopped
//! explicitly.

mod easing;
#[cfg(target_arch = "wasm32")]
mod frame_loop;
mod request;
mod scheduler;

pub use easing::{cosine_out, end_value, Easing};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoop;
pub use request::{
    AnimationRequest, AnimationTarget, CompletionPayload, Frame, FrameFn, LabelCounter,
    LabelSlide, LoopMode,
};
pub use scheduler::{AnimationEvent, AnimationId, Phase, Scheduler};
