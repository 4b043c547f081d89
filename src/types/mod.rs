//! Data types shared by the renderers, the scheduler and the components.

mod geometry;
mod paint;
mod shape;

pub use geometry::*;
pub use paint::*;
pub use shape::*;
