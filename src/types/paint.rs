//! Fill and stroke paints, including gradient descriptions.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::error::{DrawkitError, Result};
use crate::geometry::format_number;

/// Reference to a gradient registered with a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradientRef {
    pub id: String,
}

/// What a shape is filled or stroked with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Paint {
    /// No paint. Rendered as a fully transparent color on both backends.
    #[default]
    None,
    /// Any CSS color string.
    Color(String),
    /// A gradient previously created on the same renderer.
    Gradient(GradientRef),
}

impl Paint {
    /// Build a paint from a CSS color, mapping `"none"` and `""` to [`Paint::None`].
    pub fn color(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            Self::None
        } else {
            Self::Color(value)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Attribute value for SVG `fill`/`stroke` and Canvas color styles.
    pub fn css_value(&self) -> String {
        match self {
            Self::None => "transparent".to_string(),
            Self::Color(c) => c.clone(),
            Self::Gradient(g) => format!("url(#{})", g.id),
        }
    }
}

impl From<&str> for Paint {
    fn from(value: &str) -> Self {
        Self::color(value)
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    #[serde(default = "default_stop_opacity")]
    pub opacity: f64,
}

fn default_stop_opacity() -> f64 {
    1.0
}

impl GradientStop {
    pub fn new(color: impl Into<String>, offset: f64) -> Self {
        Self {
            color: color.into(),
            offset,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Gradient placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradientGeometry {
    Linear { start: Point, end: Point },
    Radial { center: Point, radius: f64 },
}

/// Coordinate system of the gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientUnits {
    /// Fractions of the painted shape's bounding box.
    #[default]
    ObjectBoundingBox,
    /// Surface coordinates.
    UserSpaceOnUse,
}

/// Behaviour outside the `[0, 1]` stop range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Repeat,
}

/// Rigid transform applied to a gradient (striped scrolling).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GradientTransform {
    pub translate_x: f64,
    /// Rotation in degrees, applied before the translation.
    pub rotate: f64,
}

impl GradientTransform {
    pub const fn new(translate_x: f64, rotate: f64) -> Self {
        Self {
            translate_x,
            rotate,
        }
    }

    /// SVG `gradientTransform` attribute value.
    pub fn to_svg(&self) -> String {
        format!(
            "translate({}) rotate({})",
            format_number(self.translate_x),
            format_number(self.rotate)
        )
    }

    /// Map a point through the transform (rotate about the origin, then translate).
    pub fn apply(&self, p: Point) -> Point {
        let (sin, cos) = self.rotate.to_radians().sin_cos();
        Point::new(
            p.x * cos - p.y * sin + self.translate_x,
            p.x * sin + p.y * cos,
        )
    }
}

/// Full gradient description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientSpec {
    /// Element id; generated by the renderer when absent.
    pub id: Option<String>,
    pub geometry: GradientGeometry,
    pub stops: Vec<GradientStop>,
    pub units: GradientUnits,
    pub spread: SpreadMethod,
    pub transform: Option<GradientTransform>,
}

impl GradientSpec {
    pub fn linear(start: Point, end: Point, stops: Vec<GradientStop>) -> Self {
        Self {
            id: None,
            geometry: GradientGeometry::Linear { start, end },
            stops,
            units: GradientUnits::default(),
            spread: SpreadMethod::default(),
            transform: None,
        }
    }

    pub fn radial(center: Point, radius: f64, stops: Vec<GradientStop>) -> Self {
        Self {
            id: None,
            geometry: GradientGeometry::Radial { center, radius },
            stops,
            units: GradientUnits::default(),
            spread: SpreadMethod::default(),
            transform: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_units(mut self, units: GradientUnits) -> Self {
        self.units = units;
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_transform(mut self, transform: GradientTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.geometry, GradientGeometry::Linear { .. })
    }

    /// At least one stop, every offset in `[0, 1]`, offsets non-decreasing.
    pub fn validate(&self) -> Result<()> {
        if self.stops.is_empty() {
            return Err(DrawkitError::Gradient(
                "gradient requires at least one stop".to_string(),
            ));
        }
        let mut previous = 0.0_f64;
        for (i, stop) in self.stops.iter().enumerate() {
            if !stop.offset.is_finite() || !(0.0..=1.0).contains(&stop.offset) {
                return Err(DrawkitError::Gradient(format!(
                    "stop {i} offset {} outside [0, 1]",
                    stop.offset
                )));
            }
            if stop.offset < previous {
                return Err(DrawkitError::Gradient(format!(
                    "stop {i} offset {} is before previous offset {previous}",
                    stop.offset
                )));
            }
            previous = stop.offset;
        }
        if let GradientGeometry::Radial { radius, .. } = self.geometry {
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(DrawkitError::Gradient(format!("invalid radius {radius}")));
            }
        }
        Ok(())
    }
}
