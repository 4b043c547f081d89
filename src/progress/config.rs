//! Typed progress bar configuration.

use serde::{Deserialize, Serialize};

use crate::compose::RangeColor;
use crate::error::{DrawkitError, Result};
use crate::geometry::CornerMode;
use crate::render::palette;
use crate::types::{Rect, Size};

/// Linear bars and circular ones are laid out differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgressType {
    #[default]
    Linear,
    Circular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CornerRadius {
    /// Square unless a theme says otherwise.
    #[default]
    Auto,
    Square,
    Round,
}

impl CornerRadius {
    pub fn mode(self) -> CornerMode {
        match self {
            Self::Round => CornerMode::Round,
            Self::Auto | Self::Square => CornerMode::Square,
        }
    }
}

/// Semantic role; anything but `Auto` overrides the progress color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgressRole {
    #[default]
    Auto,
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlignment {
    Near,
    Center,
    #[default]
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Margin {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 10.0,
            right: 10.0,
            top: 10.0,
            bottom: 10.0,
        }
    }
}

/// Font and placement of the value label. Unset fields fall back to the
/// defaults of the progress type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelStyle {
    /// Replaces the percentage when non-empty.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    pub font_weight: String,
    pub text_alignment: TextAlignment,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: None,
            size: None,
            font_family: None,
            font_style: None,
            font_weight: "Normal".to_string(),
            text_alignment: TextAlignment::Far,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    pub enable: bool,
    /// Milliseconds.
    pub duration: f64,
    /// Milliseconds.
    pub delay: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            enable: false,
            duration: 2000.0,
            delay: 0.0,
        }
    }
}

/// Every option of a progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressConfig {
    #[serde(rename = "type")]
    pub kind: ProgressType,
    pub value: Option<f64>,
    pub secondary_progress: Option<f64>,
    pub minimum: f64,
    pub maximum: f64,
    /// Surface width in pixels; the container or a per-type default when unset.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Margin,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Track radius, `"N%"` of the available radius or `"N"` pixels.
    pub radius: String,
    /// Progress radius, same syntax as `radius`.
    pub inner_radius: String,
    pub segment_count: u32,
    pub gap_width: Option<f64>,
    pub segment_colors: Vec<String>,
    pub corner_radius: CornerRadius,
    pub is_indeterminate: bool,
    pub is_active: bool,
    pub is_gradient: bool,
    pub is_striped: bool,
    pub enable_rtl: bool,
    pub enable_pie_progress: bool,
    pub show_progress_value: bool,
    pub track_segment_disable: bool,
    pub track_color: Option<String>,
    pub progress_color: Option<String>,
    /// Zero picks the per-type default.
    pub track_thickness: f64,
    pub progress_thickness: f64,
    pub track_opacity: f64,
    pub progress_opacity: f64,
    pub buffer_opacity: f64,
    pub role: ProgressRole,
    pub label_style: LabelStyle,
    pub animation: AnimationSettings,
    pub range_colors: Vec<RangeColor>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            kind: ProgressType::Linear,
            value: None,
            secondary_progress: None,
            minimum: 0.0,
            maximum: 100.0,
            width: None,
            height: None,
            margin: Margin::default(),
            start_angle: 0.0,
            end_angle: 0.0,
            radius: "100%".to_string(),
            inner_radius: "100%".to_string(),
            segment_count: 1,
            gap_width: None,
            segment_colors: Vec::new(),
            corner_radius: CornerRadius::Auto,
            is_indeterminate: false,
            is_active: false,
            is_gradient: false,
            is_striped: false,
            enable_rtl: false,
            enable_pie_progress: false,
            show_progress_value: false,
            track_segment_disable: false,
            track_color: None,
            progress_color: None,
            track_thickness: 0.0,
            progress_thickness: 0.0,
            track_opacity: 1.0,
            progress_opacity: 1.0,
            buffer_opacity: 0.3,
            role: ProgressRole::Auto,
            label_style: LabelStyle::default(),
            animation: AnimationSettings::default(),
            range_colors: Vec::new(),
        }
    }
}

/// Extra room kept around a linear track.
const LINEAR_PADDING: f64 = 10.0;

impl ProgressConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("minimum", self.minimum),
            ("maximum", self.maximum),
            ("startAngle", self.start_angle),
            ("endAngle", self.end_angle),
            ("trackThickness", self.track_thickness),
            ("progressThickness", self.progress_thickness),
            ("trackOpacity", self.track_opacity),
            ("progressOpacity", self.progress_opacity),
            ("bufferOpacity", self.buffer_opacity),
            ("animation.duration", self.animation.duration),
            ("animation.delay", self.animation.delay),
        ];
        for (name, v) in numbers {
            if !v.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {v}")));
            }
        }
        let optional = [
            ("value", self.value),
            ("secondaryProgress", self.secondary_progress),
            ("width", self.width),
            ("height", self.height),
            ("gapWidth", self.gap_width),
        ];
        for (name, v) in optional {
            if let Some(v) = v.filter(|v| !v.is_finite()) {
                return Err(invalid(format!("{name} must be finite, got {v}")));
            }
        }
        if self.minimum >= self.maximum {
            return Err(invalid(format!(
                "minimum {} must be below maximum {}",
                self.minimum, self.maximum
            )));
        }
        if self.segment_count == 0 {
            return Err(invalid("segmentCount must be at least 1".to_string()));
        }
        if self.animation.duration < 0.0 || self.animation.delay < 0.0 {
            return Err(invalid("animation timing must not be negative".to_string()));
        }
        if self.track_thickness < 0.0 || self.progress_thickness < 0.0 {
            return Err(invalid("thickness must not be negative".to_string()));
        }
        for (name, spec) in [("radius", &self.radius), ("innerRadius", &self.inner_radius)] {
            if resolve_length(spec, 1.0).is_none() {
                return Err(invalid(format!("{name} `{spec}` is not a length")));
            }
        }
        for (i, band) in self.range_colors.iter().enumerate() {
            if !band.start.is_finite() || !band.end.is_finite() {
                return Err(invalid(format!("rangeColors[{i}] bounds must be finite")));
            }
        }
        Ok(())
    }

    pub fn is_linear(&self) -> bool {
        self.kind == ProgressType::Linear
    }

    pub fn corner(&self) -> CornerMode {
        self.corner_radius.mode()
    }

    pub fn track_thickness(&self) -> f64 {
        self.thickness_or_default(self.track_thickness)
    }

    pub fn progress_thickness(&self) -> f64 {
        self.thickness_or_default(self.progress_thickness)
    }

    fn thickness_or_default(&self, value: f64) -> f64 {
        if value > 0.0 {
            value
        } else if self.is_linear() {
            2.0
        } else {
            4.0
        }
    }

    pub fn gap_width(&self) -> f64 {
        match self.gap_width {
            Some(gap) if gap > 0.0 => gap,
            _ if self.is_linear() => 2.0,
            _ => 4.0,
        }
    }

    pub fn track_color(&self) -> String {
        self.track_color.clone().unwrap_or_else(|| {
            if self.is_linear() {
                palette::LINEAR_TRACK
            } else {
                palette::CIRCULAR_TRACK
            }
            .to_string()
        })
    }

    /// Fill color after applying the role.
    pub fn progress_color(&self) -> String {
        match self.role {
            ProgressRole::Success => palette::SUCCESS.to_string(),
            ProgressRole::Info => palette::INFO.to_string(),
            ProgressRole::Warning => palette::WARNING.to_string(),
            ProgressRole::Danger => palette::DANGER.to_string(),
            ProgressRole::Auto => self
                .progress_color
                .clone()
                .unwrap_or_else(|| palette::PROGRESS.to_string()),
        }
    }

    /// Whether any range band is configured.
    pub fn has_ranges(&self) -> bool {
        !self.range_colors.is_empty()
    }

    /// Surface size given the host container, if any.
    pub fn surface_size(&self, container: Option<Size>) -> Size {
        let container = container.unwrap_or(Size::ZERO);
        let (default_width, mut default_height) = if self.is_linear() {
            (200.0, 30.0)
        } else {
            (120.0, 120.0)
        };
        let thickest = self.track_thickness.max(self.progress_thickness);
        if self.is_linear() && thickest > default_height - LINEAR_PADDING {
            default_height = thickest + LINEAR_PADDING;
        }
        let pick = |explicit: Option<f64>, container: f64, default: f64| {
            explicit
                .filter(|v| *v > 0.0)
                .or(Some(container).filter(|v| *v > 0.0))
                .unwrap_or(default)
        };
        Size::new(
            pick(self.width, container.width, default_width),
            pick(self.height, container.height, default_height),
        )
    }

    /// Drawing area inside the margins.
    pub fn progress_rect(&self, size: Size) -> Rect {
        let m = &self.margin;
        Rect::new(
            m.left,
            m.top,
            size.width - (m.left + m.right),
            size.height - (m.top + m.bottom),
        )
    }
}

fn invalid(message: String) -> DrawkitError {
    DrawkitError::InvalidConfig(message)
}

/// Resolve `"N%"` against `available`, or parse `"N"` as pixels.
pub fn resolve_length(spec: &str, available: f64) -> Option<f64> {
    let spec = spec.trim();
    let value = match spec.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0 * available,
        None => spec.strip_suffix("px").unwrap_or(spec).trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}
