//! Color parsing and contrast helpers.
//!
//! Colors travel through the renderers as CSS strings; parsing is only needed
//! when a component derives one color from another (label contrast).

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (the `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        match hex.len() {
            3 => {
                let digit = |i: usize| -> Option<u8> {
                    let v = u8::from_str_radix(hex.get(i..=i)?, 16).ok()?;
                    Some(v * 17)
                };
                Some(Self::new(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
                let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
                let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Parse any supported CSS color: hex, `rgb()`, `rgba()` or a basic name.
    pub fn parse(s: &str) -> Option<Self> {
        let (r, g, b, _) = parse_color_rgba(s)?;
        Some(Self::new(r, g, b))
    }

    /// Perceived brightness on a 0-255 scale (YIQ weighting).
    pub fn brightness(self) -> f64 {
        (f64::from(self.r) * 299.0 + f64::from(self.g) * 587.0 + f64::from(self.b) * 114.0)
            / 1000.0
    }

    /// Check if this is a light color.
    pub fn is_light(self) -> bool {
        self.brightness().round() >= 128.0
    }
}

/// Text color readable on top of `background`: black on light colors,
/// white on dark ones. Transparent and unparseable colors count as white.
pub fn contrast_text_color(background: &str) -> &'static str {
    let rgb = if background.trim().eq_ignore_ascii_case("transparent") {
        Rgb::WHITE
    } else {
        Rgb::parse(background).unwrap_or(Rgb::WHITE)
    };
    if rgb.is_light() {
        "black"
    } else {
        "white"
    }
}

/// Parse color and return RGBA components (0-255 for RGB, 0.0-1.0 for alpha)
pub fn parse_color_rgba(s: &str) -> Option<(u8, u8, u8, f64)> {
    let s = s.trim();

    if s.starts_with('#') {
        let rgb = Rgb::from_hex(s)?;
        Some((rgb.r, rgb.g, rgb.b, 1.0))
    } else if s.starts_with("rgba(") {
        parse_rgba_string(s)
    } else if s.starts_with("rgb(") {
        parse_rgb_string(s)
    } else {
        named_color(s).map(|rgb| (rgb.r, rgb.g, rgb.b, 1.0))
    }
}

fn parse_rgb_string(s: &str) -> Option<(u8, u8, u8, f64)> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim());
    let r: u8 = parts.next()?.parse().ok()?;
    let g: u8 = parts.next()?.parse().ok()?;
    let b: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b, 1.0))
}

fn parse_rgba_string(s: &str) -> Option<(u8, u8, u8, f64)> {
    let inner = s.strip_prefix("rgba(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim());
    let r: u8 = parts.next()?.parse().ok()?;
    let g: u8 = parts.next()?.parse().ok()?;
    let b: u8 = parts.next()?.parse().ok()?;
    let a: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b, a))
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "white" => Rgb::WHITE,
        "black" => Rgb::new(0, 0, 0),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "navy" => Rgb::new(0, 0, 128),
        "teal" => Rgb::new(0, 128, 128),
        "maroon" => Rgb::new(128, 0, 0),
        "lime" => Rgb::new(0, 255, 0),
        "aqua" | "cyan" => Rgb::new(0, 255, 255),
        "fuchsia" | "magenta" => Rgb::new(255, 0, 255),
        _ => return None,
    };
    Some(rgb)
}

/// Default colors of the progress components.
pub mod palette {
    pub const WHITE: &str = "#ffffff";

    pub const LINEAR_TRACK: &str = "#EAEAEA";
    pub const CIRCULAR_TRACK: &str = "#E6E6E6";
    pub const PROGRESS: &str = "#0078D6";
    pub const FONT: &str = "#333333";

    pub const SUCCESS: &str = "#127C0F";
    pub const INFO: &str = "#0279D6";
    pub const WARNING: &str = "#D83B01";
    pub const DANGER: &str = "#C00000";
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(Rgb::from_hex("#fa0"), Some(Rgb::new(255, 170, 0)));
    }

    #[test]
    fn test_parse_rgba() {
        let (r, g, b, a) = parse_color_rgba("rgba(255, 128, 64, 0.5)").unwrap();
        assert_eq!((r, g, b), (255, 128, 64));
        assert!((a - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_contrast_on_brand_blue_is_white() {
        assert_eq!(contrast_text_color(palette::PROGRESS), "white");
    }

    #[test]
    fn test_contrast_on_light_track_is_black() {
        assert_eq!(contrast_text_color(palette::LINEAR_TRACK), "black");
        assert_eq!(contrast_text_color("transparent"), "black");
        assert_eq!(contrast_text_color("not-a-color"), "black");
    }
}
