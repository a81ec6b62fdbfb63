//! Colour allocation for bars and their buttons.
//!
//! Colours are stored in the configuration as CSS-style `hsl(h, s%, l%)`
//! strings so they can be edited by hand and fed straight into a
//! stylesheet.  Every bar gets its own hue (stepping by a prime so that
//! neighbouring indices land far apart), and the files inside a bar are
//! spread evenly around the colour wheel starting from a per-bar offset.

use std::fmt;
use std::str::FromStr;

/// Fallback background when a stored colour cannot be parsed.
pub const FALLBACK_HEX: &str = "#3498db";

/// A colour in HSL space: hue in degrees, saturation and lightness in
/// percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// `#rrggbb` form.
    pub fn to_hex(self) -> String {
        let h = f64::from(self.hue % 360) / 360.0;
        let s = f64::from(self.saturation.min(100)) / 100.0;
        let l = f64::from(self.lightness.min(100)) / 100.0;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };
        let byte = |c: f64| (c * 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
    }

    /// Text colour readable on top of this colour.
    pub fn contrast_text(self) -> &'static str {
        if self.lightness < 55 {
            "#ffffff"
        } else {
            "#000000"
        }
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Error for strings that are not `hsl(h, s%, l%)`.
#[derive(Debug, thiserror::Error)]
#[error("not an hsl() colour: {0:?}")]
pub struct ParseHslError(String);

impl FromStr for Hsl {
    type Err = ParseHslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHslError(s.to_string());
        let inner = s
            .trim()
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let parts: Vec<&str> = inner.split(',').map(|p| p.trim().trim_end_matches('%')).collect();
        let [h, sat, l] = parts.as_slice() else {
            return Err(err());
        };
        Ok(Hsl {
            hue: h.parse().map_err(|_| err())?,
            saturation: sat.parse().map_err(|_| err())?,
            lightness: l.parse().map_err(|_| err())?,
        })
    }
}

/// Border colour of the bar at `index`.
pub fn bar_color(index: usize) -> Hsl {
    Hsl::new(((index * 37) % 360) as u16, 70, 45)
}

/// Hue offset where the file palette of the bar at `bar_index` starts.
pub fn bar_hue_base(bar_index: usize) -> u16 {
    ((bar_index * 60) % 360) as u16
}

/// Colour of file `index` out of `total` in a bar whose palette starts at
/// `hue_base`.  Files of the same bar are spread evenly around the wheel.
pub fn file_color(index: usize, total: usize, hue_base: u16) -> Hsl {
    let separation = if total <= 1 { 0 } else { 360 / total };
    let hue = (usize::from(hue_base) + index * separation) % 360;
    Hsl::new(hue as u16, 75, 45)
}

/// Colours for `total` files of the bar at `bar_index`, in entry order.
pub fn palette(total: usize, bar_index: usize) -> Vec<Hsl> {
    let base = bar_hue_base(bar_index);
    (0..total).map(|i| file_color(i, total, base)).collect()
}

/// Background and text colours for a stored colour string.  Strings that
/// are not HSL are passed through as the background with white text.
pub fn button_colors(stored: &str) -> (String, &'static str) {
    if stored.trim_start().starts_with("hsl") {
        match stored.parse::<Hsl>() {
            Ok(hsl) => (hsl.to_hex(), hsl.contrast_text()),
            Err(_) => (FALLBACK_HEX.to_string(), "#ffffff"),
        }
    } else if stored.is_empty() {
        (FALLBACK_HEX.to_string(), "#ffffff")
    } else {
        (stored.to_string(), "#ffffff")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_colors_step_by_37_degrees() {
        assert_eq!(bar_color(0), Hsl::new(0, 70, 45));
        assert_eq!(bar_color(1), Hsl::new(37, 70, 45));
        assert_eq!(bar_color(10), Hsl::new(10, 70, 45));
    }

    #[test]
    fn bar_colors_are_unique_for_many_bars() {
        let hues: std::collections::HashSet<u16> = (0..72).map(|i| bar_color(i).hue).collect();
        assert_eq!(hues.len(), 72);
    }

    #[test]
    fn file_colors_spread_evenly() {
        let hues: Vec<u16> = (0..3).map(|i| file_color(i, 3, 60).hue).collect();
        assert_eq!(hues, vec![60, 180, 300]);
    }

    #[test]
    fn single_file_uses_base_hue() {
        assert_eq!(file_color(0, 1, 120), Hsl::new(120, 75, 45));
        assert_eq!(file_color(0, 0, 120), Hsl::new(120, 75, 45));
    }

    #[test]
    fn palette_starts_at_bar_offset() {
        let p = palette(2, 1);
        assert_eq!(p, vec![Hsl::new(60, 75, 45), Hsl::new(240, 75, 45)]);
        assert!(palette(0, 3).is_empty());
    }

    #[test]
    fn display_and_parse_agree() {
        let c = Hsl::new(210, 75, 45);
        assert_eq!(c.to_string(), "hsl(210, 75%, 45%)");
        assert_eq!("hsl(210, 75%, 45%)".parse::<Hsl>().unwrap(), c);
        assert_eq!(" hsl(210,75%,45%) ".parse::<Hsl>().unwrap(), c);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("#ff0000".parse::<Hsl>().is_err());
        assert!("hsl(1, 2%)".parse::<Hsl>().is_err());
        assert!("hsl(a, b%, c%)".parse::<Hsl>().is_err());
    }

    #[test]
    fn hex_conversion() {
        assert_eq!(Hsl::new(0, 100, 50).to_hex(), "#ff0000");
        assert_eq!(Hsl::new(120, 100, 50).to_hex(), "#00ff00");
        assert_eq!(Hsl::new(0, 0, 100).to_hex(), "#ffffff");
        assert_eq!(Hsl::new(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn contrast_depends_on_lightness() {
        assert_eq!(Hsl::new(0, 70, 45).contrast_text(), "#ffffff");
        assert_eq!(Hsl::new(0, 70, 80).contrast_text(), "#000000");
    }

    #[test]
    fn button_colors_fall_back() {
        assert_eq!(button_colors("hsl(broken"), (FALLBACK_HEX.to_string(), "#ffffff"));
        assert_eq!(button_colors("#123456"), ("#123456".to_string(), "#ffffff"));
        assert_eq!(button_colors(""), (FALLBACK_HEX.to_string(), "#ffffff"));
    }
}
