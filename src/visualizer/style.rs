//! Stylesheet generation for the bar renderer.
//!
//! Stored colours are arbitrary strings (usually `hsl(...)`), which cannot
//! be used as CSS class names.  [`StyleSheet`] hands out one short class per
//! distinct colour and renders a stylesheet with a rule for each, sized by
//! the current rendering scale.  No GTK types are involved, so the whole
//! thing is testable without a display.

use crate::color::button_colors;
use crate::config::clamp_scale;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Font size in px at scale 1.0.
const BASE_FONT_PX: f64 = 10.0;
const BASE_PADDING_PX: f64 = 3.0;
const BASE_RADIUS_PX: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct StyleSheet {
    scale: f64,
    /// Stored colour -> class index.
    classes: BTreeMap<String, usize>,
}

impl StyleSheet {
    pub fn new(scale: f64) -> Self {
        Self {
            scale: clamp_scale(scale),
            classes: BTreeMap::new(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns whether the scale changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let scale = clamp_scale(scale);
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    /// Class carrying `stored` as a button background or bar border.
    /// Returns the class and whether it is new (the sheet must be reloaded).
    pub fn color_class(&mut self, stored: &str) -> (String, bool) {
        let next = self.classes.len();
        let mut fresh = false;
        let index = *self.classes.entry(stored.to_string()).or_insert_with(|| {
            fresh = true;
            next
        });
        (class_name(index), fresh)
    }

    /// Full stylesheet text.
    pub fn render(&self) -> String {
        let px = |base: f64| (base * self.scale).round() as i64;
        let font = px(BASE_FONT_PX);
        let pad = px(BASE_PADDING_PX);
        let radius = px(BASE_RADIUS_PX);

        let mut css = String::new();
        let _ = write!(
            css,
            "\
.dockbar {{
    border: 2px solid transparent;
    border-radius: {radius}px;
    padding: {pad}px;
    background-color: rgba(24, 24, 24, 0.85);
}}

.dockbar .grip {{
    font-size: {font}px;
    padding: 0 {pad}px;
    color: #bbbbbb;
}}

.dockbar-btn {{
    font-size: {font}px;
    min-height: 0;
    padding: {pad}px {wide}px;
    margin: 0 {half}px;
    border-radius: {radius}px;
    border: none;
    background-image: none;
}}
",
            wide = pad * 2,
            half = (pad / 2).max(1),
        );

        for (stored, index) in &self.classes {
            let (background, text) = button_colors(stored);
            let class = class_name(*index);
            let _ = write!(
                css,
                "
.dockbar-btn.{class} {{ background-color: {background}; color: {text}; }}
.dockbar.{class} {{ border-color: {background}; }}
"
            );
        }
        css
    }
}

fn class_name(index: usize) -> String {
    format!("dockbar-color-{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_color_gets_same_class() {
        let mut sheet = StyleSheet::new(1.4);
        let (a, fresh_a) = sheet.color_class("hsl(0, 75%, 45%)");
        let (b, fresh_b) = sheet.color_class("hsl(0, 75%, 45%)");
        let (c, fresh_c) = sheet.color_class("hsl(180, 75%, 45%)");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(fresh_a && !fresh_b && fresh_c);
    }

    #[test]
    fn render_contains_converted_colors() {
        let mut sheet = StyleSheet::new(1.0);
        let (class, _) = sheet.color_class("hsl(0, 100%, 50%)");
        let css = sheet.render();
        assert!(css.contains(&format!(".dockbar-btn.{class} {{ background-color: #ff0000; color: #ffffff; }}")));
        assert!(css.contains(&format!(".dockbar.{class} {{ border-color: #ff0000; }}")));
    }

    #[test]
    fn unparsable_color_falls_back() {
        let mut sheet = StyleSheet::new(1.0);
        sheet.color_class("hsl(nope)");
        assert!(sheet.render().contains("#3498db"));
    }

    #[test]
    fn sizes_follow_scale() {
        let mut sheet = StyleSheet::new(1.0);
        assert!(sheet.render().contains("font-size: 10px"));
        assert!(sheet.set_scale(2.0));
        assert!(sheet.render().contains("font-size: 20px"));
        assert!(!sheet.set_scale(2.0));
    }

    #[test]
    fn scale_is_clamped() {
        let mut sheet = StyleSheet::new(0.2);
        assert_eq!(sheet.scale(), 1.0);
        sheet.set_scale(9.0);
        assert_eq!(sheet.scale(), 2.5);
    }
}
