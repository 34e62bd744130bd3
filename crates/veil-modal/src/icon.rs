#![forbid(unsafe_code)]

//! Close glyph description.
//!
//! The close affordance shows a diagonal cross. Only the fill is caller
//! supplied; geometry and stroke are fixed.

use std::fmt::Write as _;

/// SVG view box of the glyph.
pub const VIEW_BOX: &str = "0 0 512 512";
/// Rendered width and height.
pub const SIZE: &str = "1.5em";
/// Stroke width in view-box units.
pub const STROKE_WIDTH: u32 = 32;
/// Path data of the cross.
pub const PATH: &str = "M368 368L144 144m224 0L144 368";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseIcon {
    fill: String,
}

impl Default for CloseIcon {
    fn default() -> Self {
        Self::new("none")
    }
}

impl CloseIcon {
    pub fn new(fill: impl Into<String>) -> Self {
        Self { fill: fill.into() }
    }

    pub fn fill(&self) -> &str {
        &self.fill
    }

    /// Standalone SVG markup for hosts that render strings.
    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(256);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{VIEW_BOX}" width="{SIZE}" height="{SIZE}" stroke-width="0" aria-hidden="true">"#
        );
        let _ = write!(
            svg,
            r#"<path fill="{}" stroke-linecap="round" stroke-linejoin="round" stroke-width="{STROKE_WIDTH}" d="{PATH}"></path></svg>"#,
            escape_attr(&self.fill)
        );
        svg
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fill_is_none() {
        assert_eq!(CloseIcon::default().fill(), "none");
    }

    #[test]
    fn svg_carries_fill_and_path() {
        let svg = CloseIcon::new("currentColor").to_svg();
        assert!(svg.contains(r#"fill="currentColor""#));
        assert!(svg.contains(PATH));
        assert!(svg.contains(r#"viewBox="0 0 512 512""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn fill_is_escaped() {
        let svg = CloseIcon::new(r#"red" onload="x"#).to_svg();
        assert!(svg.contains("red&quot; onload=&quot;x"));
        assert!(!svg.contains(r#"onload="x""#));
    }
}
