//! Header, separator and footer rendering.
//!
//! Text is described as an SVG overlay (built with the [`svg`] crate,
//! which handles XML escaping) and rasterised by `resvg` straight onto
//! the strip canvas. Lines are centred with `text-anchor="middle"` and
//! positioned by their alphabetic baseline, matching [`TextLine`].

use std::sync::Arc;

use svg::node::Text;
use svg::node::element::Element;
use svg::{Document, Node};
use usvg::fontdb;

use crate::layout::{FONT_FAMILY, Rule, StripLayout, TextLine};
use crate::types::FontConfig;

/// Installed families tried, in order, when the generic `sans-serif`
/// default (`Arial`) is not available.
const SANS_SERIF_FALLBACKS: &[&str] = &[
    "Poppins",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "FreeSans",
];

/// Build the font database for one composition call.
///
/// Loads system fonts (when enabled) and every configured font
/// directory, then points the generic `sans-serif` family at the first
/// installed fallback (or, failing that, any installed family) so
/// `Poppins, sans-serif` resolves on machines without Arial.
#[must_use]
pub fn build_fontdb(config: &FontConfig) -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    if config.load_system_fonts {
        db.load_system_fonts();
    }
    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    let installed = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    let fallback = if installed("Arial") {
        None
    } else {
        SANS_SERIF_FALLBACKS
            .iter()
            .find(|&&name| installed(name))
            .map(|&name| name.to_owned())
            .or_else(|| {
                db.faces()
                    .find_map(|face| face.families.first())
                    .map(|(family, _)| family.clone())
            })
    };
    if let Some(family) = fallback {
        tracing::debug!(%family, "using sans-serif fallback");
        db.set_sans_serif_family(family);
    }

    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

/// Rasterises SVG overlays with a shared font database.
pub struct TextRenderer {
    options: usvg::Options<'static>,
}

impl TextRenderer {
    /// Create a renderer that resolves fonts from `fontdb`.
    #[must_use]
    pub fn new(fontdb: Arc<fontdb::Database>) -> Self {
        Self {
            options: usvg::Options {
                fontdb,
                ..usvg::Options::default()
            },
        }
    }

    /// Draw `svg_source` over `pixmap` at 1:1 scale.
    ///
    /// # Errors
    ///
    /// Returns the [`usvg::Error`] if the overlay is not valid SVG.
    pub fn draw(
        &self,
        svg_source: &str,
        pixmap: &mut resvg::tiny_skia::Pixmap,
    ) -> Result<(), usvg::Error> {
        let tree = usvg::Tree::from_str(svg_source, &self.options)?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(())
    }
}

/// SVG overlay holding the header lines and the separator rule.
#[must_use]
pub fn header_overlay(layout: &StripLayout) -> String {
    let mut doc = overlay_document(layout);
    for line in &layout.header {
        doc = doc.add(text_element(line, layout.center_x()));
    }
    doc.add(rule_element(&layout.separator)).to_string()
}

/// SVG overlay holding the two footer lines.
#[must_use]
pub fn footer_overlay(layout: &StripLayout) -> String {
    let mut doc = overlay_document(layout);
    for line in &layout.footer {
        doc = doc.add(text_element(line, layout.center_x()));
    }
    doc.to_string()
}

fn overlay_document(layout: &StripLayout) -> Document {
    Document::new()
        .set("width", layout.width)
        .set("height", layout.height)
        .set("viewBox", (0, 0, layout.width, layout.height))
}

fn text_element(line: &TextLine, center_x: f32) -> Element {
    let mut el = Element::new("text");
    el.assign("x", center_x);
    el.assign("y", line.baseline_y);
    el.assign("font-family", FONT_FAMILY);
    el.assign("font-size", line.font_size);
    el.assign("fill", line.color);
    el.assign("text-anchor", "middle");
    el.append(Text::new(line.text.as_str()));
    el
}

fn rule_element(rule: &Rule) -> Element {
    let mut el = Element::new("line");
    el.assign("x1", rule.x1);
    el.assign("y1", rule.y);
    el.assign("x2", rule.x2);
    el.assign("y2", rule.y);
    el.assign("stroke", "black");
    el.assign("stroke-width", rule.width);
    el
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::EventMetadata;

    fn couple_layout() -> StripLayout {
        StripLayout::compute(&EventMetadata::new("Alex & Jordan", "01.02.24"), 3)
    }

    #[test]
    fn header_overlay_contains_lines_and_rule() {
        let svg = header_overlay(&couple_layout());
        assert!(svg.contains("<svg"));
        assert!(svg.contains(">ALEX<"));
        assert!(svg.contains(">JORDAN<"));
        assert!(svg.contains(">01.02.24<"));
        assert!(svg.contains("<line"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn ampersand_is_escaped() {
        let svg = header_overlay(&couple_layout());
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains(">&<"));
    }

    #[test]
    fn footer_overlay_has_no_rule() {
        let svg = footer_overlay(&couple_layout());
        assert!(svg.contains("FIND YOUR PHOTOS AT"));
        assert!(svg.contains("WWW.PHOTOBOOTH.APP"));
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn overlays_parse_without_fonts() {
        let config = FontConfig {
            font_dirs: Vec::new(),
            load_system_fonts: false,
        };
        let renderer = TextRenderer::new(build_fontdb(&config));
        let mut pixmap = resvg::tiny_skia::Pixmap::new(600, 1800).unwrap();
        let layout = couple_layout();
        renderer.draw(&header_overlay(&layout), &mut pixmap).unwrap();
        renderer.draw(&footer_overlay(&layout), &mut pixmap).unwrap();

        // The rule needs no font, so it is drawn regardless.
        let y = layout.separator.y.round() as u32;
        let px = pixmap.pixel(300, y).unwrap();
        assert!(px.alpha() > 0, "expected separator pixel at (300, {y})");
    }

    #[test]
    fn malformed_overlay_is_an_error() {
        let renderer = TextRenderer::new(Arc::new(fontdb::Database::new()));
        let mut pixmap = resvg::tiny_skia::Pixmap::new(4, 4).unwrap();
        assert!(matches!(
            renderer.draw("<svg", &mut pixmap),
            Err(usvg::Error::ParsingFailed(_))
        ));
    }
}
