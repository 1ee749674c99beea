//! Strip geometry: where every header line, the separator rule, each
//! image slot, and the footer land on the canvas.
//!
//! Layout is pure arithmetic over the metadata and the image count. It
//! never looks at pixels or fonts, so positions are identical whether or
//! not a font is available to draw the glyphs.
//!
//! # Header gap policy
//!
//! The header cursor starts at [`HEADER_START_Y`]. Every rendered line
//! advances it by that line's fixed amount. A missing date always
//! reserves [`MISSING_DATE_GAP`], with or without a title, so a strip
//! with neither title nor date puts its separator at `y = 120`.
//!
//! A whitespace-only title counts as no title: it draws nothing and does
//! not advance the cursor. The browser front end treated `"   "` as a
//! title and drew an empty 60px line, which put the separator at
//! `y = 180` instead.

use crate::types::EventMetadata;

/// Canvas width in pixels (2x6 inch strip at 300 DPI).
pub const CANVAS_WIDTH: u32 = 600;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1800;

/// Baseline of the first header line.
pub const HEADER_START_Y: f32 = 100.0;
/// Gap reserved in place of the date line when no date is given.
pub const MISSING_DATE_GAP: f32 = 20.0;
/// Space between the separator rule and the first slot.
pub const SEPARATOR_TO_IMAGES: f32 = 40.0;
/// Separator rule stroke width.
pub const SEPARATOR_WIDTH: f32 = 2.0;
/// Vertical gap between consecutive slots.
pub const SLOT_GAP: f32 = 15.0;
/// Distance from the bottom edge to the first footer baseline.
pub const FOOTER_OFFSET: f32 = 100.0;

/// Font family list for all strip text, most preferred first.
pub const FONT_FAMILY: &str = "Poppins, sans-serif";

const NAME_SIZE: f32 = 60.0;
const NAME_ADVANCE: f32 = 60.0;
const AMPERSAND_SIZE: f32 = 50.0;
const AMPERSAND_ADVANCE: f32 = 60.0;
const LAST_NAME_ADVANCE: f32 = 50.0;
const SINGLE_TITLE_SIZE: f32 = 48.0;
const SINGLE_TITLE_ADVANCE: f32 = 60.0;
const DATE_SIZE: f32 = 30.0;
const DATE_ADVANCE: f32 = 40.0;

const FOOTER_CAPTION: &str = "FIND YOUR PHOTOS AT";
const FOOTER_CAPTION_SIZE: f32 = 24.0;
const FOOTER_CAPTION_COLOR: &str = "#AAAAAA";
const FOOTER_URL: &str = "WWW.PHOTOBOOTH.APP";
const FOOTER_URL_SIZE: f32 = 28.0;
const FOOTER_URL_COLOR: &str = "#888888";
const FOOTER_LINE_SPACING: f32 = 35.0;

/// Fraction of the canvas width each slot occupies.
const SLOT_WIDTH_RATIO: f32 = 0.95;
/// Slot height as a fraction of slot width (4:3 landscape).
const SLOT_ASPECT: f32 = 0.75;
/// Separator rule spans from this fraction of the width to its mirror.
const SEPARATOR_INSET_RATIO: f32 = 0.15;

/// How the title splits into header lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleBlock {
    /// Exactly one `&`: two upper-cased names stacked around an ampersand.
    Couple {
        /// Text before the `&`, trimmed and upper-cased.
        first: String,
        /// Text after the `&`, trimmed and upper-cased.
        second: String,
    },
    /// Anything else: the whole title upper-cased on one line.
    Single(String),
}

impl TitleBlock {
    /// Classify a title. Returns `None` for a title that is empty after
    /// trimming, which renders no title block at all.
    #[must_use]
    pub fn parse(title: &str) -> Option<Self> {
        if title.trim().is_empty() {
            return None;
        }

        let parts: Vec<&str> = title.split('&').map(str::trim).collect();
        match parts.as_slice() {
            [first, second] => Some(Self::Couple {
                first: first.to_uppercase(),
                second: second.to_uppercase(),
            }),
            _ => Some(Self::Single(title.to_uppercase())),
        }
    }
}

/// A single centred line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Rendered text, already case-transformed.
    pub text: String,
    /// Alphabetic baseline in canvas pixels.
    pub baseline_y: f32,
    /// Font size in pixels.
    pub font_size: f32,
    /// CSS hex fill color.
    pub color: &'static str,
}

impl TextLine {
    fn black(text: impl Into<String>, baseline_y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            baseline_y,
            font_size,
            color: "#000000",
        }
    }
}

/// A horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    /// Left end x.
    pub x1: f32,
    /// Right end x.
    pub x2: f32,
    /// Vertical centre of the stroke.
    pub y: f32,
    /// Stroke width.
    pub width: f32,
}

/// Destination rectangle for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width every image is stretched to.
    pub width: f32,
    /// Height every image is stretched to.
    pub height: f32,
}

impl Slot {
    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the pixel centre `(px, py)` falls inside the slot.
    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.bottom()
    }
}

/// Full derived geometry for one strip.
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Title and date lines, top to bottom.
    pub header: Vec<TextLine>,
    /// Rule between header and images.
    pub separator: Rule,
    /// One slot per input image, in input order.
    pub slots: Vec<Slot>,
    /// Caption and URL lines.
    pub footer: Vec<TextLine>,
}

impl StripLayout {
    /// Compute the layout for `image_count` images and the given metadata.
    #[must_use]
    pub fn compute(metadata: &EventMetadata, image_count: usize) -> Self {
        let width = CANVAS_WIDTH as f32;
        let height = CANVAS_HEIGHT as f32;

        let mut header = Vec::new();
        let mut cursor = HEADER_START_Y;

        match metadata.title.as_deref().and_then(TitleBlock::parse) {
            Some(TitleBlock::Couple { first, second }) => {
                header.push(TextLine::black(first, cursor, NAME_SIZE));
                cursor += NAME_ADVANCE;
                header.push(TextLine::black("&", cursor, AMPERSAND_SIZE));
                cursor += AMPERSAND_ADVANCE;
                header.push(TextLine::black(second, cursor, NAME_SIZE));
                cursor += LAST_NAME_ADVANCE;
            }
            Some(TitleBlock::Single(title)) => {
                header.push(TextLine::black(title, cursor, SINGLE_TITLE_SIZE));
                cursor += SINGLE_TITLE_ADVANCE;
            }
            None => {}
        }

        match metadata.date.as_deref().filter(|d| !d.is_empty()) {
            Some(date) => {
                header.push(TextLine::black(date, cursor, DATE_SIZE));
                cursor += DATE_ADVANCE;
            }
            None => cursor += MISSING_DATE_GAP,
        }

        let separator = Rule {
            x1: width * SEPARATOR_INSET_RATIO,
            x2: width * (1.0 - SEPARATOR_INSET_RATIO),
            y: cursor,
            width: SEPARATOR_WIDTH,
        };

        let slot_width = width * SLOT_WIDTH_RATIO;
        let slot_height = slot_width * SLOT_ASPECT;
        let slot_x = (width - slot_width) / 2.0;
        let first_top = cursor + SEPARATOR_TO_IMAGES;
        let slots = (0..image_count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let step = i as f32 * (slot_height + SLOT_GAP);
                Slot {
                    x: slot_x,
                    y: first_top + step,
                    width: slot_width,
                    height: slot_height,
                }
            })
            .collect();

        let footer_y = height - FOOTER_OFFSET;
        let footer = vec![
            TextLine {
                text: FOOTER_CAPTION.to_owned(),
                baseline_y: footer_y,
                font_size: FOOTER_CAPTION_SIZE,
                color: FOOTER_CAPTION_COLOR,
            },
            TextLine {
                text: FOOTER_URL.to_owned(),
                baseline_y: footer_y + FOOTER_LINE_SPACING,
                font_size: FOOTER_URL_SIZE,
                color: FOOTER_URL_COLOR,
            },
        ];

        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            header,
            separator,
            slots,
            footer,
        }
    }

    /// Horizontal centre every text line is anchored on.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.width as f32 / 2.0
    }

    /// Top of the footer text block: the first footer baseline minus the
    /// caption's font size (a conservative ascent).
    #[must_use]
    pub fn footer_top(&self) -> f32 {
        self.footer
            .first()
            .map_or(self.height as f32, |line| line.baseline_y - line.font_size)
    }

    /// Whether every slot ends above the footer text.
    #[must_use]
    pub fn slots_clear_footer(&self) -> bool {
        self.slots
            .last()
            .is_none_or(|slot| slot.bottom() <= self.footer_top())
    }
}
