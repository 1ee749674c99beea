//! Shared types for the photo-strip compositor.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can inspect decoded strips
/// without depending on `image` directly.
pub use image::RgbaImage;

/// A named visual transform applied to one image at draw time.
///
/// Serialized (and parsed) as the lowercase tag name, e.g. `"sepia"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTag {
    /// No transform.
    #[default]
    Normal,
    /// Full desaturation using Rec. 709 luminance weights.
    Grayscale,
    /// Warm brown tone.
    Sepia,
    /// Per-channel color inversion.
    Invert,
}

impl FilterTag {
    /// Every filter tag, in the order the capture UI offers them.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Grayscale, Self::Sepia, Self::Invert];

    /// The lowercase tag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
        }
    }

    /// Parse a tag, treating anything unrecognised as [`FilterTag::Normal`].
    ///
    /// Matches how the browser front end draws an image whose filter
    /// string it does not know: unfiltered. Only the exact lowercase names
    /// match, so `"Sepia"` is unfiltered here while [`str::parse`] accepts it.
    #[must_use]
    pub fn from_tag_lenient(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .unwrap_or_default()
    }
}

impl fmt::Display for FilterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known filter tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter tag '{0}' (expected normal, grayscale, sepia, or invert)")]
pub struct ParseFilterTagError(pub String);

impl FromStr for FilterTag {
    type Err = ParseFilterTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseFilterTagError(s.to_owned()))
    }
}

/// Where a captured image's encoded pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Raw encoded bytes (PNG, JPEG, BMP, or WebP).
    Encoded(Vec<u8>),
    /// A self-contained `data:<mime>;base64,<payload>` URI, as produced
    /// by a browser webcam capture.
    DataUri(String),
}

impl ImageSource {
    /// Size of the source representation in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Encoded(bytes) => bytes.len(),
            Self::DataUri(uri) => uri.len(),
        }
    }

    /// Returns `true` if the source holds no data at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Encoded(bytes)
    }
}

/// One snapshot handed to the compositor, paired with its filter.
///
/// Never mutated by the compositor: filters are applied to a transient
/// decoded copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// Encoded image data.
    pub source: ImageSource,
    /// Filter applied when the image is drawn into its slot.
    #[serde(default)]
    pub filter: FilterTag,
}

impl CapturedImage {
    /// Create a captured image from its source and filter.
    #[must_use]
    pub fn new(source: impl Into<ImageSource>, filter: FilterTag) -> Self {
        Self {
            source: source.into(),
            filter,
        }
    }
}

/// Free-form event text rendered in the strip header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Event title. `"Name1 & Name2"` renders as a stacked two-name header.
    #[serde(default)]
    pub title: Option<String>,
    /// Event date, rendered verbatim.
    #[serde(default)]
    pub date: Option<String>,
}

impl EventMetadata {
    /// Metadata with both a title and a date.
    #[must_use]
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            date: Some(date.into()),
        }
    }
}

/// Font lookup used to render header and footer text.
///
/// Fonts only affect glyph appearance; the strip layout is the same
/// whether or not any face is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Extra directories scanned for font files (TTF/OTF/TTC).
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    /// Whether the platform's installed fonts are loaded.
    pub load_system_fonts: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

/// Options for a single composition call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Font lookup for header and footer text.
    #[serde(default)]
    pub fonts: FontConfig,
}

/// The finished photo strip, encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub(crate) const fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    /// The encoded PNG bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the image and returns the encoded PNG bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Encode as a `data:image/png;base64,...` URI for direct display.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.mime_type())
    }
}

/// Why a single input image could not be turned into a bitmap.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The image data was empty.
    #[error("image data is empty")]
    EmptyInput,

    /// The data URI was malformed or not base64-encoded.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// The `image` crate could not decode the bytes.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// The image decoded but has no pixels to draw.
    #[error("decoded image is {width}x{height}")]
    ZeroSized {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },
}

/// Errors that abort a composition call. No partial strip is returned.
#[derive(Debug, thiserror::Error)]
pub enum StripError {
    /// The image sequence was empty.
    #[error("a photo strip needs at least one image")]
    NoImages,

    /// One of the input images failed to decode.
    #[error("image {index} could not be decoded: {source}")]
    Decode {
        /// Zero-based position of the failing image in the input.
        index: usize,
        /// Underlying decode failure.
        #[source]
        source: DecodeError,
    },

    /// The drawing surface or text overlay could not be created.
    #[error("render target unavailable: {0}")]
    RenderTarget(String),

    /// The finished canvas could not be encoded as PNG.
    #[error("failed to encode photo strip: {0}")]
    Encode(#[source] image::ImageError),
}
