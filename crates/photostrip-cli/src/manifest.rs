//! Strip inputs from the command line or a JSON manifest.
//!
//! A manifest describes a whole strip in one file:
//!
//! ```json
//! {
//!   "images": [
//!     { "path": "shot1.jpg" },
//!     { "path": "shot2.jpg", "filter": "grayscale" },
//!     { "path": "shot3.jpg", "filter": "sepia" }
//!   ],
//!   "title": "Alex & Jordan",
//!   "date": "01.02.24"
//! }
//! ```
//!
//! Relative image paths resolve against the manifest's directory.

use std::path::{Path, PathBuf};

use photostrip_compositor::{CapturedImage, EventMetadata, FilterTag};
use serde::Deserialize;

/// One image reference: a file path and the filter to draw it with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageSpec {
    /// Path to an encoded image file.
    pub path: PathBuf,
    /// Filter; `None` means "use the default".
    #[serde(default)]
    pub filter: Option<FilterTag>,
}

impl ImageSpec {
    /// Parse a positional `PATH[:FILTER]` argument.
    ///
    /// The suffix after the last `:` is only treated as a filter when it
    /// names one, so paths that contain colons still work.
    #[must_use]
    pub fn parse_arg(arg: &str) -> Self {
        if let Some((path, suffix)) = arg.rsplit_once(':')
            && !path.is_empty()
            && let Ok(filter) = suffix.parse::<FilterTag>()
        {
            return Self {
                path: PathBuf::from(path),
                filter: Some(filter),
            };
        }
        Self {
            path: PathBuf::from(arg),
            filter: None,
        }
    }
}

/// A complete strip description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Images, top to bottom.
    pub images: Vec<ImageSpec>,
    /// Event title.
    #[serde(default)]
    pub title: Option<String>,
    /// Event date.
    #[serde(default)]
    pub date: Option<String>,
}

/// Errors loading strip inputs.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// A file could not be read.
    #[error("reading {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON for a [`Manifest`].
    #[error("parsing manifest {path}: {source}")]
    Manifest {
        /// Manifest file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl Manifest {
    /// Parse a manifest from JSON text, resolving relative image paths
    /// against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `json` is not a valid manifest.
    pub fn from_json(json: &str, base_dir: &Path) -> Result<Self, serde_json::Error> {
        let mut manifest: Self = serde_json::from_str(json)?;
        for image in &mut manifest.images {
            if image.path.is_relative() {
                image.path = base_dir.join(&image.path);
            }
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Read`] or [`InputError::Manifest`].
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let json = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_owned(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&json, base_dir).map_err(|source| InputError::Manifest {
            path: path.to_owned(),
            source,
        })
    }

    /// Event text for the header. Command-line values win over the manifest's.
    #[must_use]
    pub fn metadata(&self, title: Option<&str>, date: Option<&str>) -> EventMetadata {
        EventMetadata {
            title: title.map(str::to_owned).or_else(|| self.title.clone()),
            date: date.map(str::to_owned).or_else(|| self.date.clone()),
        }
    }

    /// Read every image file, in order, pairing it with its filter.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Read`] for the first unreadable file.
    pub fn read_images(&self, default_filter: FilterTag) -> Result<Vec<CapturedImage>, InputError> {
        self.images
            .iter()
            .map(|image| {
                let bytes = std::fs::read(&image.path).map_err(|source| InputError::Read {
                    path: image.path.clone(),
                    source,
                })?;
                tracing::debug!(path = %image.path.display(), bytes = bytes.len(), "read image");
                Ok(CapturedImage::new(
                    bytes,
                    image.filter.unwrap_or(default_filter),
                ))
            })
            .collect()
    }
}
