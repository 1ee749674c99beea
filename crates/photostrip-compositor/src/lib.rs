//! photostrip-compositor: Pure photo-strip compositor (sans-IO).
//!
//! Turns an ordered list of captured snapshots plus optional event text
//! into one 600x1800 PNG:
//! white canvas -> header text -> separator rule -> stacked, filtered
//! images -> footer text -> PNG encode.
//!
//! This crate has **no I/O dependencies** beyond font discovery -- it
//! operates on in-memory bytes and returns encoded bytes. Reading files
//! and writing the result live in `photostrip-cli`.

pub mod canvas;
pub mod decode;
pub mod diagnostics;
pub mod filter;
pub mod layout;
pub mod queue;
pub mod text;
pub mod types;

pub use diagnostics::{Clock, ImageDiagnostics, NullClock, StripDiagnostics};
pub use layout::{CANVAS_HEIGHT, CANVAS_WIDTH, Slot, StripLayout, TitleBlock};
pub use queue::{CaptureId, CaptureQueue, QueueError};
pub use types::{
    CapturedImage, ComposeOptions, DecodeError, EncodedImage, EventMetadata, FilterTag,
    FontConfig, ImageSource, ParseFilterTagError, RgbaImage, StripError,
};

use canvas::StripCanvas;
use text::TextRenderer;

/// Compose a photo strip with default options (system fonts).
///
/// # Errors
///
/// See [`compose_with_options`].
pub fn compose(
    images: &[CapturedImage],
    metadata: &EventMetadata,
) -> Result<EncodedImage, StripError> {
    compose_with_options(images, metadata, &ComposeOptions::default())
}

/// Compose a photo strip.
///
/// # Steps
///
/// 1. Allocate the white canvas
/// 2. Draw header lines and the separator rule
/// 3. For each image in order: decode, filter, draw into its slot
/// 4. Draw the footer lines
/// 5. Encode as PNG
///
/// Images are handled strictly one at a time: each is decoded, drawn,
/// and dropped before the next is decoded.
///
/// # Errors
///
/// Returns [`StripError::NoImages`] if `images` is empty.
/// Returns [`StripError::Decode`] if any image fails to decode; nothing
/// drawn up to that point is returned.
/// Returns [`StripError::RenderTarget`] if the canvas or a text overlay
/// cannot be created.
/// Returns [`StripError::Encode`] if PNG encoding fails.
pub fn compose_with_options(
    images: &[CapturedImage],
    metadata: &EventMetadata,
    options: &ComposeOptions,
) -> Result<EncodedImage, StripError> {
    compose_with_diagnostics(images, metadata, options, &NullClock).map(|(strip, _)| strip)
}

/// Compose a photo strip, timing every stage with `clock`.
///
/// # Errors
///
/// Same as [`compose_with_options`].
#[tracing::instrument(level = "debug", skip_all, fields(images = images.len()))]
pub fn compose_with_diagnostics<C: Clock>(
    images: &[CapturedImage],
    metadata: &EventMetadata,
    options: &ComposeOptions,
    clock: &C,
) -> Result<(EncodedImage, StripDiagnostics), StripError> {
    if images.is_empty() {
        return Err(StripError::NoImages);
    }
    let total_start = clock.now();

    let layout = StripLayout::compute(metadata, images.len());
    if !layout.slots_clear_footer() {
        tracing::warn!(
            images = images.len(),
            "image slots extend into the footer; captions will overlap the last image"
        );
    }

    // 1. Canvas.
    let start = clock.now();
    let mut canvas = StripCanvas::new(layout.width, layout.height)?;
    let canvas_duration = clock.elapsed(&start);

    let start = clock.now();
    let renderer = TextRenderer::new(text::build_fontdb(&options.fonts));
    let fonts_duration = clock.elapsed(&start);

    // 2. Header and separator.
    let start = clock.now();
    canvas.draw_overlay(&renderer, &text::header_overlay(&layout))?;
    let header_duration = clock.elapsed(&start);
    tracing::debug!(
        lines = layout.header.len(),
        separator_y = layout.separator.y,
        "header drawn"
    );

    // 3. Images, sequentially.
    let mut image_diagnostics = Vec::with_capacity(images.len());
    for (index, (captured, slot)) in images.iter().zip(&layout.slots).enumerate() {
        let start = clock.now();
        let mut bitmap = decode::decode_source(&captured.source)
            .map_err(|source| StripError::Decode { index, source })?;
        let decode_duration = clock.elapsed(&start);

        let start = clock.now();
        filter::apply_filter(&mut bitmap, captured.filter);
        canvas.draw_stretched(&bitmap, *slot)?;
        let draw_duration = clock.elapsed(&start);

        tracing::debug!(
            index,
            width = bitmap.width(),
            height = bitmap.height(),
            filter = %captured.filter,
            slot_y = slot.y,
            "image drawn"
        );
        image_diagnostics.push(diagnostics::ImageDiagnostics {
            input_bytes: captured.source.len(),
            width: bitmap.width(),
            height: bitmap.height(),
            filter: captured.filter,
            decode: decode_duration,
            draw: draw_duration,
        });
    }

    // 4. Footer.
    let start = clock.now();
    canvas.draw_overlay(&renderer, &text::footer_overlay(&layout))?;
    let footer_duration = clock.elapsed(&start);

    // 5. Encode.
    let start = clock.now();
    let bytes = canvas.encode_png()?;
    let encode_duration = clock.elapsed(&start);

    let diagnostics = StripDiagnostics {
        canvas: canvas_duration,
        fonts: fonts_duration,
        header: header_duration,
        images: image_diagnostics,
        footer: footer_duration,
        encode: encode_duration,
        output_bytes: bytes.len(),
        total_duration: clock.elapsed(&total_start),
    };
    tracing::debug!(bytes = bytes.len(), "photo strip encoded");

    Ok((
        EncodedImage::new(bytes, canvas.width(), canvas.height()),
        diagnostics,
    ))
}
