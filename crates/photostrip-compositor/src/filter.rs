//! Draw-time color filters.
//!
//! Each [`FilterTag`] maps to a 4x5 color matrix in the form SVG's
//! `feColorMatrix` uses: rows produce R, G, B, A from the straight
//! (non-premultiplied) input `[R, G, B, A, 1]` with channels in `0.0..=1.0`.
//! The coefficients are the ones CSS defines for `grayscale(100%)`,
//! `sepia(100%)` and `invert(100%)`.
//!
//! Filters are applied to the transient decoded copy of an image just
//! before it is drawn. The caller's encoded data is never touched.

use image::{Rgba, RgbaImage};

use crate::types::FilterTag;

/// A 4x5 row-major color matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 5]; 4]);

impl ColorMatrix {
    /// Leaves every pixel unchanged.
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// Rec. 709 luminance in every color channel.
    pub const GRAYSCALE: Self = Self([
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// Full-strength sepia tone.
    pub const SEPIA: Self = Self([
        [0.393, 0.769, 0.189, 0.0, 0.0],
        [0.349, 0.686, 0.168, 0.0, 0.0],
        [0.272, 0.534, 0.131, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// `1 - c` for each color channel.
    pub const INVERT: Self = Self([
        [-1.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, -1.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// Transform one straight-alpha pixel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let input = pixel.0.map(|c| f32::from(c) / 255.0);
        let out: [u8; 4] = std::array::from_fn(|row| {
            let m = &self.0[row];
            let v = m[4]
                + m[0] * input[0]
                + m[1] * input[1]
                + m[2] * input[2]
                + m[3] * input[3];
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        });
        Rgba(out)
    }
}

impl From<FilterTag> for ColorMatrix {
    fn from(tag: FilterTag) -> Self {
        match tag {
            FilterTag::Normal => Self::IDENTITY,
            FilterTag::Grayscale => Self::GRAYSCALE,
            FilterTag::Sepia => Self::SEPIA,
            FilterTag::Invert => Self::INVERT,
        }
    }
}

/// Apply `tag`'s color matrix to every pixel of `image` in place.
///
/// [`FilterTag::Normal`] returns without visiting any pixel.
pub fn apply_filter(image: &mut RgbaImage, tag: FilterTag) {
    if tag == FilterTag::Normal {
        return;
    }
    let matrix = ColorMatrix::from(tag);
    for pixel in image.pixels_mut() {
        *pixel = matrix.apply(*pixel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: Rgba<u8> = Rgba([230, 120, 40, 255]);

    #[test]
    fn identity_is_a_no_op() {
        assert_eq!(ColorMatrix::IDENTITY.apply(ORANGE), ORANGE);
    }

    #[test]
    fn normal_leaves_image_untouched() {
        let mut img = RgbaImage::from_pixel(3, 3, ORANGE);
        apply_filter(&mut img, FilterTag::Normal);
        assert!(img.pixels().all(|p| *p == ORANGE));
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let Rgba([r, g, b, a]) = ColorMatrix::GRAYSCALE.apply(ORANGE);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
        // 0.2126*230 + 0.7152*120 + 0.0722*40 = 137.64
        assert_eq!(r, 138);
    }

    #[test]
    fn grayscale_keeps_white_white() {
        let white = Rgba([255, 255, 255, 255]);
        assert_eq!(ColorMatrix::GRAYSCALE.apply(white), white);
    }

    #[test]
    fn sepia_of_white_is_warm_and_clamped() {
        let Rgba([r, g, b, _]) = ColorMatrix::SEPIA.apply(Rgba([255, 255, 255, 255]));
        // Row sums: 1.351 (clamped), 1.203 (clamped), 0.937.
        assert_eq!(r, 255);
        assert_eq!(g, 255);
        assert_eq!(b, 239);
    }

    #[test]
    fn sepia_orders_channels_red_over_blue() {
        let Rgba([r, g, b, _]) = ColorMatrix::SEPIA.apply(Rgba([100, 100, 100, 255]));
        assert!(r > g && g > b, "expected r > g > b, got {r} {g} {b}");
    }

    #[test]
    fn invert_flips_color_and_keeps_alpha() {
        assert_eq!(
            ColorMatrix::INVERT.apply(Rgba([0, 100, 255, 128])),
            Rgba([255, 155, 0, 128])
        );
    }

    #[test]
    fn every_filter_but_normal_changes_a_colored_pixel() {
        for tag in [FilterTag::Grayscale, FilterTag::Sepia, FilterTag::Invert] {
            let mut img = RgbaImage::from_pixel(1, 1, ORANGE);
            apply_filter(&mut img, tag);
            assert_ne!(*img.get_pixel(0, 0), ORANGE, "{tag} left the pixel unchanged");
        }
    }
}
