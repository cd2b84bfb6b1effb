//! Normalisation, gamma remap and the grayscale handoff raster.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use super::grid::Grid;
use super::mask::ShapeMask;
use crate::error::{LogoError, Result};

pub const GAMMA: f64 = 2.0;

/// The extracted glow field: grayscale (R = G = B) with opaque alpha.
///
/// Background pixels are opaque white. Silhouette pixels darken towards the
/// interior of the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    peak: f32,
}

impl NormalizedField {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA bytes, row-major, ready for texture upload or `ImageData`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Field maximum before normalisation. Zero for an empty silhouette.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn gray(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize * self.width as usize + x as usize) * 4]
    }

    /// Compress the same pixel buffer into a PNG byte stream.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let img = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| LogoError::Encode("pixel buffer does not match dimensions".into()))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// Largest value in the field, never below zero.
pub fn peak<T: Copy + Default + PartialOrd>(field: &Grid<T>) -> T {
    field
        .cells()
        .iter()
        .fold(T::default(), |max, &v| if v > max { v } else { max })
}

/// Divide every cell by the field's own maximum, in double precision. An
/// all-zero field stays all-zero rather than becoming NaN.
pub fn normalize(field: &Grid<f32>) -> Grid<f64> {
    let max = f64::from(peak(field));
    Grid::from_fn(field.width(), field.height(), |x, y| {
        if max > 0.0 {
            f64::from(field.get(x, y)) / max
        } else {
            0.0
        }
    })
}

/// Gamma curve applied to a normalised value.
#[inline]
pub fn remap(normalized: f64, gamma: f64) -> f64 {
    normalized.powf(gamma)
}

/// Convert to a byte the way canvas `ImageData` stores it: clamp, round half
/// to even, NaN to zero.
#[inline]
pub fn clamped_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Build the handoff raster from a solved field.
pub fn encode(field: &Grid<f32>, shape: &ShapeMask, gamma: f64) -> NormalizedField {
    let (width, height) = (field.width(), field.height());
    let max = peak(field);
    let normalized = normalize(field);
    let mut pixels = Vec::with_capacity(width * height * 4);

    for y in 0..height {
        for x in 0..width {
            let gray = if shape.contains(x, y) {
                clamped_byte(255.0 * (1.0 - remap(normalized.get(x, y), gamma)))
            } else {
                255
            };
            pixels.extend_from_slice(&[gray, gray, gray, 255]);
        }
    }

    NormalizedField {
        width: width as u32,
        height: height as u32,
        pixels,
        peak: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renormalised_peak_is_one() {
        let field = Grid::from_fn(7, 5, |x, y| (x * y) as f32 * 0.0123);
        let normalized = normalize(&field);
        assert_eq!(peak(&normalized), 1.0);
        assert_eq!(normalized.get(6, 4), 1.0);
    }

    #[test]
    fn zero_peak_normalises_to_zero() {
        assert!(normalize(&Grid::filled(3, 3, 0.0))
            .cells()
            .iter()
            .all(|&v| v == 0.0));
    }

    #[test]
    fn division_by_peak_happens_in_double_precision() {
        // 1/3 and 2/3 as f32 divided in f64, not f32.
        let (a, b) = (1.0f32 / 3.0, 2.0f32 / 3.0);
        let normalized = normalize(&Grid::from_fn(2, 1, |x, _| [a, b][x]));
        assert_eq!(normalized.get(0, 0), f64::from(a) / f64::from(b));
    }

    #[test]
    fn bytes_follow_image_data_clamping() {
        assert_eq!(clamped_byte(f64::NAN), 0);
        assert_eq!(clamped_byte(-4.0), 0);
        assert_eq!(clamped_byte(300.0), 255);
        assert_eq!(clamped_byte(127.5), 128);
        assert_eq!(clamped_byte(128.5), 128);
        assert_eq!(clamped_byte(63.75), 64);
    }

    #[test]
    fn encode_inverts_and_whitens_background() {
        let field = Grid::from_fn(3, 1, |x, _| [0.0, 0.5, 1.0][x]);
        let shape = ShapeMask::from_grid(Grid::from_fn(3, 1, |x, _| x > 0));
        let out = encode(&field, &shape, GAMMA);
        assert_eq!(out.pixels(), &[255, 255, 255, 255, 191, 191, 191, 255, 0, 0, 0, 255]);
        assert_eq!(out.peak(), 1.0);
    }

    #[test]
    fn empty_silhouette_is_white() {
        let field = Grid::filled(4, 4, 0.0);
        let shape = ShapeMask::from_grid(Grid::filled(4, 4, true));
        let out = encode(&field, &shape, GAMMA);
        assert!(out.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn png_round_trips_pixels() {
        let field = Grid::from_fn(5, 4, |x, y| (x + y) as f32);
        let shape = ShapeMask::from_grid(Grid::filled(5, 4, true));
        let out = encode(&field, &shape, GAMMA);
        let png = out.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.as_raw(), out.pixels());
    }
}
