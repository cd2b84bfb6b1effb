//! Decoded RGBA rasters.

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{LogoError, Result};

/// An RGBA8 image, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA byte buffer. Fails when the buffer does not hold exactly
    /// `width * height` pixels or the image is empty.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LogoError::Decode(format!("image has no pixels ({width}x{height})")));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(LogoError::Decode(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode PNG or JPEG bytes. Vector formats are only decodable in the
    /// browser, see `wasm::decode_bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(width, height, decoded.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Resample to `width x height` with a triangle (bilinear) filter.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let source = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| LogoError::Decode("pixel buffer does not match dimensions".into()))?;
        let scaled = image::imageops::resize(&source, width, height, FilterType::Triangle);
        Self::from_rgba(width, height, scaled.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        let raster = RasterImage::decode(&png_bytes(&img)).unwrap();
        assert_eq!((raster.width(), raster.height()), (4, 3));
        assert_eq!(raster.pixel(3, 2), [10, 20, 30, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            RasterImage::decode(b"<svg/>"),
            Err(LogoError::Decode(_))
        ));
    }

    #[test]
    fn buffer_length_is_checked() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(RasterImage::from_rgba(0, 2, vec![]).is_err());
    }

    #[test]
    fn resize_keeps_uniform_colour() {
        let raster = RasterImage::from_rgba(10, 10, [0, 0, 0, 255].repeat(100)).unwrap();
        let scaled = raster.resized(25, 25).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (25, 25));
        assert!(scaled.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }
}
