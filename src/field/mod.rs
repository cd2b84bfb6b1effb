//! Logo image to glow field extraction.
//!
//! The pipeline is: resize to the working size, classify silhouette and
//! boundary pixels, relax a Poisson problem with a zero boundary, then
//! normalise, gamma-remap and encode as a grayscale raster.

mod encode;
mod grid;
mod mask;
mod raster;
mod resize;
mod solver;

pub use encode::{clamped_byte, normalize, peak, remap, NormalizedField, GAMMA};
pub use grid::Grid;
pub use mask::{is_silhouette, BoundaryMask, ShapeMask};
pub use raster::RasterImage;
pub use resize::{target_dimensions, MAX_SIZE, MIN_SIZE};
pub use solver::{solve, Relaxation, SolverSettings, ITERATIONS, SOURCE};

use crate::error::Result;

/// Extraction constants. `Default` is the canonical configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorSettings {
    pub solver: SolverSettings,
    pub gamma: f64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            gamma: GAMMA,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    settings: ExtractorSettings,
}

impl FieldExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Decode image bytes on the host and extract the field.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<NormalizedField> {
        let image = RasterImage::decode(bytes)?;
        self.extract(&image)
    }

    /// Resize `image` to the working size and extract the field.
    pub fn extract(&self, image: &RasterImage) -> Result<NormalizedField> {
        let (width, height) = target_dimensions(image.width(), image.height());
        log::debug!(
            "extracting field: {}x{} -> {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        let resized = image.resized(width, height)?;
        Ok(self.extract_prepared(&resized))
    }

    /// Extract from an image already rasterised at its working size.
    pub fn extract_prepared(&self, image: &RasterImage) -> NormalizedField {
        let shape = ShapeMask::from_image(image);
        let boundary = BoundaryMask::from_shape(&shape);
        log::debug!(
            "silhouette covers {} of {} pixels",
            shape.count(),
            image.width() as usize * image.height() as usize
        );

        let field = solve(&shape, &boundary, self.settings.solver);
        let encoded = encode::encode(&field, &shape, self.settings.gamma);
        log::debug!("field peak after {} sweeps: {}", self.settings.solver.iterations, encoded.peak());
        encoded
    }
}
