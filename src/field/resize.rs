//! Working-size policy for extraction.
//!
//! Images with either side outside `[MIN_SIZE, MAX_SIZE]` are rescaled
//! uniformly. The larger side governs (height wins ties): it becomes
//! `MAX_SIZE` when it exceeds `MAX_SIZE`, otherwise `MIN_SIZE`. Both sides are
//! then rounded independently, so the aspect ratio may drift by up to half a
//! pixel. Note the `MIN_SIZE` branch also fires for a 600x300 image and
//! shrinks it to 500x250; that is the established behavior.

pub const MAX_SIZE: u32 = 1000;
pub const MIN_SIZE: u32 = 500;

/// Dimensions the image is rasterised at before extraction.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let out_of_range = width > MAX_SIZE || height > MAX_SIZE || width < MIN_SIZE || height < MIN_SIZE;
    if !out_of_range || width == 0 || height == 0 {
        return (width, height);
    }

    let governing = width.max(height);
    let scale = if governing > MAX_SIZE {
        f64::from(MAX_SIZE) / f64::from(governing)
    } else {
        f64::from(MIN_SIZE) / f64::from(governing)
    };
    (scale_side(width, scale), scale_side(height, scale))
}

// Rounds half up like the canvas sizing it replaces; never collapses to zero.
fn scale_side(side: u32, scale: f64) -> u32 {
    let scaled = (f64::from(side) * scale + 0.5).floor();
    (scaled as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_is_untouched() {
        assert_eq!(target_dimensions(500, 500), (500, 500));
        assert_eq!(target_dimensions(1000, 640), (1000, 640));
    }

    #[test]
    fn wide_image_is_clamped_by_width() {
        assert_eq!(target_dimensions(2000, 100), (1000, 50));
    }

    #[test]
    fn tall_image_is_clamped_by_height() {
        assert_eq!(target_dimensions(300, 1500), (200, 1000));
    }

    #[test]
    fn small_image_is_raised_to_min() {
        assert_eq!(target_dimensions(100, 50), (500, 250));
        assert_eq!(target_dimensions(64, 64), (500, 500));
    }

    #[test]
    fn one_short_side_rescales_larger_side_to_min() {
        assert_eq!(target_dimensions(600, 300), (500, 250));
    }

    #[test]
    fn square_tie_is_governed_by_height() {
        assert_eq!(target_dimensions(1200, 1200), (1000, 1000));
    }

    #[test]
    fn halves_round_up() {
        // 1001 * 0.5 = 500.5
        assert_eq!(target_dimensions(2000, 1001), (1000, 501));
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        assert_eq!(target_dimensions(1, 5000), (1, 1000));
    }

    #[test]
    fn zero_sized_is_passed_through() {
        assert_eq!(target_dimensions(0, 700), (0, 700));
    }
}
