//! Silhouette and boundary classification.

use super::grid::Grid;
use super::raster::RasterImage;

/// True where a pixel belongs to the logo's filled silhouette.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMask(Grid<bool>);

/// True for silhouette pixels with at least one 8-connected neighbour
/// (off-grid included) outside the silhouette.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryMask(Grid<bool>);

/// Pure opaque white and fully transparent pixels are background; everything
/// else, partially transparent pixels included, is silhouette.
#[inline]
pub fn is_silhouette([r, g, b, a]: [u8; 4]) -> bool {
    let opaque_white = r == 255 && g == 255 && b == 255 && a == 255;
    !(opaque_white || a == 0)
}

impl ShapeMask {
    pub fn from_image(image: &RasterImage) -> Self {
        Self(Grid::from_fn(
            image.width() as usize,
            image.height() as usize,
            |x, y| is_silhouette(image.pixel(x as u32, y as u32)),
        ))
    }

    pub fn from_grid(grid: Grid<bool>) -> Self {
        Self(grid)
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.0.get(x, y)
    }

    /// Off-grid coordinates are outside.
    #[inline]
    pub fn contains_signed(&self, x: isize, y: isize) -> bool {
        self.0.get_signed(x, y).unwrap_or(false)
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.0
    }

    pub fn count(&self) -> usize {
        self.0.cells().iter().filter(|&&inside| inside).count()
    }
}

impl BoundaryMask {
    pub fn from_shape(shape: &ShapeMask) -> Self {
        let grid = shape.grid();
        Self(Grid::from_fn(grid.width(), grid.height(), |x, y| {
            if !shape.contains(x, y) {
                return false;
            }
            let (x, y) = (x as isize, y as isize);
            (-1..=1).any(|dy| (-1..=1).any(|dx| !shape.contains_signed(x + dx, y + dy)))
        }))
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.0.get(x, y)
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(rows: &[&str]) -> ShapeMask {
        let height = rows.len();
        let width = rows[0].len();
        ShapeMask::from_grid(Grid::from_fn(width, height, |x, y| {
            rows[y].as_bytes()[x] == b'#'
        }))
    }

    #[test]
    fn white_and_transparent_are_background() {
        assert!(!is_silhouette([255, 255, 255, 255]));
        assert!(!is_silhouette([12, 200, 40, 0]));
        assert!(is_silhouette([255, 255, 255, 254]));
        assert!(is_silhouette([255, 255, 254, 255]));
        assert!(is_silhouette([0, 0, 0, 1]));
    }

    #[test]
    fn full_canvas_silhouette_has_ring_boundary() {
        let shape = shape(&["####", "####", "####", "####"]);
        let boundary = BoundaryMask::from_shape(&shape);
        for y in 0..4 {
            for x in 0..4 {
                let ring = x == 0 || y == 0 || x == 3 || y == 3;
                assert_eq!(boundary.contains(x, y), ring, "({x}, {y})");
            }
        }
    }

    #[test]
    fn diagonal_neighbours_count() {
        let shape = shape(&[
            ".....",
            ".###.",
            ".####",
            ".####",
            ".####",
        ]);
        let boundary = BoundaryMask::from_shape(&shape);
        // (1,1)..(3,3) are all inside.
        assert!(!boundary.contains(2, 2));
        // (3, 2) has the background pixel (4, 1) as a diagonal neighbour.
        assert!(boundary.contains(3, 2));
        assert!(!boundary.contains(0, 0));
    }
}
