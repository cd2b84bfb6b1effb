//! Row-major owned 2-D grids.

/// A `width x height` grid stored row-major, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[y * self.width + x]
    }

    /// Value at signed coordinates, or `None` when off-grid.
    #[inline]
    pub fn get_signed(&self, x: isize, y: isize) -> Option<T> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_is_row_major() {
        let grid = Grid::from_fn(3, 2, |x, y| y * 10 + x);
        assert_eq!(grid.cells(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.get(2, 1), 12);
    }

    #[test]
    fn signed_access_treats_off_grid_as_none() {
        let grid = Grid::filled(2, 2, true);
        assert_eq!(grid.get_signed(-1, 0), None);
        assert_eq!(grid.get_signed(0, 2), None);
        assert_eq!(grid.get_signed(1, 1), Some(true));
    }
}
