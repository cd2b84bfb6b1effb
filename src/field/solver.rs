//! Jacobi relaxation of a Poisson problem over the silhouette.
//!
//! Solves `-lap(u) = source` with `u = 0` on the boundary and outside the
//! silhouette. The steady state behaves like a distance-from-edge field,
//! peaking deep inside the shape. The sweep count is fixed; there is no
//! convergence test.

use super::grid::Grid;
use super::mask::{BoundaryMask, ShapeMask};

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

pub const ITERATIONS: usize = 300;
pub const SOURCE: f64 = 0.01;

/// Sweep count and source term for [`Relaxation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub iterations: usize,
    pub source: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: ITERATIONS,
            source: SOURCE,
        }
    }
}

/// Double-buffered relaxation state. `current` is only read and `next` only
/// written during a sweep; the two are swapped afterwards.
///
/// Cells are stored as `f32`, but each update is summed in `f64` and rounded
/// once on store.
pub struct Relaxation<'a> {
    shape: &'a ShapeMask,
    boundary: &'a BoundaryMask,
    source: f64,
    current: Grid<f32>,
    next: Grid<f32>,
    sweeps: usize,
}

impl<'a> Relaxation<'a> {
    pub fn new(shape: &'a ShapeMask, boundary: &'a BoundaryMask, source: f64) -> Self {
        let (width, height) = (shape.grid().width(), shape.grid().height());
        Self {
            shape,
            boundary,
            source,
            current: Grid::filled(width, height, 0.0),
            next: Grid::filled(width, height, 0.0),
            sweeps: 0,
        }
    }

    /// Run one synchronous sweep over every pixel.
    pub fn sweep(&mut self) {
        let width = self.current.width();
        if width == 0 {
            return;
        }
        let current = &self.current;
        let (shape, boundary, source) = (self.shape, self.boundary, self.source);

        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        self.next
            .cells_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| relax_row(shape, boundary, source, current, y, row));

        #[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
        self.next
            .cells_mut()
            .chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| relax_row(shape, boundary, source, current, y, row));

        std::mem::swap(&mut self.current, &mut self.next);
        self.sweeps += 1;
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Result of the most recent sweep.
    pub fn field(&self) -> &Grid<f32> {
        &self.current
    }

    pub fn into_field(self) -> Grid<f32> {
        self.current
    }
}

fn relax_row(
    shape: &ShapeMask,
    boundary: &BoundaryMask,
    source: f64,
    current: &Grid<f32>,
    y: usize,
    row: &mut [f32],
) {
    for (x, out) in row.iter_mut().enumerate() {
        if !shape.contains(x, y) || boundary.contains(x, y) {
            *out = 0.0;
            continue;
        }
        let (x, y) = (x as isize, y as isize);
        let neighbours = sample(shape, current, x + 1, y)
            + sample(shape, current, x - 1, y)
            + sample(shape, current, x, y + 1)
            + sample(shape, current, x, y - 1);
        *out = ((source + neighbours) / 4.0) as f32;
    }
}

// Off-grid and out-of-silhouette neighbours contribute nothing.
#[inline]
fn sample(shape: &ShapeMask, field: &Grid<f32>, x: isize, y: isize) -> f64 {
    if !shape.contains_signed(x, y) {
        return 0.0;
    }
    f64::from(field.get(x as usize, y as usize))
}

/// Run the full fixed-length solve from a zero field.
pub fn solve(shape: &ShapeMask, boundary: &BoundaryMask, settings: SolverSettings) -> Grid<f32> {
    let mut relaxation = Relaxation::new(shape, boundary, settings.source);
    for _ in 0..settings.iterations {
        relaxation.sweep();
    }
    relaxation.into_field()
}
