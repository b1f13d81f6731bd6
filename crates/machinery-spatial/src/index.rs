//! Coordinate <-> linear index mapping for a fixed-width, row-major grid.
//!
//! Pure functions with no bounds checking; callers check bounds before
//! indexing into storage. `width` must be non-zero.

/// Linear index of `(x, y)`.
#[inline]
pub fn to_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// `(x, y)` of a linear index.
#[inline]
pub fn from_index(index: usize, width: u32) -> (u32, u32) {
    let w = width as usize;
    ((index % w) as u32, (index / w) as u32)
}
