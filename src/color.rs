//! Fixed color palette shared by every node in the scene.
//!
//! Nodes store an index into [`COLORS`] rather than an RGB value, and cycle
//! through the palette with [`rotated`]. Index arithmetic wraps at both ends
//! of the palette so it is defined for every starting index.

/// Lowest valid palette index.
pub const MIN_COLOR: usize = 0;

/// Highest valid palette index.
pub const MAX_COLOR: usize = 9;

/// The palette, indexed by a node's color index.
pub const COLORS: [[f32; 3]; 10] = [
    [1.0, 1.0, 1.0],    // white
    [0.05, 0.05, 0.9],  // blue
    [0.05, 0.9, 0.05],  // green
    [0.9, 0.05, 0.05],  // red
    [0.9, 0.9, 0.0],    // yellow
    [0.1, 0.8, 0.7],    // teal
    [0.7, 0.2, 0.7],    // purple
    [0.7, 0.7, 0.7],    // light grey
    [0.4, 0.4, 0.4],    // dark grey
    [0.0, 0.0, 0.0],    // black
];

/// Returns the next palette index in the given direction, wrapping past
/// either end of the palette.
pub fn rotated(index: usize, forward: bool) -> usize {
    if forward {
        if index >= MAX_COLOR {
            MIN_COLOR
        } else {
            index + 1
        }
    } else if index <= MIN_COLOR {
        MAX_COLOR
    } else {
        index - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_wraps_to_min() {
        assert_eq!(rotated(MAX_COLOR, true), MIN_COLOR);
    }

    #[test]
    fn backward_wraps_to_max() {
        assert_eq!(rotated(MIN_COLOR, false), MAX_COLOR);
    }

    #[test]
    fn full_cycle_returns_home() {
        let mut index = 3;
        for _ in 0..COLORS.len() {
            index = rotated(index, true);
        }
        assert_eq!(index, 3);
    }

    #[test]
    fn out_of_range_indices_clamp_into_palette() {
        // A corrupt index still lands back inside the palette.
        assert_eq!(rotated(MAX_COLOR + 5, true), MIN_COLOR);
        assert_eq!(rotated(MAX_COLOR + 5, false), MAX_COLOR + 4);
    }
}
