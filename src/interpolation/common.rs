//! Common utilities for interpolation algorithms.

/// True when the fractional pixel-center position lies on a pixel of a grid
/// with `rows` x `cols` pixels. Pixel `i` covers `[i - 0.5, i + 0.5)`.
pub fn within_grid(row: f64, col: f64, rows: usize, cols: usize) -> bool {
    row >= -0.5 && col >= -0.5 && row < rows as f64 - 0.5 && col < cols as f64 - 0.5
}

/// Clamp an index to valid bounds
pub fn clamp_index(index: f64, size: usize) -> f64 {
    index.max(0.0).min((size - 1) as f64)
}

/// Get the weight for linear interpolation
pub fn linear_weight(fraction: f64) -> (f64, f64) {
    (1.0 - fraction, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_grid() {
        assert!(within_grid(0.0, 0.0, 3, 3));
        assert!(within_grid(-0.5, -0.5, 3, 3));
        assert!(within_grid(2.49, 2.49, 3, 3));
        assert!(!within_grid(2.5, 0.0, 3, 3));
        assert!(!within_grid(0.0, -0.51, 3, 3));
        assert!(!within_grid(f64::NAN, 0.0, 3, 3));
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-1.0, 10), 0.0);
        assert_eq!(clamp_index(5.5, 10), 5.5);
        assert_eq!(clamp_index(15.0, 10), 9.0);
    }

    #[test]
    fn test_linear_weight() {
        let (w0, w1) = linear_weight(0.3);
        assert!((w0 - 0.7).abs() < 1e-10);
        assert!((w1 - 0.3).abs() < 1e-10);
        assert!((w0 + w1 - 1.0).abs() < 1e-10);
    }
}
