//! The "jet" ramp: dark blue through cyan, yellow and red to dark red.
//!
//! Reproduces the conventional 256-entry jet lookup table so products match
//! what scientific plotting tools render for the same normalized values.

use super::colormap::Colormap;

/// Number of entries in the lookup table
const LUT_SIZE: usize = 256;

/// Piecewise-linear anchors (x, intensity) per channel
const RED: [(f32, f32); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const GREEN: [(f32, f32); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const BLUE: [(f32, f32); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// Jet colormap
pub struct Jet;

impl Colormap for Jet {
    fn map_normalized(&self, value: f32) -> [u8; 4] {
        // Entry selection truncates, so only exactly 1.0 reaches the last entry
        let entry = ((value.clamp(0.0, 1.0) * LUT_SIZE as f32) as usize).min(LUT_SIZE - 1);
        let x = entry as f32 / (LUT_SIZE - 1) as f32;

        [
            to_byte(segment(&RED, x)),
            to_byte(segment(&GREEN, x)),
            to_byte(segment(&BLUE, x)),
            255,
        ]
    }

    fn name(&self) -> &str {
        "jet"
    }
}

/// Evaluate a channel's anchors at `x` in [0, 1]
fn segment(anchors: &[(f32, f32)], x: f32) -> f32 {
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            return y0 + (y1 - y0) * t;
        }
    }
    anchors[anchors.len() - 1].1
}

fn to_byte(intensity: f32) -> u8 {
    (intensity.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_name() {
        assert_eq!(Jet.name(), "jet");
    }

    #[test]
    fn test_jet_ends() {
        assert_eq!(Jet.map_normalized(0.0), [0, 0, 127, 255]);
        assert_eq!(Jet.map_normalized(1.0), [127, 0, 0, 255]);
    }

    #[test]
    fn test_jet_middle() {
        // Entry 128 sits at x = 128/255: full green, red and blue near half
        let middle = Jet.map_normalized(0.5);
        assert_eq!(middle[1], 255);
        assert!((118..=126).contains(&middle[0]), "{:?}", middle);
        assert!((118..=126).contains(&middle[2]), "{:?}", middle);
    }

    #[test]
    fn test_jet_hue_progression() {
        let low = Jet.map_normalized(0.1);
        let high = Jet.map_normalized(0.9);

        assert!(low[2] > low[0], "low end should be blue: {:?}", low);
        assert!(high[0] > high[2], "high end should be red: {:?}", high);
    }

    #[test]
    fn test_jet_map_with_range() {
        assert_eq!(Jet.map(10.0, 10.0, 90.0), [0, 0, 127, 255]);
        assert_eq!(Jet.map(90.0, 10.0, 90.0), [127, 0, 0, 255]);
        assert_eq!(Jet.map(200.0, 10.0, 90.0), [127, 0, 0, 255]);
    }
}
