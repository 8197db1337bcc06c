//! Colormap trait.
//!
//! This module defines the common interface for all colormaps.

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized value (0.0 to 1.0) to an opaque RGBA color
    fn map_normalized(&self, value: f32) -> [u8; 4];

    /// Map a value to an RGBA color given the data range.
    ///
    /// Values outside `[min, max]` clamp to the ramp ends. `DisplayRange`
    /// always supplies `max > min`; callers passing an empty range directly
    /// get the middle of the ramp.
    fn map(&self, value: f32, min: f32, max: f32) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}
