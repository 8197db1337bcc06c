//! Colormap implementations for the colorized product.

pub mod colormap;
pub mod jet;

pub use colormap::Colormap;
pub use jet::Jet;
