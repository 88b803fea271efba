pub mod base;
pub mod tile;

pub use base::Overlay;
pub use tile::{TileLayer, TileLayerOptions, TileRange};
