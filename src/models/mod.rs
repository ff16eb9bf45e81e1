pub mod bounds;
pub mod tile;

pub use bounds::{BoundingBox, ZoomRange};
pub use tile::{TileCoord, TileRect};
