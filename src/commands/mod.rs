pub mod download_tiles;

pub use download_tiles::download_tiles;
