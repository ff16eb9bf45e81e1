use std::f64::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;

use super::bounds::BoundingBox;

pub const MAX_ZOOM: u8 = 20;

/// Address of a single slippy map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub zoom: u8,
    pub column: u32,
    pub row: u32,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.column, self.row)
    }
}

/// Column and row of the tile containing the point, per the OSM slippy map formula:
/// https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames#lon.2Flat_to_tile_numbers
///
/// Both values are truncated toward zero, not floored, so a point slightly west of -180 still
/// lands in column 0. Latitudes of +-90 blow up the secant and must be rejected beforehand.
pub fn lat_lon_to_tile(lat: f64, lon: f64, zoom: u8) -> (i64, i64) {
    let n = 2_f64.powi(zoom as i32);
    let lat_rad = lat.to_radians();
    let column = ((lon + 180.0) / 360.0 * n) as i64;
    let row = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n) as i64;
    (column, row)
}

/// Latitude and longitude of the north-west corner of a tile.
pub fn tile_to_lat_lon(column: u32, row: u32, zoom: u8) -> (f64, f64) {
    let n = 2_f64.powi(zoom as i32);
    let lon = column as f64 / n * 360.0 - 180.0;
    let lat_rad = ((1.0 - 2.0 * row as f64 / n) * PI).sinh().atan();
    (lat_rad.to_degrees(), lon)
}

/// Inclusive block of tiles covering a bounding box at one zoom level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRect {
    pub zoom: u8,
    pub columns: RangeInclusive<u32>,
    pub rows: RangeInclusive<u32>,
}

impl TileRect {
    pub fn covering(bounds: &BoundingBox, zoom: u8) -> TileRect {
        let (lat_start, lon_start) = bounds.north_west();
        let (lat_end, lon_end) = bounds.south_east();
        let (column_start, row_start) = lat_lon_to_tile(lat_start, lon_start, zoom);
        let (column_end, row_end) = lat_lon_to_tile(lat_end, lon_end, zoom);

        // beyond +-180 or the mercator latitude limit the indices fall outside the grid
        let last = 2_i64.pow(zoom as u32) - 1;
        let clamp = |index: i64| index.max(0).min(last) as u32;

        TileRect {
            zoom,
            columns: clamp(column_start)..=clamp(column_end),
            rows: clamp(row_start)..=clamp(row_end),
        }
    }

    pub fn len(&self) -> u64 {
        let width = (*self.columns.end() as u64 + 1).saturating_sub(*self.columns.start() as u64);
        let height = (*self.rows.end() as u64 + 1).saturating_sub(*self.rows.start() as u64);
        width * height
    }

    /// Geographic extent actually covered by the tiles, as north-west and south-east corners.
    pub fn extent(&self) -> ((f64, f64), (f64, f64)) {
        let north_west = tile_to_lat_lon(*self.columns.start(), *self.rows.start(), self.zoom);
        let south_east = tile_to_lat_lon(*self.columns.end() + 1, *self.rows.end() + 1, self.zoom);
        (north_west, south_east)
    }

    /// Every tile in the rectangle, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let zoom = self.zoom;
        let rows = self.rows.clone();
        self.columns.clone().flat_map(move |column| {
            rows.clone().map(move |row| TileCoord { zoom, column, row })
        })
    }
}
