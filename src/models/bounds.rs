use anyhow::{ensure, Result};
use std::ops::RangeInclusive;

use super::tile::MAX_ZOOM;

/// Area to download, given by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    lat_start: f64,
    lon_start: f64,
    lat_end: f64,
    lon_end: f64,
}

impl BoundingBox {
    pub fn new(lat_start: f64, lon_start: f64, lat_end: f64, lon_end: f64) -> Result<Self> {
        for &(name, lat) in [("lat_start", lat_start), ("lat_end", lat_end)].iter() {
            ensure!(lat.is_finite(), "{} must be a finite number, got {}", name, lat);
            // the secant is undefined at the poles
            ensure!(
                lat.abs() < 90.0,
                "{} must be strictly between -90 and 90 degrees, got {}",
                name,
                lat
            );
        }
        for &(name, lon) in [("lon_start", lon_start), ("lon_end", lon_end)].iter() {
            ensure!(lon.is_finite(), "{} must be a finite number, got {}", name, lon);
        }
        ensure!(
            lat_start > lat_end,
            "lat_start ({}) must be north of lat_end ({})",
            lat_start,
            lat_end
        );
        ensure!(
            lon_start < lon_end,
            "lon_start ({}) must be west of lon_end ({})",
            lon_start,
            lon_end
        );

        Ok(BoundingBox {
            lat_start,
            lon_start,
            lat_end,
            lon_end,
        })
    }

    pub fn north_west(&self) -> (f64, f64) {
        (self.lat_start, self.lon_start)
    }

    pub fn south_east(&self) -> (f64, f64) {
        (self.lat_end, self.lon_end)
    }
}

/// Inclusive range of zoom levels, never deeper than `MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Result<Self> {
        ensure!(
            max <= MAX_ZOOM,
            "zoom_max must be at most {}, got {}",
            MAX_ZOOM,
            max
        );
        ensure!(
            min <= max,
            "zoom_min ({}) must not be greater than zoom_max ({})",
            min,
            max
        );
        Ok(ZoomRange { min, max })
    }

    pub fn levels(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}
