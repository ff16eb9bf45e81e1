use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::{BoundingBox, TileCoord, TileRect, ZoomRange};
use crate::progress;
use crate::tile_server::{self, tile::tile_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    Downloaded { bytes: u64 },
    Skipped,
    Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub total: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub bytes: u64,
}

impl FetchStats {
    pub fn completed(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

/// Counters for one run, advanced as each tile finishes.
struct FetchSession {
    stats: FetchStats,
}

impl FetchSession {
    fn new(total: u64) -> FetchSession {
        FetchSession {
            stats: FetchStats {
                total,
                ..FetchStats::default()
            },
        }
    }

    fn record(&mut self, outcome: TileOutcome) {
        match outcome {
            TileOutcome::Downloaded { bytes } => {
                self.stats.downloaded += 1;
                self.stats.bytes += bytes;
            }
            TileOutcome::Skipped => self.stats.skipped += 1,
            TileOutcome::Failed => self.stats.failed += 1,
        }
        println!("{}", progress::bar(self.stats.total, self.stats.completed()));
    }
}

pub fn tile_path(output_dir: &Path, tile: TileCoord) -> PathBuf {
    output_dir
        .join(tile.zoom.to_string())
        .join(tile.column.to_string())
        .join(format!("{}.png", tile.row))
}

/// Fetches one tile into `output_dir` unless it is already there.
///
/// HTTP and connection errors only fail this tile. Local filesystem errors are returned.
pub async fn fetch_tile(
    client: &Client,
    base_url: &str,
    output_dir: &Path,
    tile: TileCoord,
) -> Result<TileOutcome> {
    let path = tile_path(output_dir, tile);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create tile directory {}", dir.display()))?;
    }

    if path.is_file() {
        info!(%tile, path = %path.display(), "skipping tile, already exists");
        return Ok(TileOutcome::Skipped);
    }

    match tile_server::tile::get(client, base_url, tile).await {
        Ok(res) => {
            let bytes = res.save(&path)?;
            info!(url = %res.url, bytes, "downloaded tile");
            Ok(TileOutcome::Downloaded { bytes })
        }
        Err(err) => {
            if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
                let url = tile_url(base_url, tile);
                if let Some(status) = reqwest_err.status() {
                    warn!(%url, %status, "error when downloading tile, skipping tile");
                } else {
                    warn!(
                        %url,
                        error = %reqwest_err,
                        "error when connecting to tile server, is the server running? skipping tile"
                    );
                }
                return Ok(TileOutcome::Failed);
            }
            Err(err)
        }
    }
}

/// Downloads every tile covering `bounds` at each zoom level into `output_dir`.
///
/// Tiles already on disk are skipped, so an interrupted run can simply be started again.
/// `concurrency` caps how many tiles are in flight at once, 1 keeps the run strictly serial.
pub async fn download_tiles(
    client: &Client,
    bounds: &BoundingBox,
    zooms: ZoomRange,
    base_url: &str,
    output_dir: &Path,
    concurrency: usize,
) -> Result<FetchStats> {
    let total: u64 = zooms
        .levels()
        .map(|zoom| TileRect::covering(bounds, zoom).len())
        .sum();
    info!(total, output_dir = %output_dir.display(), "downloading tiles");
    let mut session = FetchSession::new(total);

    for zoom in zooms.levels() {
        let rect = TileRect::covering(bounds, zoom);
        let (north_west, south_east) = rect.extent();
        info!(
            zoom,
            columns = ?rect.columns,
            rows = ?rect.rows,
            tiles = rect.len(),
            ?north_west,
            ?south_east,
            "downloading zoom level"
        );

        let mut outcomes = stream::iter(rect.tiles())
            .map(|tile| fetch_tile(client, base_url, output_dir, tile))
            .buffer_unordered(concurrency.max(1));
        while let Some(outcome) = outcomes.next().await {
            session.record(outcome?);
        }
    }

    let stats = session.stats;
    info!(
        total = stats.total,
        downloaded = stats.downloaded,
        skipped = stats.skipped,
        failed = stats.failed,
        bytes = stats.bytes,
        "finished downloading tiles"
    );
    Ok(stats)
}
