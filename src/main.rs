use anyhow::{ensure, Result};
use argh::FromArgs;
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod models;
mod progress;
mod tile_server;

use commands::download_tiles;
use models::{BoundingBox, ZoomRange};
use tile_server::ClientOptions;

#[derive(FromArgs)]
/// Downloads every slippy map tile covering a bounding box over a range of zoom levels into
/// <output-dir>/<zoom>/<column>/<row>.png, skipping tiles that are already on disk.
struct Args {
    /// latitude of the top left (north-west) corner
    #[argh(option)]
    lat_start: f64,

    /// longitude of the top left (north-west) corner
    #[argh(option)]
    lon_start: f64,

    /// latitude of the bottom right (south-east) corner
    #[argh(option)]
    lat_end: f64,

    /// longitude of the bottom right (south-east) corner
    #[argh(option)]
    lon_end: f64,

    /// minimal zoom level (included)
    #[argh(option)]
    zoom_min: u8,

    /// maximal zoom level (included)
    #[argh(option)]
    zoom_max: u8,

    /// base URL of the tile server, tiles are requested from <url>/<zoom>/<column>/<row>.png
    #[argh(option)]
    url: String,

    /// directory to save tiles into, defaults to "tiles/"
    #[argh(option, default = "PathBuf::from(\"tiles/\")")]
    output_dir: PathBuf,

    /// seconds to wait for a whole tile request, waits forever when omitted
    #[argh(option)]
    timeout: Option<u64>,

    /// seconds to wait for a connection to the tile server, waits forever when omitted
    #[argh(option)]
    connect_timeout: Option<u64>,

    /// user agent sent to the tile server
    #[argh(option, default = "tile_server::USER_AGENT.to_string()")]
    user_agent: String,

    /// number of tiles to download at once, defaults to 1
    #[argh(option, default = "1")]
    concurrency: usize,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    let bounds = BoundingBox::new(args.lat_start, args.lon_start, args.lat_end, args.lon_end)?;
    let zooms = ZoomRange::new(args.zoom_min, args.zoom_max)?;
    let base_url = tile_server::base_url(&args.url)?;
    ensure!(args.concurrency >= 1, "concurrency must be at least 1");

    let client = tile_server::build_client(&ClientOptions {
        user_agent: args.user_agent,
        timeout: args.timeout.map(Duration::from_secs),
        connect_timeout: args.connect_timeout.map(Duration::from_secs),
    })?;

    info!(url = %base_url, ?bounds, ?zooms, "starting tile download");
    download_tiles(
        &client,
        &bounds,
        zooms,
        &base_url,
        &args.output_dir,
        args.concurrency,
    )
    .await?;

    Ok(())
}
