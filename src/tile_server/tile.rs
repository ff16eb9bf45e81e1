use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use tempfile::Builder;
use tracing::{debug, instrument};

use crate::models::TileCoord;

pub struct TileResponse {
    pub url: String,
    body: Vec<u8>,
}

pub fn tile_url(base_url: &str, tile: TileCoord) -> String {
    format!("{}/{}/{}/{}.png", base_url, tile.zoom, tile.column, tile.row)
}

#[instrument(level = "debug", skip(client))]
pub async fn get(client: &Client, base_url: &str, tile: TileCoord) -> Result<TileResponse> {
    let url = tile_url(base_url, tile);
    let res = client.get(&url).send().await?.error_for_status()?;
    debug!(status = %res.status(), "fetched tile from server");
    let body = res.bytes().await?.to_vec();

    Ok(TileResponse { url, body })
}

impl TileResponse {
    pub fn len(&self) -> u64 {
        self.body.len() as u64
    }

    /// Writes the body verbatim to `path`.
    ///
    /// The bytes go to a temporary file next to `path` which is renamed into place once fully
    /// written, so `path` never holds a truncated tile.
    pub fn save(&self, path: &Path) -> Result<u64> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("tile path {} has no parent directory", path.display()))?;
        let mut temp_file = Builder::new()
            .prefix(".tile")
            .suffix(".part")
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        temp_file
            .write_all(&self.body)
            .with_context(|| format!("failed to write tile to {}", temp_file.path().display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp_file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        temp_file
            .persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to move tile into {}", path.display()))?;
        Ok(self.len())
    }
}
