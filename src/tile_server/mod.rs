use anyhow::{anyhow, ensure, Result};
use reqwest::{Client, Url};
use std::time::Duration;

pub mod tile;

#[cfg(test)]
pub mod test_server;

pub static USER_AGENT: &str = "tile-downloader/0.1";

/// Settings for the HTTP client used against the tile server.
///
/// Both timeouts default to `None`: a tile request waits on the server for as long as it takes.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            user_agent: USER_AGENT.to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

pub fn build_client(options: &ClientOptions) -> Result<Client> {
    let mut builder = Client::builder().user_agent(options.user_agent.as_str());
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    Ok(builder.build()?)
}

/// Validates the tile server URL and strips any trailing slashes so tile paths can be appended.
pub fn base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    ensure!(!trimmed.is_empty(), "tile server url must not be empty");
    let parsed =
        Url::parse(trimmed).map_err(|err| anyhow!("invalid tile server url {}: {}", url, err))?;
    ensure!(
        parsed.scheme() == "http" || parsed.scheme() == "https",
        "tile server url must use http or https, got {}",
        parsed.scheme()
    );
    Ok(trimmed.to_string())
}
