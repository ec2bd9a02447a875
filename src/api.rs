use std::{io::Read, time::Duration};

use tracing::debug;

use crate::{
    error::SeamlessError,
    model::{Asset, Release},
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A response body that hasn't been read yet
pub struct Body {
    /// Value of the `Content-Length` header, if the server sent one
    pub len: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

/// The two kinds of GET request the installer makes
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Fetch a url and return the whole body as text
    ///
    /// # Errors
    /// * `SeamlessError::Network` if the request fails or the server returns an error status
    fn get_text(&self, url: &str) -> Result<String, SeamlessError>;

    /// Fetch a url and return the body as a stream
    ///
    /// # Errors
    /// * `SeamlessError::Network` if the request fails or the server returns an error status
    fn get_body(&self, url: &str) -> Result<Body, SeamlessError>;
}

/// Blocking HTTP transport backed by a `ureq::Agent`
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Without a timeout requests can block forever
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
        }
    }

    fn call(&self, url: &str, accept: &str) -> Result<ureq::Response, SeamlessError> {
        self.agent
            .get(url)
            .set("accept", accept)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, res) => SeamlessError::network(
                    url,
                    format!("server returned {code} {}", res.status_text()),
                ),
                ureq::Error::Transport(t) => SeamlessError::network(url, t),
            })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn get_text(&self, url: &str) -> Result<String, SeamlessError> {
        self.call(url, "application/vnd.github+json")?
            .into_string()
            .map_err(|e| SeamlessError::network(url, e))
    }

    fn get_body(&self, url: &str) -> Result<Body, SeamlessError> {
        let res = self.call(url, "application/octet-stream")?;
        let len = res
            .header("content-length")
            .and_then(|v| v.trim().parse().ok());

        Ok(Body {
            len,
            reader: res.into_reader(),
        })
    }
}

/// Builds the "latest release" endpoint for `repo` (`owner/name`)
pub fn latest_release_endpoint(api_base: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/releases/latest",
        api_base.trim_end_matches('/'),
        repo.trim_matches('/')
    )
}

/// # Errors
/// * Network errors
/// * Unexpected response format from the release API
pub fn get_latest_release(
    transport: &impl Transport,
    api_base: &str,
    repo: &str,
) -> Result<Release, SeamlessError> {
    let url = latest_release_endpoint(api_base, repo);
    debug!("Requesting latest release from {url}");
    let raw = transport.get_text(&url)?;
    let release: Release = serde_json::from_str(&raw)?;
    debug!(
        "Release {} has {} assets",
        release.label().unwrap_or("<untagged>"),
        release.assets.len()
    );

    Ok(release)
}

/// Picks the asset to install from a release
///
/// # Errors
/// * `SeamlessError::NoAssets` if the release has nothing attached
pub fn first_asset<'a>(release: &'a Release, repo: &str) -> Result<&'a Asset, SeamlessError> {
    release
        .first_asset()
        .ok_or_else(|| SeamlessError::NoAssets(repo.into()))
}

/// Resolve the download url of the first asset of the latest release
pub fn latest_release_url(
    transport: &impl Transport,
    api_base: &str,
    repo: &str,
) -> Result<String, SeamlessError> {
    let release = get_latest_release(transport, api_base, repo)?;
    let asset = first_asset(&release, repo)?;

    Ok(asset.browser_download_url.clone())
}
