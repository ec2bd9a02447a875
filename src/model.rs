use serde::{Deserialize, Serialize};

/// The parts of a GitHub release we care about
///
/// Anything else in the response is ignored
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub assets: Vec<Asset>,
}

impl Release {
    /// The asset that gets installed. Always the first one listed.
    pub fn first_asset(&self) -> Option<&Asset> {
        self.assets.first()
    }

    /// Tag if present, else the release name
    pub fn label(&self) -> Option<&str> {
        self.tag_name.as_deref().or(self.name.as_deref())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub browser_download_url: String,
    #[serde(default)]
    pub name: Option<String>,
    ///Size in bytes as reported by the API
    #[serde(default)]
    pub size: Option<u64>,
}

impl Asset {
    pub fn size_string(&self) -> Option<String> {
        let size = self.size?;
        if size / 1_000_000 >= 1 {
            let size = size as f64 / 1_048_576f64;

            Some(format!("{size:.2} MB"))
        } else {
            let size = size as f64 / 1024f64;
            Some(format!("{size:.2} KB"))
        }
    }
}

/// Outcome of setting a single key in a settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    /// The key didn't exist and was added
    Created,
    /// The key existed with a different value
    Updated,
    /// The key already had the requested value
    Unchanged,
}
