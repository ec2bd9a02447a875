pub mod manage;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    api::{self, Transport},
    config::{Config, PASSWORD_KEY, PASSWORD_SECTION},
    error::SeamlessError,
    model::{Asset, Patch, Release},
};

pub use manage::{download_file, download_file_with_progress, extract, install_from_url};
pub use settings::patch_config;
pub use utils::read_password;

/// Progress reported by `run` as it moves through the install
#[derive(Debug)]
pub enum Event<'a> {
    /// About to ask the API for the latest release
    Resolving { repo: &'a str },
    /// Found the release and the asset that will be installed
    Resolved {
        release: &'a Release,
        asset: &'a Asset,
    },
    /// A chunk of the archive arrived. `total` is 0 if the size is unknown.
    Download { delta: u64, current: u64, total: u64 },
    Extracted { entries: usize, dest: &'a Path },
    Patched { path: &'a Path, patch: Patch },
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub release: Option<String>,
    pub url: String,
    pub entries: usize,
    pub settings: PathBuf,
    pub patch: Patch,
}

/// Install the latest release and set the co-op password
///
/// Reads the password, resolves the latest release, downloads and extracts its first
/// asset into `config.dest`, then writes the password into the settings file that came
/// with it. Stops at the first error.
pub fn run<F>(
    config: &Config,
    transport: &impl Transport,
    mut on_event: F,
) -> Result<Summary, SeamlessError>
where
    F: FnMut(Event<'_>),
{
    let password = utils::read_password(&config.password_file)?;
    settings::check_value(PASSWORD_KEY, &password)?;

    on_event(Event::Resolving { repo: &config.repo });
    let release = api::get_latest_release(transport, &config.api_base, &config.repo)?;
    let asset = api::first_asset(&release, &config.repo)?;
    on_event(Event::Resolved {
        release: &release,
        asset,
    });

    let entries = manage::install_from_url(
        transport,
        &asset.browser_download_url,
        &config.dest,
        config.scratch_dir.as_deref(),
        |delta, current, total| {
            on_event(Event::Download {
                delta,
                current,
                total,
            })
        },
    )?;
    on_event(Event::Extracted {
        entries,
        dest: &config.dest,
    });

    let path = config.settings_path();
    debug!("Patching {}", path.display());
    let patch = settings::patch_config(&path, PASSWORD_SECTION, PASSWORD_KEY, &password)?;
    on_event(Event::Patched { path: &path, patch });

    Ok(Summary {
        release: release.label().map(String::from),
        url: asset.browser_download_url.clone(),
        entries,
        settings: path,
        patch,
    })
}
