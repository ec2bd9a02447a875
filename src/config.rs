use std::path::PathBuf;

pub const DEFAULT_REPO: &str = "LukeYui/EldenRingSeamlessCoopRelease";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const PASSWORD_FILE: &str = "password.txt";
/// Relative to the install directory
pub const SETTINGS_PATH: &str = "SeamlessCoop/ersc_settings.ini";
pub const PASSWORD_SECTION: &str = "PASSWORD";
pub const PASSWORD_KEY: &str = "cooppassword";

/// Everything a run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `owner/name` of the GitHub repository to install from
    pub repo: String,
    pub api_base: String,
    pub password_file: PathBuf,
    /// Directory the archive is extracted into
    pub dest: PathBuf,
    /// Settings file, relative to `dest`
    pub settings: PathBuf,
    /// Where the downloaded archive is kept while extracting. `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.into(),
            api_base: DEFAULT_API_BASE.into(),
            password_file: PASSWORD_FILE.into(),
            dest: PathBuf::from("."),
            settings: SETTINGS_PATH.into(),
            scratch_dir: None,
        }
    }
}

impl Config {
    pub fn settings_path(&self) -> PathBuf {
        self.dest.join(&self.settings)
    }
}
