
pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod model;

// Important functions and structs
pub use crate::core::{run, Event, Summary};
pub use crate::error::SeamlessError;

pub mod prelude {
    pub use crate::api::{get_latest_release, latest_release_url, Transport, UreqTransport};
    pub use crate::config::Config;
    pub use crate::core::{
        download_file, download_file_with_progress, extract, install_from_url, patch_config,
        read_password, run, Event, Summary,
    };
    pub use crate::error::SeamlessError;
    pub use crate::model::{Asset, Patch, Release};
}
