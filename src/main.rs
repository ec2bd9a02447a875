use std::{path::PathBuf, time::Duration};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use seamless::{
    config::{self, Config},
    prelude::*,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Download the latest Seamless Co-op release into the current directory and set its co-op password
#[derive(Parser, Debug)]
#[command(name = "seamless-installer")]
#[command(version, about)]
struct Cli {
    /// GitHub repository to install from
    #[arg(long, value_name = "OWNER/NAME", default_value = config::DEFAULT_REPO)]
    repo: String,

    /// Root of the release API
    #[arg(long, value_name = "URL", default_value = config::DEFAULT_API_BASE)]
    api_base: String,

    /// File containing the co-op password
    #[arg(short, long, value_name = "PATH", default_value = config::PASSWORD_FILE)]
    password_file: PathBuf,

    /// Directory to extract the release into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dest: PathBuf,

    /// Settings file to patch, relative to --dest
    #[arg(long, value_name = "PATH", default_value = config::SETTINGS_PATH)]
    settings: PathBuf,

    /// Directory to keep the downloaded archive in [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Give up on HTTP requests after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Don't show a download progress bar
    #[arg(long)]
    no_progress: bool,

    /// More logging, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            repo: self.repo.clone(),
            api_base: self.api_base.clone(),
            password_file: self.password_file.clone(),
            dest: self.dest.clone(),
            settings: self.settings.clone(),
            scratch_dir: self.temp_dir.clone(),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar()
        .progress_chars("->.")
        .template("{msg} {wide_bar} {bytes}/{total_bytes}")
    {
        Ok(style) => pb.set_style(style),
        Err(e) => error!("Bad progress bar template: {e}"),
    }
    pb.with_message("Downloading")
}

fn main() {
    // clap would exit with status 2 on bad arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(io) = e.print() {
                eprintln!("{io}");
            }
            return;
        }
    };
    init_logging(cli.verbose);

    let config = cli.config();
    let transport = UreqTransport::new(cli.timeout.map(Duration::from_secs));
    let mut bar: Option<ProgressBar> = None;

    let res = run(&config, &transport, |event| match event {
        Event::Resolving { repo } => println!("Fetching latest release of {repo}..."),
        Event::Resolved { release, asset } => {
            let name = asset
                .name
                .as_deref()
                .unwrap_or(&asset.browser_download_url);
            match (release.label(), asset.size_string()) {
                (Some(tag), Some(size)) => println!("Downloading {name} ({tag}, {size})"),
                (Some(tag), None) => println!("Downloading {name} ({tag})"),
                (None, Some(size)) => println!("Downloading {name} ({size})"),
                (None, None) => println!("Downloading {name}"),
            }
        }
        Event::Download { delta, total, .. } => {
            if cli.no_progress {
                return;
            }
            bar.get_or_insert_with(|| progress_bar(total)).inc(delta);
        }
        Event::Extracted { entries, dest } => {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
            println!("Extracted {entries} entries to {}", dest.display());
        }
        Event::Patched { path, patch } => match patch {
            Patch::Created => println!("Added co-op password to {}", path.display()),
            Patch::Updated => println!("Updated co-op password in {}", path.display()),
            Patch::Unchanged => println!("Co-op password in {} already set", path.display()),
        },
    });

    // Failures are reported but the exit status is always 0
    match res {
        Ok(_) => println!("Successfully downloaded, unzipped, and modified the mod files."),
        Err(e) => {
            debug!("{e:?}");
            println!("{e}");
        }
    }
}
