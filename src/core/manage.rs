use std::{
    cmp::Reverse,
    fs::{self, OpenOptions},
    io::{self, ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
};

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::{api::Transport, core::utils, error::SeamlessError};

const CHUNK_SIZE: usize = 8 * 1024;

/// Download a file into `output`, calling `cb` after every chunk
/// # Params
/// * transport - `Transport` to make the request with
/// * url - URL to download from
/// * output - Writer to save the body to
/// * cb - Callback receiving (bytes in this chunk, bytes so far, total size). Total is 0 when the server didn't say.
///
/// Returns the number of bytes written
pub fn download_file_with_progress<F>(
    transport: &impl Transport,
    url: &str,
    mut output: impl Write,
    mut cb: F,
) -> Result<u64, SeamlessError>
where
    F: FnMut(u64, u64, u64),
{
    let body = transport.get_body(url)?;
    let total = body.len.unwrap_or(0);
    let mut reader = body.reader;
    debug!("Starting download from {} ({} bytes)", url, total);

    let mut buf = [0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SeamlessError::network(url, e)),
        };
        output.write_all(&buf[..n])?;
        downloaded += n as u64;
        cb(n as u64, downloaded, total);
    }
    output.flush()?;
    debug!("Finished download of {} bytes", downloaded);

    Ok(downloaded)
}

/// Wrapper for calling `download_file_with_progress` without a callback
pub fn download_file(
    transport: &impl Transport,
    url: &str,
    output: impl Write,
) -> Result<u64, SeamlessError> {
    download_file_with_progress(transport, url, output, |_, _, _| {})
}

/// Extract every entry of a zip archive into `target_dir`
///
/// Directories are recreated, parent directories are created as needed and
/// existing files are overwritten. Stored unix permission bits are applied to
/// files as they're written and to directories once everything is extracted.
///
/// Fails with `SeamlessError::UnsafePath` on the first entry that would land outside
/// `target_dir`, leaving earlier entries in place.
///
/// Returns the number of entries in the archive
pub fn extract(archive: impl Read + Seek, target_dir: impl AsRef<Path>) -> Result<usize, SeamlessError> {
    let target_dir = target_dir.as_ref();
    let mut archive = ZipArchive::new(archive)?;
    let mut dir_modes = vec![];

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let out = utils::enclosed_path(target_dir, file.name())?;

        if file.is_dir() {
            trace!("Creating dir {}", out.display());
            fs::create_dir_all(&out).map_err(extract_error(&out))?;
            if let Some(mode) = file.unix_mode() {
                dir_modes.push((out, mode));
            }
            continue;
        } else if let Some(p) = out.parent() {
            fs::create_dir_all(p).map_err(extract_error(p))?;
        }

        debug!("Extracting file to {}", out.display());
        let mut outfile = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&out)
            .map_err(extract_error(&out))?;
        io::copy(&mut file, &mut outfile).map_err(extract_error(&out))?;

        if let Some(mode) = file.unix_mode() {
            set_mode(&out, mode).map_err(extract_error(&out))?;
        }
    }

    // children before parents, in case a parent ends up read-only
    dir_modes.sort_by_key(|(p, _)| Reverse(p.components().count()));
    for (dir, mode) in dir_modes {
        set_mode(&dir, mode).map_err(extract_error(&dir))?;
    }

    Ok(archive.len())
}

fn extract_error(path: &Path) -> impl FnOnce(io::Error) -> SeamlessError + '_ {
    move |source| SeamlessError::Extract {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    trace!("Setting mode {:o} on {}", mode & 0o7777, path.display());
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Download an archive and extract it into `target_dir`
/// # Params
/// * transport - `Transport` to make the request with
/// * url - URL of the zip archive
/// * target_dir - directory to extract into
/// * scratch_dir - where to keep the archive while extracting. Defaults to the system temp dir
/// * cb - progress callback, see `download_file_with_progress`
///
/// The downloaded archive is deleted before returning, whether or not the install succeeded.
pub fn install_from_url<F>(
    transport: &impl Transport,
    url: &str,
    target_dir: impl AsRef<Path>,
    scratch_dir: Option<&Path>,
    cb: F,
) -> Result<usize, SeamlessError>
where
    F: FnMut(u64, u64, u64),
{
    let mut builder = tempfile::Builder::new();
    builder.prefix("release-").suffix(".zip");
    let mut archive = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(SeamlessError::TempFile)?;
    debug!("Saving archive to {}", archive.path().display());

    download_file_with_progress(transport, url, archive.as_file_mut(), cb).map_err(|e| match e {
        SeamlessError::Io(source) => SeamlessError::TempFile(source),
        e => e,
    })?;
    archive
        .as_file_mut()
        .seek(SeekFrom::Start(0))
        .map_err(SeamlessError::TempFile)?;

    let entries = extract(archive.as_file(), target_dir.as_ref())?;
    debug!(
        "Extracted {} entries to {}",
        entries,
        target_dir.as_ref().display()
    );

    Ok(entries)
}
