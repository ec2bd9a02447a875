use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::debug;

use crate::error::SeamlessError;

/// Read the co-op password, trimming surrounding whitespace
///
/// The contents aren't validated in any other way
pub fn read_password(path: impl AsRef<Path>) -> Result<String, SeamlessError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SeamlessError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read password from {}", path.display());

    Ok(raw.trim().to_string())
}

/// Join an archive entry name onto `root`, making sure the result stays inside `root`
///
/// `.` and `..` components are resolved lexically. Absolute names, drive prefixes and
/// names that climb above `root` are rejected with `SeamlessError::UnsafePath`.
pub fn enclosed_path(root: &Path, name: &str) -> Result<PathBuf, SeamlessError> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(SeamlessError::UnsafePath(name.into()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SeamlessError::UnsafePath(name.into()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(SeamlessError::UnsafePath(name.into()));
    }

    Ok(root.join(relative))
}
