//! Filesystem helpers.

use std::fs;
use std::io;
use std::path::Path;

/// Write `contents` to `path` atomically.
///
/// Creates missing parent directories, writes to a sibling temp file, then
/// renames it over the destination so readers never observe a partial file.
pub fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)?;
  }

  let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  temp_name.push(".tmp");
  let temp_path = path.with_file_name(temp_name);

  fs::write(&temp_path, contents)?;
  fs::rename(&temp_path, path)
}

/// Remove a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
  match fs::remove_file(path) {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}
