//! Filesystem primitives.
//!
//! Thin wrappers that turn the awkward corners of `std::fs` (missing files,
//! corrupt JSON, permissions) into plain `io::Result` values.

use std::io::{self, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

/// Read a file to a string, mapping a missing file to `None`.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write `contents` readable only by the owner (0600 on Unix).
pub fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        // mode() only applies on creation
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let mut file = std::fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
    }

    Ok(())
}

/// Whether `path` itself is a symbolic link (lstat, never follows).
///
/// A missing path is not a symlink.
pub fn is_symlink(path: &Path) -> io::Result<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.file_type().is_symlink()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read a JSON object from disk.
///
/// A missing file, unparsable content or a non-object document all yield an
/// empty map; only real I/O failures are returned.
pub fn read_json_object(path: &Path) -> io::Result<Map<String, Value>> {
    let Some(contents) = read_optional(path)? else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            warn!(path = %path.display(), "state file is not a JSON object, resetting");
            Ok(Map::new())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "state file is corrupt, resetting");
            Ok(Map::new())
        }
    }
}

/// Write a JSON value, creating parent directories as needed.
pub fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');

    // readers see the old or the new document, never a torn one
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
