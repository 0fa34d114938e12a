//! Environment file store.
//!
//! Reads and writes `.env`-style files inside one working directory. Every
//! path is checked before use: it must stay inside the directory and must not
//! be a symbolic link.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::core::constants::{env_file_name, ENV_FILE, MASTER};
use crate::core::fs;
use crate::core::types::EnvMap;
use crate::error::{EnvironmentError, FileError, Result};

/// The variables a command works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFiles {
    /// Contents of the base `.env` (provider configuration lives here).
    pub env_map: EnvMap,
    /// Contents of the selected environment's file. Same as `env_map` for master.
    pub environment_env_map: EnvMap,
    /// File that holds `environment_env_map`.
    pub env_file_name: String,
}

/// `.env` file access rooted at a working directory.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    root: PathBuf,
}

impl EnvFileStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the process working directory.
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Working directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and parse `file_name`.
    ///
    /// # Errors
    ///
    /// `PathEscape` / `SymlinkRejected` for unsafe paths, `NotFound` if the
    /// file is missing, `ParseFailed` for malformed content.
    pub fn read(&self, file_name: &str) -> Result<EnvMap> {
        let path = self.resolve(file_name)?;
        debug!(path = %path.display(), "reading env file");

        let contents = match fs::read_optional(&path) {
            Ok(Some(contents)) => contents,
            Ok(None) => return Err(FileError::NotFound { path }.into()),
            Err(source) => return Err(FileError::ReadFailed { path, source }.into()),
        };

        let map = parse(&contents).map_err(|reason| FileError::ParseFailed {
            path: path.clone(),
            reason,
        })?;
        debug!(entries = map.len(), "env file parsed");
        Ok(map)
    }

    /// Serialize `map` to `file_name` with owner-only permissions.
    pub fn write(&self, map: &EnvMap, file_name: &str) -> Result<()> {
        let path = self.resolve(file_name)?;
        debug!(path = %path.display(), entries = map.len(), "writing env file");

        fs::write_private(&path, &serialize(map))
            .map_err(|source| FileError::WriteFailed { path, source })?;
        Ok(())
    }

    /// Create an empty environment file.
    ///
    /// # Errors
    ///
    /// `EnvironmentError::AlreadyExists` if the file is already there.
    pub fn create(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.resolve(file_name)?;
        if std::fs::symlink_metadata(&path).is_ok() {
            return Err(EnvironmentError::AlreadyExists(file_name.to_string()).into());
        }
        fs::write_private(&path, "")
            .map_err(|source| FileError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Load the base file and, for a named environment, its overlay.
    ///
    /// The base file is read first; the first failing read is returned as is.
    pub fn read_env_files(&self, environment: Option<&str>) -> Result<EnvFiles> {
        let env_map = self.read(ENV_FILE)?;

        match environment {
            Some(env) if env != MASTER => {
                let file_name = env_file_name(env);
                let environment_env_map = self.read(&file_name)?;
                Ok(EnvFiles {
                    env_map,
                    environment_env_map,
                    env_file_name: file_name,
                })
            }
            _ => Ok(EnvFiles {
                environment_env_map: env_map.clone(),
                env_map,
                env_file_name: ENV_FILE.to_string(),
            }),
        }
    }

    /// Resolve `file_name` to a checked absolute path.
    fn resolve(&self, file_name: &str) -> std::result::Result<PathBuf, FileError> {
        let root = std::fs::canonicalize(&self.root).map_err(|source| FileError::ReadFailed {
            path: self.root.clone(),
            source,
        })?;
        let path = normalize(&root.join(file_name));

        if !path.starts_with(&root) {
            return Err(FileError::PathEscape { path });
        }

        // a symlinked directory on the way can still lead outside
        if let Some(parent) = path.parent() {
            if let Ok(real_parent) = std::fs::canonicalize(parent) {
                if !real_parent.starts_with(&root) {
                    return Err(FileError::PathEscape { path });
                }
            }
        }

        match fs::is_symlink(&path) {
            Ok(true) => Err(FileError::SymlinkRejected { path }),
            Ok(false) => Ok(path),
            Err(source) => Err(FileError::ReadFailed { path, source }),
        }
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Parse dotenv content. Whitespace-only content is an empty map.
pub fn parse(contents: &str) -> std::result::Result<EnvMap, String> {
    let mut map = EnvMap::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);

        let (key, value) = split_assignment(line).map_err(|e| format!("line {}: {}", line_no, e))?;
        if key.is_empty() {
            return Err(format!("line {}: empty key", line_no));
        }

        let value = parse_value(value.trim()).map_err(|e| format!("line {}: {}", line_no, e))?;
        map.insert(key, value);
    }

    Ok(map)
}

/// Split `KEY=VALUE`, where the key is bare or double-quoted.
fn split_assignment(line: &str) -> std::result::Result<(String, &str), String> {
    if let Some(rest) = line.strip_prefix('"') {
        let (key, tail) = split_double_quoted(rest).ok_or("unterminated quoted key")?;
        let value = tail
            .trim_start()
            .strip_prefix('=')
            .ok_or("expected '=' after quoted key")?;
        return Ok((key, value));
    }

    let (key, value) = line.split_once('=').ok_or("expected KEY=VALUE")?;
    let key = key.trim_end();
    if key.chars().any(char::is_whitespace) {
        return Err(format!("key '{}' contains whitespace", key));
    }
    Ok((key.to_string(), value))
}

fn parse_value(raw: &str) -> std::result::Result<String, String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let (value, tail) = split_double_quoted(rest).ok_or("unterminated double quote")?;
        check_tail(tail)?;
        return Ok(value);
    }

    if let Some(rest) = raw.strip_prefix('\'') {
        let end = rest.find('\'').ok_or("unterminated single quote")?;
        check_tail(&rest[end + 1..])?;
        return Ok(rest[..end].to_string());
    }

    // unquoted: ` #` starts an inline comment
    let value = match raw.find(" #").or_else(|| raw.find("\t#")) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    Ok(value.trim_end().to_string())
}

/// Unescape up to the closing quote, returning the value and what follows.
fn split_double_quoted(input: &str) -> Option<(String, &str)> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => return Some((out, &input[i + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return None,
            },
            _ => out.push(ch),
        }
    }

    None
}

fn check_tail(tail: &str) -> std::result::Result<(), String> {
    let tail = tail.trim_start();
    if tail.is_empty() || tail.starts_with('#') {
        Ok(())
    } else {
        Err(format!("unexpected characters after closing quote: '{}'", tail))
    }
}

/// Serialize a map to dotenv text, one `KEY=value` per line.
pub fn serialize(map: &EnvMap) -> String {
    let mut output = String::new();

    for (key, value) in map {
        if is_bare_key(key) {
            output.push_str(key);
        } else {
            output.push_str(&format!("\"{}\"", escape_value(key)));
        }
        output.push('=');
        if needs_quotes(value) {
            output.push_str(&format!("\"{}\"\n", escape_value(value)));
        } else {
            output.push_str(value);
            output.push('\n');
        }
    }

    output
}

/// Keys that read back unchanged without quoting.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('#')
        && !key.starts_with('"')
        && !key.chars().any(|ch| ch.is_whitespace() || ch == '=')
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(|ch| ch.is_whitespace())
        || value.contains('#')
        || value.contains('=')
        || value.contains('"')
        || value.contains('\'')
        || value.contains('\\')
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
