//! Format-specific file I/O.
//!
//! Text, binary, YAML and JSON helpers used by every component. Strict readers
//! (`read_*_file`) propagate errors with the file path attached; lenient readers
//! (`read_*_lenient`) return an empty mapping and log a warning, which is what the
//! catalog walk wants for a single malformed item.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a UTF-8 text file.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads a text file and normalizes `\r\n` and lone `\r` line endings to `\n`.
pub fn read_text_file_normalized(path: &Path) -> Result<String> {
    Ok(normalize_line_endings(&read_text_file(path)?))
}

/// Reads a file as raw bytes.
pub fn read_bytes_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes a UTF-8 text file atomically.
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    super::atomic::safe_write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Converts Windows and classic Mac line endings to `\n`.
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
    if content.contains('\r') {
        content.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        content.to_string()
    }
}

pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from file: {}", path.display()))
}

pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };

    write_text_file(path, &json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

pub fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from file: {}", path.display()))
}

/// Serializes `data` as YAML and writes it atomically.
///
/// Mappings keep their insertion order and strings containing newlines are emitted
/// as block scalars, so inlined code is never re-wrapped.
pub fn write_yaml_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let yaml = serde_yaml::to_string(data)
        .with_context(|| format!("Failed to serialize data to YAML for: {}", path.display()))?;

    write_text_file(path, &yaml)
        .with_context(|| format!("Failed to write YAML file: {}", path.display()))
}

/// Reads a YAML document, returning an empty mapping when it cannot be read or parsed.
pub fn read_yaml_lenient(path: &Path) -> serde_yaml::Value {
    match read_yaml_file::<serde_yaml::Value>(path) {
        Ok(serde_yaml::Value::Null) => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not read {}: {:#}", path.display(), e);
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        }
    }
}

/// Reads a JSON document, returning an empty object when it cannot be read or parsed.
pub fn read_json_lenient(path: &Path) -> serde_json::Value {
    match read_json_file::<serde_json::Value>(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not read {}: {:#}", path.display(), e);
            serde_json::Value::Object(serde_json::Map::new())
        }
    }
}
