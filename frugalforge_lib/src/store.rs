//! Reading and writing the datapack JSON files.
//!
//! Every write goes to a temporary file in the destination directory and is
//! renamed into place, so a file on disk is always either the previous
//! document or the complete new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::dataset::{Item, ItemTable, ProfessionPack, Producer, SMELT_KIND};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: {message}")]
    Shape { path: PathBuf, message: String },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_json(path: &Path) -> Result<Value, StoreError> {
    let text = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty JSON with two-space indentation, non-ASCII written verbatim and a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Replaces `path` with `contents` via a temporary file and rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(io_err(&parent))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(io_err(&parent))?;
    tmp.write_all(contents.as_bytes()).map_err(io_err(path))?;
    tmp.as_file().sync_all().map_err(io_err(path))?;
    tmp.persist(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let text = to_pretty_json(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &text)
}

/// Loads the item table. Only entries without a positive `itemId` or a
/// non-empty `name` are dropped; other odd fields are carried through.
pub fn load_items(path: &Path) -> Result<ItemTable, StoreError> {
    let Value::Array(entries) = read_json(path)? else {
        return Err(StoreError::Shape {
            path: path.to_path_buf(),
            message: "must be a JSON list".into(),
        });
    };

    let total = entries.len();
    let table: ItemTable = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<Item>(entry).ok())
        .filter(|item| item.item_id > 0 && !item.name.is_empty())
        .collect();
    if table.len() < total {
        tracing::warn!(
            "{}: ignored {} unusable or duplicate item entries",
            path.display(),
            total - table.len()
        );
    }
    Ok(table)
}

/// Like [`load_items`], but a missing file is an empty table.
pub fn load_items_or_default(path: &Path) -> Result<ItemTable, StoreError> {
    if !path.exists() {
        return Ok(ItemTable::new());
    }
    load_items(path)
}

pub fn load_pack(path: &Path) -> Result<ProfessionPack, StoreError> {
    serde_json::from_value(read_json(path)?).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every `*.json` pack in `dir`, ordered by file name.
pub fn load_packs(dir: &Path) -> Result<Vec<ProfessionPack>, StoreError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    paths.iter().map(|p| load_pack(p)).collect()
}

/// Loads the smelt producers from a `{ "producers": [...] }` document.
/// Producers of any other kind are ignored without being decoded.
pub fn load_smelts(path: &Path) -> Result<Vec<Producer>, StoreError> {
    let doc = read_json(path)?;
    let producers = match doc.get("producers") {
        Some(Value::Array(list)) => list.clone(),
        None => Vec::new(),
        Some(_) => {
            return Err(StoreError::Shape {
                path: path.to_path_buf(),
                message: "\"producers\" must be a list".into(),
            })
        }
    };

    producers
        .into_iter()
        .filter(|p| p.get("kind").and_then(Value::as_str) == Some(SMELT_KIND))
        .map(|p| {
            serde_json::from_value(p).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}
