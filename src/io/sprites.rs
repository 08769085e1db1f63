//! Sprite metadata loading.
//!
//! The metadata file is either `{"sprites": [...]}` or a bare array of
//! sprite records.

use crate::core::Sprite;
use crate::io::LoadError;
use log::info;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum SpriteFile {
    Wrapped { sprites: Vec<Sprite> },
    Bare(Vec<Sprite>),
}

/// Parse sprite metadata from a JSON string.
pub fn parse_sprites(json: &str) -> Result<Vec<Sprite>, serde_json::Error> {
    let file: SpriteFile = serde_json::from_str(json)?;
    Ok(match file {
        SpriteFile::Wrapped { sprites } => sprites,
        SpriteFile::Bare(sprites) => sprites,
    })
}

/// Load sprite metadata from a JSON file.
///
/// An empty sprite list is an error: nothing could be reconstructed from it.
pub fn load_sprites(path: &Path) -> Result<Vec<Sprite>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sprites = parse_sprites(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if sprites.is_empty() {
        return Err(LoadError::NoSprites(path.to_path_buf()));
    }

    info!("Loaded {} sprites from {}", sprites.len(), path.display());
    Ok(sprites)
}
