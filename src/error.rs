use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading a map, its tilesets, its images
/// or the walker configuration.
///
/// Per-frame failures (unknown gids, missing images) are never reported
/// through this type; the renderer skips those cells instead.
#[derive(Debug, Error)]
pub enum MapError {
    /// A file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A map or tileset document failed to parse.
    #[error("JSON parse error in {path}: {source}")]
    Json {
        /// Document that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The map is structurally unusable.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// A tile layer's data length does not match `width * height`.
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    InvalidLayerSize {
        /// Layer name.
        layer: String,
        /// `width * height`.
        expected: usize,
        /// Length of `data`.
        actual: usize,
    },

    /// A tile layer references a gid below every tileset's first gid.
    #[error("layer '{layer}' references gid {gid}, which no tileset owns")]
    InvalidTileGid {
        /// Layer name.
        layer: String,
        /// Offending gid, flip flags stripped.
        gid: u32,
    },

    /// A custom property declares a type this loader does not know.
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property name.
        name: String,
        /// Declared type.
        kind: String,
    },

    /// An image could not be loaded as a texture.
    #[error("failed to load texture {path}: {message}")]
    Texture {
        /// Image path.
        path: PathBuf,
        /// Backend message.
        message: String,
    },

    /// The walker configuration is not valid for its schema.
    #[error("invalid walker config {path}: {source}")]
    Config {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl MapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MapError::Json {
            path: path.into(),
            source,
        }
    }
}
