//! JSON table of contents describing a stack and where each tile's payload lives.
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "dimensions": ["round", "channel", "x", "y"],
//!   "shape": { "round": 2, "channel": 3 },
//!   "default_tile_shape": [10, 10],
//!   "default_tile_format": "raw_f32_le",
//!   "extras": {},
//!   "tiles": [
//!     {
//!       "file": "stack-X0-Y0-R0-C0.raw",
//!       "indices": { "round": 0, "channel": 0 },
//!       "coordinates": { "x": [0.0, 1.0], "y": 0.0 }
//!     }
//!   ]
//! }
//! ```
//!
//! Tile `file` paths are relative to the descriptor's directory unless absolute.

mod err;
mod reader;
mod writer;


pub use err::Error;
pub use reader::Reader;
pub use writer::{TileOpener, Writer};

use serde::{Deserialize, Serialize};

use crate::{collection::TileIndices, formats::raw_tile, geom::Coordinates};

pub const VERSION: &str = "0.1.0";

/// Descriptors with the same major version can be read.
const SUPPORTED_MAJOR: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    pub shape: Shape,
    pub default_tile_shape: Vec<usize>,
    #[serde(default = "default_tile_format")]
    pub default_tile_format: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extras: serde_json::Map<String, serde_json::Value>,
    pub tiles: Vec<TileEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub round: usize,
    pub channel: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub file: String,
    pub indices: TileIndices,
    pub coordinates: Coordinates,
    /// Falls back to the document's `default_tile_shape`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_shape: Option<Vec<usize>>,
    /// Falls back to the document's `default_tile_format`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_format: Option<String>,
}

fn default_tile_format() -> String {
    raw_tile::FORMAT_NAME.to_string()
}

impl Document {
    fn check_version(&self) -> Result<(), Error> {
        if self.version.split('.').next() == Some(SUPPORTED_MAJOR) {
            Ok(())
        } else {
            Err(Error::UnsupportedVersion {
                found: self.version.clone(),
                expected: VERSION,
            })
        }
    }

    fn tile_format<'a>(&'a self, entry: &'a TileEntry) -> &'a str {
        entry
            .tile_format
            .as_deref()
            .unwrap_or(&self.default_tile_format)
    }

    fn tile_shape<'a>(&'a self, entry: &'a TileEntry) -> &'a [usize] {
        entry
            .tile_shape
            .as_deref()
            .unwrap_or(&self.default_tile_shape)
    }
}
