use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::formats::raw_tile;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(tile_stack::descriptor::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed descriptor: {0}")]
    #[diagnostic(
        code(tile_stack::descriptor::json),
        help("The descriptor must be a JSON document with version, shape, default_tile_shape and tiles")
    )]
    Json(#[from] serde_json::Error),

    #[error("Unsupported descriptor version {found}, expected {expected}")]
    #[diagnostic(code(tile_stack::descriptor::version))]
    UnsupportedVersion {
        found: String,
        expected: &'static str,
    },

    #[error("Unsupported tile format {0:?}")]
    #[diagnostic(
        code(tile_stack::descriptor::tile_format),
        help("Only \"raw_f32_le\" tiles can be read")
    )]
    UnsupportedFormat(String),

    #[error("Bad tile {}: {source}", path.display())]
    #[diagnostic(code(tile_stack::descriptor::tile))]
    Tile {
        path: PathBuf,
        #[source]
        source: raw_tile::Error,
    },

    #[error(
        "Tile path {} is neither absolute nor below the descriptor directory {}",
        path.display(),
        directory.display()
    )]
    #[diagnostic(
        code(tile_stack::descriptor::tile_outside),
        help("Return a path next to the descriptor or an absolute path from the tile namer")
    )]
    TileOutsideDescriptor { path: PathBuf, directory: PathBuf },

    #[error("Path {} is not valid UTF-8", .0.display())]
    #[diagnostic(code(tile_stack::descriptor::non_utf8_path))]
    NonUtf8Path(PathBuf),
}

impl Error {
    pub(super) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
