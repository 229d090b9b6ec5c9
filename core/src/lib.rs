// #![warn(clippy::pedantic)]
// #![warn(clippy::nursery)]
// #![warn(clippy::cargo)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::unimplemented)]
#![warn(clippy::dbg_macro)]
// #![warn(clippy::unwrap_used)]
// #![warn(clippy::expect_used)]

//! Dense, in-memory views over sparse collections of labeled image tiles.
//!
//! A stack is a set of 2D or 3D tiles indexed by acquisition round and color
//! channel. [`stack::ImageStack`] assembles them into a single
//! `(round, channel, ..tile)` array, supports max projections and writes the
//! tiles back out through [`formats::descriptor`].

pub mod collection;
pub mod common;
pub mod file;
pub mod formats;
pub mod geom;
pub mod stack;

pub use collection::{Dimension, Tile, TileCollection, TileIndices, TileSet};
pub use stack::{ImageStack, ProjectionAxis};
