use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ndarray::{s, Array, ArrayD, Axis, Ix2, IxDyn};

use super::{Error, ImageStack, ProjectionAxis};
use crate::{
    collection::{Dimension, Tile, TileCollection, TileIndices, TileSet},
    formats::descriptor::Document,
    geom::Coordinates,
};

/// Deterministic, slot-dependent payload so tiles are distinguishable.
fn payload(shape: &[usize], round: usize, channel: usize) -> ArrayD<f32> {
    let len: usize = shape.iter().product();
    let base = (round * 10 + channel) as f32 * 1000.0;
    ArrayD::from_shape_vec(
        IxDyn(shape),
        (0..len).map(|i| base + ((i * 7919) % 101) as f32).collect(),
    )
    .unwrap()
}

fn tile(round: usize, channel: usize, shape: &[usize]) -> Tile {
    Tile::new(
        TileIndices::new(round, channel),
        Coordinates::xy(0.0, 0.0),
        payload(shape, round, channel),
    )
}

/// 2 rounds, 3 channels, 10x10 tiles with `(0, 2)` and `(1, 1)` missing.
fn sparse_set() -> TileSet {
    let shape = [10, 10];
    TileSet::new(2, 3, shape.to_vec())
        .with_tile(tile(0, 0, &shape))
        .with_tile(tile(0, 1, &shape))
        .with_tile(tile(1, 0, &shape))
        .with_tile(tile(1, 2, &shape))
}

fn full_set(num_rounds: usize, num_channels: usize, shape: &[usize]) -> TileSet {
    let mut set = TileSet::new(num_rounds, num_channels, shape.to_vec());
    for r in 0..num_rounds {
        for c in 0..num_channels {
            set.push_tile(tile(r, c, shape));
        }
    }
    set
}

#[test]
fn assembled_shape() {
    let stack = ImageStack::new(full_set(3, 2, &[4, 5])).unwrap();
    assert_eq!(stack.shape(), &[3, 2, 4, 5]);
    assert_eq!(stack.array().shape(), &[3, 2, 4, 5]);
    assert_eq!(stack.num_rounds(), 3);
    assert_eq!(stack.num_channels(), 2);
    assert_eq!(stack.tile_shape(), &[4, 5]);
    assert!(!stack.is_volumetric());

    let stack = ImageStack::new(full_set(1, 1, &[2, 4, 5])).unwrap();
    assert_eq!(stack.shape(), &[1, 1, 2, 4, 5]);
    assert!(stack.is_volumetric());
}

#[test]
fn sparse_slots_are_zero() {
    let set = sparse_set();
    let stack = ImageStack::new(set.clone()).unwrap();
    let array = stack.array();

    for t in set.tiles() {
        let slot = array.slice(s![t.indices.round, t.indices.channel, .., ..]);
        assert_eq!(slot, t.data.view().into_dimensionality::<Ix2>().unwrap());
    }
    for (r, c) in [(0, 2), (1, 1)] {
        assert!(array.slice(s![r, c, .., ..]).iter().all(|&v| v == 0.0));
    }

    assert_eq!(stack.tile_index().num_populated(), 4);
    assert!(stack.tile(0, 2).is_none());
    assert_eq!(stack.tile(1, 2).unwrap().indices, TileIndices::new(1, 2));
}

#[test]
fn declared_extent_exceeds_tiles() {
    let set = TileSet::new(4, 4, vec![2, 2]).with_tile(tile(3, 3, &[2, 2]));
    let stack = ImageStack::new(set).unwrap();
    assert_eq!(stack.shape(), &[4, 4, 2, 2]);
    assert_eq!(stack.tile_index().num_populated(), 1);
}

#[test]
fn set_array_round_trip_is_idempotent() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();
    let original = stack.array().to_owned();

    stack.set_array(original.clone()).unwrap();

    assert_eq!(stack.array(), original.view());
    for t in stack.collection().tiles() {
        assert_eq!(t.data, payload(&[10, 10], t.indices.round, t.indices.channel));
    }
}

#[test]
fn set_array_scatters_into_tiles() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();
    let data = ArrayD::from_elem(IxDyn(stack.shape()), 7.0f32);

    stack.set_array(data.clone()).unwrap();

    assert_eq!(stack.array(), data.view());
    assert_eq!(stack.collection().tiles().len(), 4);
    for t in stack.collection().tiles() {
        assert!(t.data.iter().all(|&v| v == 7.0));
    }
}

#[test]
fn set_array_does_not_create_tiles() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();
    let mut data = stack.array().to_owned();
    data.slice_mut(s![1, 1, .., ..]).fill(42.0);

    stack.set_array(data).unwrap();

    assert!(stack.tile(1, 1).is_none());
    assert_eq!(stack.collection().tiles().len(), 4);
    // The array keeps the value even though no tile receives it
    assert_eq!(stack.array()[[1, 1, 0, 0]], 42.0);

    // A fresh assembly from the collection has lost it
    let reassembled = ImageStack::new(stack.into_collection()).unwrap();
    assert_eq!(reassembled.array()[[1, 1, 0, 0]], 0.0);
}

#[test]
fn set_array_rejects_wrong_shape() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();
    let before = stack.array().to_owned();

    let err = stack
        .set_array(ArrayD::zeros(IxDyn(&[2, 3, 10, 9])))
        .unwrap_err();
    match err {
        Error::ShapeMismatch { expected, found } => {
            assert_eq!(expected, vec![2, 3, 10, 10]);
            assert_eq!(found, vec![2, 3, 10, 9]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Same element count, different layout
    assert!(matches!(
        stack.set_array(ArrayD::zeros(IxDyn(&[3, 2, 10, 10]))),
        Err(Error::ShapeMismatch { .. })
    ));

    assert_eq!(stack.array(), before.view());
}

#[test]
fn array_mut_is_synced_only_on_request() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();

    stack.array_mut().fill(1.0);
    assert_eq!(
        stack.tile(0, 0).unwrap().data,
        payload(&[10, 10], 0, 0),
        "tiles follow the array only after sync"
    );

    stack.sync_tiles();
    assert!(stack.tile(0, 0).unwrap().data.iter().all(|&v| v == 1.0));
}

#[test]
fn max_projection_round_and_channel() {
    let stack = ImageStack::new(full_set(3, 2, &[4, 5])).unwrap();
    let array = stack.array();

    let by_round = stack.max_projection("round").unwrap();
    assert_eq!(by_round.shape(), &[2, 4, 5]);
    for c in 0..2 {
        let expected = (0..3)
            .map(|r| array.slice(s![r, c, .., ..]).to_owned())
            .reduce(|a, b| ndarray::Zip::from(&a).and(&b).map_collect(|&x, &y| x.max(y)))
            .unwrap();
        assert_eq!(by_round.index_axis(Axis(0), c), expected.into_dyn().view());
    }

    let by_channel = stack.max_projection("channel").unwrap();
    assert_eq!(by_channel.shape(), &[3, 4, 5]);
    for r in 0..3 {
        let expected = (0..2)
            .map(|c| array.slice(s![r, c, .., ..]).to_owned())
            .reduce(|a, b| ndarray::Zip::from(&a).and(&b).map_collect(|&x, &y| x.max(y)))
            .unwrap();
        assert_eq!(by_channel.index_axis(Axis(0), r), expected.into_dyn().view());
    }
}

#[test]
fn max_projection_z() {
    let stack = ImageStack::new(full_set(2, 2, &[3, 4, 5])).unwrap();
    let z = stack.max_projection_along(ProjectionAxis::Z).unwrap();
    assert_eq!(z.shape(), &[2, 2, 4, 5]);

    let array = stack.array();
    for r in 0..2 {
        for c in 0..2 {
            for y in 0..4 {
                for x in 0..5 {
                    let expected = (0..3)
                        .map(|d| array[[r, c, d, y, x]])
                        .fold(f32::NEG_INFINITY, f32::max);
                    assert_eq!(z[[r, c, y, x]], expected);
                }
            }
        }
    }
}

#[test]
fn max_projection_z_needs_volumetric_tiles() {
    let stack = ImageStack::new(sparse_set()).unwrap();
    match stack.max_projection("z") {
        Err(Error::NotVolumetric { tile_shape }) => assert_eq!(tile_shape, vec![10, 10]),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn max_projection_rejects_unknown_axis() {
    let stack = ImageStack::new(sparse_set()).unwrap();
    match stack.max_projection("bogus_axis") {
        Err(Error::InvalidAxis { axis, .. }) => assert_eq!(axis, "bogus_axis"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn max_projection_includes_empty_slots() {
    // Negative payloads: the zero-filled gap wins
    let set = TileSet::new(2, 1, vec![1, 2]).with_tile(Tile::new(
        TileIndices::new(0, 0),
        Coordinates::xy(0.0, 0.0),
        Array::from_elem(IxDyn(&[1, 2]), -3.0),
    ));
    let stack = ImageStack::new(set).unwrap();
    let by_round = stack.max_projection("round").unwrap();
    assert!(by_round.iter().all(|&v| v == 0.0));
}

#[test]
fn out_of_range_tile_is_fatal() {
    let set = TileSet::new(2, 2, vec![2, 2]).with_tile(tile(2, 0, &[2, 2]));
    match ImageStack::new(set) {
        Err(Error::IndexOutOfRange {
            indices,
            num_rounds,
            num_channels,
        }) => {
            assert_eq!(indices, TileIndices::new(2, 0));
            assert_eq!((num_rounds, num_channels), (2, 2));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn malformed_tile_is_fatal() {
    let set = TileSet::new(1, 2, vec![4, 4])
        .with_tile(tile(0, 0, &[4, 4]))
        .with_tile(tile(0, 1, &[4, 3]));
    match ImageStack::new(set) {
        Err(Error::MalformedTile {
            indices,
            expected,
            found,
        }) => {
            assert_eq!(indices, TileIndices::new(0, 1));
            assert_eq!(expected, vec![4, 4]);
            assert_eq!(found, vec![4, 3]);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn tile_rank_must_be_two_or_three() {
    assert!(matches!(
        ImageStack::new(TileSet::new(1, 1, vec![16])),
        Err(Error::UnsupportedTileShape(_))
    ));
    assert!(matches!(
        ImageStack::new(TileSet::new(1, 1, vec![1, 2, 3, 4])),
        Err(Error::UnsupportedTileShape(_))
    ));
}

/// Collection that knows nothing about channels.
struct RoundsOnly {
    tiles: Vec<Tile>,
    shape: Vec<usize>,
}

impl TileCollection for RoundsOnly {
    fn dimension_size(&self, dim: Dimension) -> Option<usize> {
        match dim {
            Dimension::Round => Some(1),
            Dimension::Channel => None,
        }
    }

    fn default_tile_shape(&self) -> &[usize] {
        &self.shape
    }

    fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    fn clone_with_same_shape(&self) -> Self {
        Self {
            tiles: Vec::new(),
            shape: self.shape.clone(),
        }
    }
}

#[test]
fn missing_or_empty_dimension() {
    let collection = RoundsOnly {
        tiles: Vec::new(),
        shape: vec![2, 2],
    };
    assert!(matches!(
        ImageStack::new(collection),
        Err(Error::MissingDimension(Dimension::Channel))
    ));

    assert!(matches!(
        ImageStack::new(TileSet::new(0, 1, vec![2, 2])),
        Err(Error::EmptyDimension(Dimension::Round))
    ));
}

#[test]
fn clone_with_same_shape_is_empty_and_independent() {
    let stack = ImageStack::new(sparse_set()).unwrap();
    let mut clone = stack.clone_with_same_shape().unwrap();

    assert_eq!(clone.shape(), stack.shape());
    assert_eq!(clone.tile_index().num_populated(), stack.tile_index().num_populated());
    assert!(clone.array().iter().all(|&v| v == 0.0));

    clone.set_array(ArrayD::from_elem(IxDyn(stack.shape()), 5.0)).unwrap();
    assert_eq!(stack.tile(0, 0).unwrap().data, payload(&[10, 10], 0, 0));
}

#[test]
fn default_names_encode_grid_position_and_indices() {
    let set = TileSet::new(1, 2, vec![2, 2])
        .with_tile(Tile::new(
            TileIndices::new(0, 0),
            Coordinates::xy(0.0, 0.0),
            payload(&[2, 2], 0, 0),
        ))
        .with_tile(Tile::new(
            TileIndices::new(0, 1),
            Coordinates::xy(5.0, 5.0),
            payload(&[2, 2], 0, 1),
        ));
    let stack = ImageStack::new(set).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let toc = dir.path().join("out.json");
    stack.write(&toc, None).unwrap();

    let doc: Document = serde_json::from_str(&fs::read_to_string(&toc).unwrap()).unwrap();
    let files: Vec<_> = doc.tiles.iter().map(|t| t.file.as_str()).collect();
    assert_eq!(files, ["out-X0-Y0-R0-C0.raw", "out-X1-Y1-R0-C1.raw"]);
    assert!(dir.path().join("out-X0-Y0-R0-C0.raw").exists());
    assert!(dir.path().join("out-X1-Y1-R0-C1.raw").exists());
}

#[test]
fn write_then_reload() {
    let mut stack = ImageStack::new(sparse_set()).unwrap();
    let mut data = stack.array().to_owned();
    data.mapv_inplace(|v| v * 0.5);
    stack.set_array(data).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let toc = dir.path().join("stack.json");
    stack.write(&toc, None).unwrap();

    let reloaded = ImageStack::from_descriptor("stack.json", Some(dir.path())).unwrap();
    assert_eq!(reloaded.array(), stack.array());
    assert_eq!(reloaded.collection(), stack.collection());
}

#[test]
fn write_with_custom_namer() {
    let stack = ImageStack::new(sparse_set()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let toc = dir.path().join("stack.json");

    let mut calls = 0;
    let mut namer = |toc: &Path, tile: &Tile, ext: &str| -> io::Result<PathBuf> {
        calls += 1;
        Ok(toc.with_file_name(format!(
            "tiles/r{}c{}.{}",
            tile.indices.round, tile.indices.channel, ext
        )))
    };
    stack.write(&toc, Some(&mut namer)).unwrap();

    assert_eq!(calls, 4);
    assert!(dir.path().join("tiles/r1c2.raw").exists());

    let reloaded = ImageStack::from_descriptor(toc.to_str().unwrap(), None).unwrap();
    assert_eq!(reloaded.array(), stack.array());
}

#[test]
fn rewrite_keeps_close_coordinates_apart() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.raw"), [0u8; 4]).unwrap();
    fs::write(dir.path().join("b.raw"), [0u8; 4]).unwrap();
    fs::write(
        dir.path().join("in.json"),
        r#"{"version": "0.1.0", "shape": {"round": 1, "channel": 2},
            "default_tile_shape": [1, 1],
            "tiles": [
              {"file": "a.raw", "indices": {"round": 0, "channel": 0},
               "coordinates": {"x": 1000000.01, "y": 0}},
              {"file": "b.raw", "indices": {"round": 0, "channel": 1},
               "coordinates": {"x": 1000000.02, "y": 0}}]}"#,
    )
    .unwrap();

    let stack = ImageStack::from_descriptor("in.json", Some(dir.path())).unwrap();
    let toc = dir.path().join("out.json");
    stack.write(&toc, None).unwrap();

    let doc: Document = serde_json::from_str(&fs::read_to_string(&toc).unwrap()).unwrap();
    let files: Vec<_> = doc.tiles.iter().map(|t| t.file.as_str()).collect();
    assert_eq!(files, ["out-X0-Y0-R0-C0.raw", "out-X1-Y0-R0-C1.raw"]);
    let xs: Vec<_> = doc.tiles.iter().map(|t| t.coordinates.x.min).collect();
    assert_eq!(xs, [1000000.01, 1000000.02]);
}
