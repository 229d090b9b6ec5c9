use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use derive_more::Constructor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Constructor, Default, PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

pub type Vec2U = Vec2<usize>;

/// A position along one spatial axis, either a single value or a closed interval.
///
/// Scalars are stored as the degenerate interval `[v, v]` so both forms compare,
/// hash and sort the same way. Equality and hashing go through the bit patterns
/// of the bounds, ordering through [`f64::total_cmp`], which keeps the three
/// consistent with each other. `-0.0` is stored as `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    pub min: f64,
    pub max: f64,
}

impl Coordinate {
    pub fn scalar(value: f64) -> Self {
        let value = unsigned_zero(value);
        Self {
            min: value,
            max: value,
        }
    }

    /// Builds an interval, swapping the bounds if they are given in descending order.
    pub fn interval(a: f64, b: f64) -> Self {
        let (a, b) = (unsigned_zero(a), unsigned_zero(b));
        if a.total_cmp(&b) == Ordering::Greater {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.min.to_bits() == self.max.to_bits()
    }
}

fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.min.to_bits() == other.min.to_bits() && self.max.to_bits() == other.max.to_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.min.to_bits());
        state.write_u64(self.max.to_bits());
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.min
            .total_cmp(&other.min)
            .then_with(|| self.max.total_cmp(&other.max))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((a, b): (f64, f64)) -> Self {
        Self::interval(a, b)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

/// On-disk shape of a coordinate, either `1.5` or `[1.5, 2.0]`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Scalar(f64),
    Interval([f64; 2]),
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = if self.is_scalar() {
            CoordinateRepr::Scalar(self.min)
        } else {
            CoordinateRepr::Interval([self.min, self.max])
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CoordinateRepr::deserialize(deserializer)? {
            CoordinateRepr::Scalar(v) => Coordinate::scalar(v),
            CoordinateRepr::Interval([a, b]) => Coordinate::interval(a, b),
        })
    }
}

/// Physical placement of a tile. `z` is carried along but not used for naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Coordinate,
    pub y: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Coordinate>,
}

impl Coordinates {
    pub fn xy(x: impl Into<Coordinate>, y: impl Into<Coordinate>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: None,
        }
    }

    pub fn with_z(mut self, z: impl Into<Coordinate>) -> Self {
        self.z = Some(z.into());
        self
    }
}
