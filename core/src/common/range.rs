use std::ops::{Div, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeIncl<N> {
    pub min: N,
    pub max: N,
}

impl<N> RangeIncl<N> {
    pub fn new(min: N, max: N) -> Self {
        Self { min, max }
    }
}

impl<N: Default> Default for RangeIncl<N> {
    fn default() -> Self {
        Self {
            min: N::default(),
            max: N::default(),
        }
    }
}

impl<N: PartialOrd + Copy> RangeIncl<N> {
    pub fn point(value: N) -> Self {
        Self::new(value, value)
    }

    pub fn expand(&self, new: N) -> Self {
        Self::new(
            if self.min < new { self.min } else { new },
            if self.max > new { self.max } else { new },
        )
    }
}

impl<N: Sub<Output = N> + Div<Output = N> + Copy> RangeIncl<N> {
    pub fn width(&self) -> N {
        self.max - self.min
    }

    /// Position of `value` relative to the range, `0` at `min` and `1` at `max`.
    pub fn map(&self, value: N) -> N {
        (value - self.min) / self.width()
    }
}
