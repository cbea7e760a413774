use num_traits::PrimInt;

/// Index struct for [`ndarray::Array2`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Index {
    pub y: i32,
    pub x: i32,
}

impl Index {
    pub fn new<T: PrimInt>(x: T, y: T) -> Self {
        Index {
            x: x.to_i32().unwrap(),
            y: y.to_i32().unwrap(),
        }
    }

    pub fn add<T: PrimInt>(self, x: T, y: T) -> Self {
        Index {
            x: self.x + x.to_i32().unwrap(),
            y: self.y + y.to_i32().unwrap(),
        }
    }

    /// Chebyshev distance to another cell. One 8-connected step covers 1.
    pub fn step_distance(self, other: Index) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

unsafe impl ndarray::NdIndex<ndarray::Ix2> for Index {
    fn index_checked(&self, dim: &ndarray::Ix2, strides: &ndarray::Ix2) -> Option<isize> {
        if self.x.is_negative() || self.y.is_negative() {
            None
        } else {
            (self.y as usize, self.x as usize).index_checked(dim, strides)
        }
    }

    fn index_unchecked(&self, strides: &ndarray::Ix2) -> isize {
        (self.y as usize, self.x as usize).index_unchecked(strides)
    }
}
