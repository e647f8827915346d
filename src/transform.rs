use crate::Result;

/// How to round when inverting a transform onto a value that doesn't land exactly on a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round to the nearest representable tick, ties away from zero.
    Round,
    /// Round down to the next representable tick.
    Floor,
    /// Round up to the next representable tick.
    Ceil,
}

/// A scale and an offset that transforms xyz coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Applies this transform to an i32, returning a float.
    ///
    /// # Examples
    ///
    /// ```
    /// # use las::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * n as f64 + self.offset
    }

    /// Applies the inverse transform, and rounds the result.
    ///
    /// # Examples
    ///
    /// ```
    /// # use las::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9));
    /// ```
    pub fn inverse(&self, n: f64) -> i32 {
        ((n - self.offset) / self.scale).round() as i32
    }

    /// Applies the inverse transform, rounding according to the given mode.
    ///
    /// This is used when adapting a bounding box so that every point inside it still rounds
    /// to a value contained within the (re-rounded) box, rather than landing just outside of it
    /// because of ordinary round-to-nearest behavior.
    ///
    /// # Examples
    ///
    /// ```
    /// # use las::Transform;
    /// use las::transform::RoundingMode;
    /// let transform = Transform { scale: 1., offset: 0. };
    /// assert_eq!(2, transform.inverse_with_rounding_mode(2.4, RoundingMode::Floor).unwrap());
    /// assert_eq!(3, transform.inverse_with_rounding_mode(2.4, RoundingMode::Ceil).unwrap());
    /// ```
    pub fn inverse_with_rounding_mode(&self, n: f64, mode: RoundingMode) -> Result<i32> {
        let raw = (n - self.offset) / self.scale;
        let rounded = match mode {
            RoundingMode::Round => raw.round(),
            RoundingMode::Floor => raw.floor(),
            RoundingMode::Ceil => raw.ceil(),
        };
        Ok(rounded as i32)
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 0.001,
            offset: 0.,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct() {
        let transform = Transform {
            scale: 2.,
            offset: 1.,
        };
        assert_eq!(3., transform.direct(1));
    }

    #[test]
    fn inverse() {
        let transform = Transform {
            scale: 2.,
            offset: 1.,
        };
        assert_eq!(1, transform.inverse(2.9));
    }

    #[test]
    fn inverse_with_rounding_mode_floor_ceil() {
        let transform = Transform {
            scale: 1.,
            offset: 0.,
        };
        assert_eq!(
            2,
            transform
                .inverse_with_rounding_mode(2.4, RoundingMode::Floor)
                .unwrap()
        );
        assert_eq!(
            3,
            transform
                .inverse_with_rounding_mode(2.4, RoundingMode::Ceil)
                .unwrap()
        );
    }
}
