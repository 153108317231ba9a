use crate::Float;

/// An extension trait for floating point numbers.
///
/// For now, this trait exists solely to pre-compute the rounding factor for
/// approximate equality of tristimulus values, which depends on the floating
/// point representation.
pub(crate) trait FloatExt {
    /// The factor determining rounding precision.
    ///
    /// When limiting a floating point number's precision, the number is
    /// multiplied by some factor, rounded, and divided by the same factor
    /// again. Typically, that factor is a power of ten, which directly
    /// translates into significant digits after the decimal.
    const ROUNDING_FACTOR: Self;
}

impl FloatExt for f64 {
    const ROUNDING_FACTOR: f64 = 1e9;
}

impl FloatExt for f32 {
    const ROUNDING_FACTOR: f32 = 1e3;
}

// ----------------------------------------------------------------------------------------------------------

/// A floating point accumulator.
///
/// Unlike plain summation with the `+` operator, this struct minimizes the
/// cumulative error by using [Kahan's algorithm with Neumaier's
/// improvements](https://en.wikipedia.org/wiki/Kahan_summation_algorithm).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Accumulator {
    sum: Float,
    compensation: Float,
}

impl Accumulator {
    /// Create a new accumulator with zero total.
    #[inline]
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// Get the compensated total.
    #[inline]
    pub fn total(&self) -> Float {
        self.sum + self.compensation
    }
}

impl std::ops::Add<Float> for Accumulator {
    type Output = Accumulator;

    /// Accumulate the given number.
    ///
    /// This method moves the accumulator into the method upon invocation and
    /// out of the method on completion, so that it remains available for
    /// continued use. See `AddAssign` for the mutably borrowed version.
    fn add(self, rhs: Float) -> Self::Output {
        let mut lhs = self;
        lhs += rhs;
        lhs
    }
}

impl std::ops::AddAssign<Float> for Accumulator {
    fn add_assign(&mut self, rhs: Float) {
        let t = self.sum + rhs;
        if rhs.abs() < self.sum.abs() {
            self.compensation += (self.sum - t) + rhs;
        } else {
            self.compensation += (rhs - t) + self.sum;
        }
        self.sum = t;
    }
}

/// Three accumulators, one per tristimulus component.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ThreeAccumulator([Accumulator; 3]);

impl ThreeAccumulator {
    #[inline]
    pub const fn new() -> Self {
        Self([Accumulator::new(), Accumulator::new(), Accumulator::new()])
    }

    #[inline]
    pub fn total(&self) -> [Float; 3] {
        [self.0[0].total(), self.0[1].total(), self.0[2].total()]
    }
}

impl std::ops::AddAssign<[Float; 3]> for ThreeAccumulator {
    fn add_assign(&mut self, rhs: [Float; 3]) {
        self.0[0] += rhs[0];
        self.0[1] += rhs[1];
        self.0[2] += rhs[2];
    }
}

/// Clamp a sample to be non-negative.
///
/// Negative numbers become zero. Not-a-number passes through unchanged, since
/// a comparison with not-a-number is always false.
#[inline]
pub(crate) fn clamp_non_negative(value: Float) -> Float {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::{clamp_non_negative, Accumulator, ThreeAccumulator};
    use crate::Float;

    #[test]
    fn test_accumulator() {
        let mut accum = Accumulator::default();
        accum += 1.0;
        accum += 10e100;
        accum += 1.0;
        accum += -10e100;
        assert_eq!(accum.total(), 2.0);
        assert_eq!(1.0 + 10e100 + 1.0 - 10e100, 0.0);

        let accum = Accumulator::new() + 0.5 + 0.25;
        assert_eq!(accum.total(), 0.75);
    }

    #[test]
    fn test_three_accumulator() {
        let mut accum = ThreeAccumulator::new();
        accum += [1.0, 2.0, 3.0];
        accum += [0.5, -2.0, 1.0];
        assert_eq!(accum.total(), [1.5, 0.0, 4.0]);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_non_negative(-3.0), 0.0);
        assert_eq!(clamp_non_negative(0.0), 0.0);
        assert_eq!(clamp_non_negative(2.5), 2.5);
        assert!(clamp_non_negative(Float::NAN).is_nan());
    }
}
