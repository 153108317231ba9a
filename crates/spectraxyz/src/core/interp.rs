use crate::Float;

/// The policy for wavelengths outside a sampled curve's domain.
#[cfg_attr(feature = "pyffi", pyo3::pyclass(eq, eq_int, frozen, module = "spectraxyz"))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Extrapolation {
    /// Wavelengths outside the domain evaluate to zero.
    #[default]
    Zero,
    /// Wavelengths outside the domain evaluate to the nearest boundary value.
    Edge,
}

/// How a single target wavelength maps onto a source curve.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Sample {
    /// The target falls outside the source domain and evaluates to zero.
    Fill,
    /// The target coincides with the source sample at the index.
    Exact(usize),
    /// The target lies strictly between the source samples at the index and
    /// the index plus one, at the given fraction of the interval.
    Between(usize, Float),
}

/// A precomputed piecewise-linear interpolation from one wavelength axis onto
/// another.
///
/// Building the plan performs one binary search per target wavelength. Since
/// every pixel of a spectral image shares the same band wavelengths, one plan
/// serves all pixels and evaluating it is a straight pass over the targets.
#[derive(Clone, Debug)]
pub(crate) struct InterpolationPlan {
    source_len: usize,
    samples: Vec<Sample>,
}

impl InterpolationPlan {
    /// Create a new plan from the source to the target wavelengths.
    ///
    /// The source wavelengths must be strictly ascending. A source with a
    /// single wavelength is defined at that wavelength only.
    pub fn new(source: &[Float], targets: &[Float], extrapolation: Extrapolation) -> Self {
        let samples = targets
            .iter()
            .map(|&target| Self::locate(source, target, extrapolation))
            .collect();

        Self {
            source_len: source.len(),
            samples,
        }
    }

    fn locate(source: &[Float], target: Float, extrapolation: Extrapolation) -> Sample {
        let len = source.len();
        if len == 0 {
            return Sample::Fill;
        }

        // Index of first source wavelength strictly greater than the target.
        let upper = source.partition_point(|&wavelength| wavelength <= target);

        if upper == 0 {
            // Below the domain (or not-a-number).
            match extrapolation {
                Extrapolation::Zero => Sample::Fill,
                Extrapolation::Edge if target.is_nan() => Sample::Fill,
                Extrapolation::Edge => Sample::Exact(0),
            }
        } else if upper == len {
            if source[len - 1] == target {
                Sample::Exact(len - 1)
            } else {
                match extrapolation {
                    Extrapolation::Zero => Sample::Fill,
                    Extrapolation::Edge => Sample::Exact(len - 1),
                }
            }
        } else {
            let lower = upper - 1;
            if source[lower] == target {
                Sample::Exact(lower)
            } else {
                let fraction = (target - source[lower]) / (source[upper] - source[lower]);
                Sample::Between(lower, fraction)
            }
        }
    }

    /// Get the number of source values this plan expects.
    #[inline]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Get the number of target wavelengths.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Determine whether any target falls within the source domain.
    pub fn overlaps(&self) -> bool {
        self.samples.iter().any(|s| !matches!(s, Sample::Fill))
    }

    /// Evaluate the interpolant for the target at the given index.
    ///
    /// The values are indexed in parallel to the source wavelengths. They are
    /// passed through a closure so that callers can feed strided array lanes
    /// without copying them first.
    #[inline]
    pub fn evaluate<F>(&self, index: usize, value: F) -> Float
    where
        F: Fn(usize) -> Float,
    {
        match self.samples[index] {
            Sample::Fill => 0.0,
            Sample::Exact(i) => value(i),
            Sample::Between(i, fraction) => {
                let v0 = value(i);
                v0 + fraction * (value(i + 1) - v0)
            }
        }
    }

    /// Resample the values onto the target wavelengths.
    pub fn apply(&self, values: &[Float]) -> Vec<Float> {
        debug_assert_eq!(values.len(), self.source_len(), "values should match source");
        (0..self.len())
            .map(|index| self.evaluate(index, |i| values[i]))
            .collect()
    }
}
