//! Uniform wavelength grids.
//!
//! A [`WavelengthGrid`] is the shared axis onto which color matching
//! functions, illuminants, and spectral images are resampled before
//! integration. Its samples are `start + k * step` for `k = 0, 1, ...`.
//! Whether the end wavelength itself is part of the grid is an explicit
//! choice, captured by [`GridEnd`]. The default excludes it, which keeps the
//! step fixed at the expense of possibly dropping the very last sample.

use crate::error::SpectralError;
use crate::Float;

/// The treatment of a grid's end wavelength.
#[cfg_attr(feature = "pyffi", pyo3::pyclass(eq, eq_int, frozen, module = "spectraxyz"))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridEnd {
    /// The grid covers the half-open range `start..end`.
    #[default]
    Exclusive,
    /// The grid covers the closed range `start..=end`, with the end
    /// wavelength included only if it falls onto the grid.
    Inclusive,
}

/// A uniformly spaced, strictly ascending sequence of wavelengths.
#[derive(Clone, Debug, PartialEq)]
pub struct WavelengthGrid {
    start: Float,
    step: Float,
    len: usize,
}

impl WavelengthGrid {
    /// The maximum number of wavelengths in a grid.
    pub const MAX_LEN: usize = 1 << 20;

    /// Create a new wavelength grid.
    ///
    /// With [`GridEnd::Exclusive`], the grid has `ceil((end - start) / step)`
    /// entries, all of which are smaller than `end`. With
    /// [`GridEnd::Inclusive`], it has `floor((end - start) / step) + 1`
    /// entries, all of which are at most `end`.
    ///
    /// Those bounds take precedence over the length formulas. When rounding
    /// places the last computed wavelength on or past the end, that wavelength
    /// is dropped. For example, a grid from 1.0 to 1.3 with step 0.1 has three
    /// entries, since `1.0 + 3.0 * 0.1` evaluates to slightly more than 1.3.
    ///
    /// This function fails with [`SpectralError::InvalidConfiguration`] if
    /// the step is not a positive, finite number or if it results in more
    /// than [`WavelengthGrid::MAX_LEN`] entries. It fails with
    /// [`SpectralError::InsufficientData`] if the end does not exceed the
    /// start.
    pub fn new(
        start: Float,
        end: Float,
        step: Float,
        grid_end: GridEnd,
    ) -> Result<Self, SpectralError> {
        if !(step > 0.0 && step.is_finite()) {
            return Err(SpectralError::InvalidConfiguration(step));
        }
        if !(start < end) || !start.is_finite() || !end.is_finite() {
            return Err(SpectralError::InsufficientData {
                what: "wavelength range",
                count: 1,
            });
        }

        let span = (end - start) / step;
        let count = match grid_end {
            GridEnd::Exclusive => span.ceil().max(1.0),
            GridEnd::Inclusive => span.floor() + 1.0,
        };
        // Written so that not-a-number and infinity fail, too.
        if !(count <= Self::MAX_LEN as Float) {
            return Err(SpectralError::InvalidConfiguration(step));
        }
        let mut len = count as usize;

        // Rounding in the quotient may admit a sample just past the end.
        while len > 1 && Self::sample(start, step, len - 1) > end {
            len -= 1;
        }
        if grid_end == GridEnd::Exclusive {
            while len > 1 && Self::sample(start, step, len - 1) >= end {
                len -= 1;
            }
        }

        Ok(Self { start, step, len })
    }

    #[inline]
    fn sample(start: Float, step: Float, index: usize) -> Float {
        start + index as Float * step
    }

    /// Get the first wavelength.
    #[inline]
    pub fn start(&self) -> Float {
        self.start
    }

    /// Get the last wavelength.
    #[inline]
    pub fn last(&self) -> Float {
        Self::sample(self.start, self.step, self.len - 1)
    }

    /// Get the step between consecutive wavelengths.
    #[inline]
    pub fn step(&self) -> Float {
        self.step
    }

    /// Get the integration step.
    ///
    /// Since the grid is uniform, this is the same as [`WavelengthGrid::step`],
    /// i.e., the difference between the second and first wavelengths.
    #[inline]
    pub fn delta(&self) -> Float {
        self.step
    }

    /// Get the number of wavelengths.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Get the wavelength at the given index.
    #[inline]
    pub fn at(&self, index: usize) -> Option<Float> {
        if index < self.len {
            Some(Self::sample(self.start, self.step, index))
        } else {
            None
        }
    }

    /// Get an iterator over this grid's wavelengths.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Float> + '_ {
        (0..self.len).map(|index| Self::sample(self.start, self.step, index))
    }

    /// Collect this grid's wavelengths into a vector.
    pub fn to_vec(&self) -> Vec<Float> {
        self.iter().collect()
    }
}
