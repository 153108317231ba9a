//! Sampled spectral curves.
//!
//! The [`SampledSpectrum`] struct holds one curve given as (wavelength, value)
//! pairs at arbitrary, possibly non-uniform, wavelengths. It represents each of
//! the three color matching functions as well as illuminants. Construction
//! validates the samples, so that resampling onto a [`WavelengthGrid`] never
//! has to.
//!
//! A submodule provides [`std_observer::x()`], [`std_observer::y()`], and
//! [`std_observer::z()`] as analytical approximations for the 1931 2º observer.
//! As such, all three functions accept floating point arguments for
//! wavelengths.

use crate::core::{Extrapolation, InterpolationPlan};
use crate::error::SpectralError;
use crate::grid::WavelengthGrid;
use crate::Float;

/// Check that wavelengths are strictly ascending.
pub(crate) fn check_ascending(
    what: &'static str,
    wavelengths: &[Float],
) -> Result<(), SpectralError> {
    for (index, pair) in wavelengths.windows(2).enumerate() {
        // Written so that not-a-number fails, too.
        if !(pair[0] < pair[1]) {
            return Err(SpectralError::UnorderedWavelengths {
                what,
                index: index + 1,
            });
        }
    }

    Ok(())
}

/// A spectral curve sampled at strictly ascending wavelengths.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSpectrum {
    wavelengths: Vec<Float>,
    values: Vec<Float>,
}

impl SampledSpectrum {
    /// Create a new sampled spectrum.
    ///
    /// This function fails if the two vectors differ in length, are empty, or
    /// if the wavelengths are not strictly ascending.
    pub fn new(wavelengths: Vec<Float>, values: Vec<Float>) -> Result<Self, SpectralError> {
        if wavelengths.len() != values.len() {
            return Err(SpectralError::ShapeMismatch {
                what: "spectrum values",
                expected: wavelengths.len(),
                actual: values.len(),
            });
        }
        if wavelengths.is_empty() {
            return Err(SpectralError::InsufficientData {
                what: "spectrum",
                count: 0,
            });
        }
        check_ascending("spectrum wavelengths", &wavelengths)?;

        Ok(Self {
            wavelengths,
            values,
        })
    }

    /// Create a new sampled spectrum from (wavelength, value) pairs.
    pub fn from_pairs(pairs: &[(Float, Float)]) -> Result<Self, SpectralError> {
        let (wavelengths, values) = pairs.iter().copied().unzip();
        Self::new(wavelengths, values)
    }

    /// Get the wavelengths.
    #[inline]
    pub fn wavelengths(&self) -> &[Float] {
        &self.wavelengths
    }

    /// Get the values.
    #[inline]
    pub fn values(&self) -> &[Float] {
        &self.values
    }

    /// Get the number of samples.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Get the smallest wavelength.
    #[inline]
    pub fn start(&self) -> Float {
        self.wavelengths[0]
    }

    /// Get the largest wavelength.
    #[inline]
    pub fn end(&self) -> Float {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    /// Get an iterator over the (wavelength, value) pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Float, Float)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Resample this spectrum onto the grid.
    ///
    /// Each grid wavelength within this spectrum's domain receives the linearly
    /// interpolated value. Grid wavelengths outside the domain are treated
    /// according to the extrapolation policy.
    pub fn resample(&self, grid: &WavelengthGrid, extrapolation: Extrapolation) -> Vec<Float> {
        InterpolationPlan::new(&self.wavelengths, &grid.to_vec(), extrapolation).apply(&self.values)
    }
}

// --------------------------------------------------------------------------------------------------------------------

pub mod std_observer {
    //! Free-standing functions related to the CIE standard observer.

    #[cfg(feature = "pyffi")]
    use pyo3::prelude::pyfunction;

    use crate::Float;

    /// Compute an [analytical
    /// approximation](https://research.nvidia.com/publication/2013-07_simple-analytic-approximations-cie-xyz-color-matching-functions)
    /// for the 1931 2º standard observer's x.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn x(wavelength: Float) -> Float {
        let p1 = (wavelength - 442.0) * (if wavelength < 442.0 { 0.0624 } else { 0.0374 });
        let p2 = (wavelength - 599.8) * (if wavelength < 599.8 { 0.0264 } else { 0.0323 });
        let p3 = (wavelength - 501.1) * (if wavelength < 501.1 { 0.0490 } else { 0.0382 });

        0.362 * (-0.5 * p1 * p1).exp() + 1.056 * (-0.5 * p2 * p2).exp()
            - 0.065 * (-0.5 * p3 * p3).exp()
    }

    /// Compute an [analytical
    /// approximation](https://research.nvidia.com/publication/2013-07_simple-analytic-approximations-cie-xyz-color-matching-functions)
    /// for the 1931 2º standard observer's y.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn y(wavelength: Float) -> Float {
        let p1 = (wavelength - 568.8) * (if wavelength < 568.8 { 0.0213 } else { 0.0247 });
        let p2 = (wavelength - 530.9) * (if wavelength < 530.9 { 0.0613 } else { 0.0322 });
        0.821 * (-0.5 * p1 * p1).exp() + 0.286 * (-0.5 * p2 * p2).exp()
    }

    /// Compute an [analytical
    /// approximation](https://research.nvidia.com/publication/2013-07_simple-analytic-approximations-cie-xyz-color-matching-functions)
    /// for the 1931 2º standard observer's z.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn z(wavelength: Float) -> Float {
        let p1 = (wavelength - 437.0) * (if wavelength < 437.0 { 0.0845 } else { 0.0278 });
        let p2 = (wavelength - 459.0) * (if wavelength < 459.0 { 0.0385 } else { 0.0725 });
        1.217 * (-0.5 * p1 * p1).exp() + 0.681 * (-0.5 * p2 * p2).exp()
    }

    /// The first wavelength covered by the CIE's tabulated standard observers.
    pub const START: usize = 360;

    /// The last wavelength covered by the CIE's tabulated standard observers.
    pub const END: usize = 830;
}

// --------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::{std_observer, SampledSpectrum};
    use crate::core::Extrapolation;
    use crate::error::SpectralError;
    use crate::grid::{GridEnd, WavelengthGrid};

    #[test]
    fn test_validation() {
        assert!(matches!(
            SampledSpectrum::new(vec![400.0, 500.0], vec![1.0]),
            Err(SpectralError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            SampledSpectrum::new(vec![], vec![]),
            Err(SpectralError::InsufficientData { count: 0, .. })
        ));
        assert!(matches!(
            SampledSpectrum::new(vec![400.0, 500.0, 500.0], vec![1.0, 2.0, 3.0]),
            Err(SpectralError::UnorderedWavelengths { index: 2, .. })
        ));
        assert!(matches!(
            SampledSpectrum::from_pairs(&[(500.0, 1.0), (400.0, 2.0)]),
            Err(SpectralError::UnorderedWavelengths { index: 1, .. })
        ));
    }

    #[test]
    fn test_resample() {
        let spectrum =
            SampledSpectrum::from_pairs(&[(400.0, 0.0), (550.0, 1.0), (700.0, 0.0)]).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_eq!((spectrum.start(), spectrum.end()), (400.0, 700.0));

        let grid = WavelengthGrid::new(350.0, 800.0, 50.0, GridEnd::Exclusive).unwrap();
        let values = spectrum.resample(&grid, Extrapolation::Zero);
        for (wavelength, value) in grid.iter().zip(values.iter()) {
            if !(400.0..700.0).contains(&wavelength) {
                assert_eq!(*value, 0.0);
            }
        }
        assert_eq!(values[4], 1.0);
    }

    #[test]
    fn test_std_observer() {
        // The approximation peaks close to the tabulated maxima.
        assert!((std_observer::y(555.0) - 1.0).abs() < 0.01);
        assert!(std_observer::x(600.0) > std_observer::x(500.0));
        assert!(std_observer::z(450.0) > 1.7);
        assert!(std_observer::y(std_observer::END as crate::Float) < 1e-3);
    }
}
