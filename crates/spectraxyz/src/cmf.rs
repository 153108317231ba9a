//! Color matching functions resampled onto a uniform wavelength grid.
//!
//! Color matching functions are usually distributed as tables with one record
//! per wavelength and the x-bar, y-bar, and z-bar values in the same record.
//! The wavelengths need not be uniformly spaced. [`ColorMatchingFunctions`]
//! loads such a table once, determines a [`WavelengthGrid`] spanning the
//! table's wavelengths with the configured step, and linearly interpolates all
//! three curves onto that grid. The result is immutable and serves any number
//! of conversions, including concurrent ones.

use std::io::{BufRead, ErrorKind};
use std::path::Path;

#[cfg(feature = "pyffi")]
use pyo3::prelude::*;

use crate::core::Extrapolation;
use crate::error::{ParseError, ParseErrorKind, SpectralError};
use crate::grid::{GridEnd, WavelengthGrid};
use crate::spectrum::{check_ascending, std_observer, SampledSpectrum};
use crate::Float;

/// The options for resampling color matching functions.
///
/// The defaults are a 2nm step, a grid that excludes the end wavelength, and
/// zero values outside a curve's domain.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CmfOptions {
    /// The step between grid wavelengths in nanometers.
    pub sampling: Float,
    /// The treatment of the grid's end wavelength.
    pub grid_end: GridEnd,
    /// The policy for wavelengths outside a curve's domain.
    pub extrapolation: Extrapolation,
}

impl Default for CmfOptions {
    fn default() -> Self {
        Self {
            sampling: Self::DEFAULT_SAMPLING,
            grid_end: GridEnd::default(),
            extrapolation: Extrapolation::default(),
        }
    }
}

impl CmfOptions {
    /// The default step between grid wavelengths in nanometers.
    pub const DEFAULT_SAMPLING: Float = 2.0;

    /// Update the sampling step.
    #[must_use = "method returns updated options and does not mutate original value"]
    pub fn with_sampling(mut self, sampling: Float) -> Self {
        self.sampling = sampling;
        self
    }

    /// Update the treatment of the grid's end wavelength.
    #[must_use = "method returns updated options and does not mutate original value"]
    pub fn with_grid_end(mut self, grid_end: GridEnd) -> Self {
        self.grid_end = grid_end;
        self
    }

    /// Update the extrapolation policy.
    #[must_use = "method returns updated options and does not mutate original value"]
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Parse one record with wavelength, x-bar, y-bar, and z-bar.
fn parse_record(line: usize, text: &str) -> Result<[Float; 4], ParseError> {
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 4 {
        return Err(ParseError::new(line, ParseErrorKind::FieldCount(fields.len())));
    }

    let mut record = [0.0; 4];
    for (index, field) in fields.iter().enumerate() {
        record[index] = field
            .trim()
            .parse::<Float>()
            .map_err(|_| ParseError::new(line, ParseErrorKind::MalformedNumber(index)))?;
    }

    Ok(record)
}

/// Color matching functions resampled onto a uniform wavelength grid.
#[cfg_attr(feature = "pyffi", pyclass(frozen, name = "CMF", module = "spectraxyz"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMatchingFunctions {
    pub(crate) options: CmfOptions,
    pub(crate) grid: WavelengthGrid,
    pub(crate) x_bar: Vec<Float>,
    pub(crate) y_bar: Vec<Float>,
    pub(crate) z_bar: Vec<Float>,
}

impl ColorMatchingFunctions {
    /// Create new color matching functions from three curves.
    ///
    /// The curves may be sampled at different wavelengths. The grid spans from
    /// the smallest to the largest wavelength across all three curves. This
    /// function fails if any curve has fewer than two samples or if the
    /// sampling step is invalid.
    pub fn from_curves(
        x: &SampledSpectrum,
        y: &SampledSpectrum,
        z: &SampledSpectrum,
        options: CmfOptions,
    ) -> Result<Self, SpectralError> {
        for (what, curve) in [("x-bar curve", x), ("y-bar curve", y), ("z-bar curve", z)] {
            if curve.len() < 2 {
                return Err(SpectralError::InsufficientData {
                    what,
                    count: curve.len(),
                });
            }
        }

        let start = x.start().min(y.start()).min(z.start());
        let end = x.end().max(y.end()).max(z.end());
        let grid = WavelengthGrid::new(start, end, options.sampling, options.grid_end)?;

        let x_bar = x.resample(&grid, options.extrapolation);
        let y_bar = y.resample(&grid, options.extrapolation);
        let z_bar = z.resample(&grid, options.extrapolation);

        tracing::debug!(
            start = grid.start(),
            step = grid.step(),
            len = grid.len(),
            "resampled color matching functions"
        );

        Ok(Self {
            options,
            grid,
            x_bar,
            y_bar,
            z_bar,
        })
    }

    /// Create new color matching functions from records with wavelength,
    /// x-bar, y-bar, and z-bar.
    ///
    /// The records must be in strictly ascending wavelength order and have at
    /// least two distinct wavelengths.
    pub fn from_records(
        records: &[[Float; 4]],
        options: CmfOptions,
    ) -> Result<Self, SpectralError> {
        if !(options.sampling > 0.0 && options.sampling.is_finite()) {
            return Err(SpectralError::InvalidConfiguration(options.sampling));
        }

        let wavelengths: Vec<Float> = records.iter().map(|r| r[0]).collect();

        let mut distinct = wavelengths.clone();
        distinct.sort_by(|w1, w2| w1.total_cmp(w2));
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(SpectralError::InsufficientData {
                what: "color matching functions",
                count: distinct.len(),
            });
        }
        check_ascending("color matching function wavelengths", &wavelengths)?;

        let curve = |channel: usize| {
            SampledSpectrum::new(
                wavelengths.clone(),
                records.iter().map(|r| r[channel]).collect(),
            )
        };

        tracing::debug!(records = records.len(), "loaded color matching functions");
        Self::from_curves(&curve(1)?, &curve(2)?, &curve(3)?, options)
    }

    /// Create new color matching functions from comma-separated text.
    ///
    /// Each non-blank line must have exactly four comma-separated decimal
    /// numbers, i.e., wavelength, x-bar, y-bar, and z-bar.
    pub fn from_csv(text: &str, options: CmfOptions) -> Result<Self, SpectralError> {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if !line.trim().is_empty() {
                records.push(parse_record(index + 1, line)?);
            }
        }

        Self::from_records(&records, options)
    }

    /// Create new color matching functions from a reader producing
    /// comma-separated text.
    ///
    /// A line that is not valid UTF-8 is a malformed record and results in a
    /// [`ParseError`] with [`ParseErrorKind::InvalidText`]. All other I/O
    /// errors are passed through.
    pub fn from_reader<R: BufRead>(reader: R, options: CmfOptions) -> Result<Self, SpectralError> {
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|error| match error.kind() {
                ErrorKind::InvalidData => {
                    SpectralError::Parse(ParseError::new(index + 1, ParseErrorKind::InvalidText))
                }
                _ => SpectralError::Io(error),
            })?;
            if !line.trim().is_empty() {
                records.push(parse_record(index + 1, &line)?);
            }
        }

        Self::from_records(&records, options)
    }

    /// Create new color matching functions from the comma-separated file at
    /// the given path.
    pub fn from_path<P: AsRef<Path>>(path: P, options: CmfOptions) -> Result<Self, SpectralError> {
        let file = std::fs::File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "reading color matching functions");
        Self::from_reader(std::io::BufReader::new(file), options)
    }

    /// Create new color matching functions from the analytical approximation
    /// of the CIE 1931 2º standard observer.
    ///
    /// The approximation is sampled at 1nm from 360nm to 830nm before being
    /// resampled with the given options.
    pub fn analytic_1931(options: CmfOptions) -> Result<Self, SpectralError> {
        let records: Vec<[Float; 4]> = (std_observer::START..=std_observer::END)
            .map(|nm| {
                let wavelength = nm as Float;
                [
                    wavelength,
                    std_observer::x(wavelength),
                    std_observer::y(wavelength),
                    std_observer::z(wavelength),
                ]
            })
            .collect();

        Self::from_records(&records, options)
    }

    /// Get the options used for resampling.
    #[inline]
    pub fn options(&self) -> &CmfOptions {
        &self.options
    }

    /// Get the wavelength grid.
    #[inline]
    pub fn grid(&self) -> &WavelengthGrid {
        &self.grid
    }

    /// Get the grid's wavelengths.
    pub fn wavelengths(&self) -> Vec<Float> {
        self.grid.to_vec()
    }

    /// Get the integration step, i.e., the grid's step.
    #[inline]
    pub fn delta(&self) -> Float {
        self.grid.delta()
    }

    /// Get the number of grid wavelengths.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Get the resampled x-bar values.
    #[inline]
    pub fn x_bar(&self) -> &[Float] {
        &self.x_bar
    }

    /// Get the resampled y-bar values.
    #[inline]
    pub fn y_bar(&self) -> &[Float] {
        &self.y_bar
    }

    /// Get the resampled z-bar values.
    #[inline]
    pub fn z_bar(&self) -> &[Float] {
        &self.z_bar
    }

    /// Get the wavelength and resampled triple at the given grid index.
    pub fn at(&self, index: usize) -> Option<(Float, [Float; 3])> {
        let wavelength = self.grid.at(index)?;
        Some((
            wavelength,
            [self.x_bar[index], self.y_bar[index], self.z_bar[index]],
        ))
    }
}

#[cfg(feature = "pyffi")]
#[pymethods]
impl ColorMatchingFunctions {
    /// Load color matching functions from the comma-separated file.
    /// <i class=python-only>Python only!</i>
    #[new]
    #[pyo3(signature = (filename, sampling = CmfOptions::DEFAULT_SAMPLING))]
    pub fn py_new(filename: &str, sampling: Float) -> PyResult<Self> {
        Ok(Self::from_path(
            filename,
            CmfOptions::default().with_sampling(sampling),
        )?)
    }

    /// Get the grid's wavelengths. <i class=python-only>Python only!</i>
    #[pyo3(name = "wavelengths")]
    pub fn py_wavelengths(&self) -> Vec<Float> {
        self.wavelengths()
    }

    /// Convert an emissive spectral image given as nested lists with indices
    /// row, column, and band. <i class=python-only>Python only!</i>
    pub fn get_xyz_emissive_img(
        &self,
        image_wl: Vec<Float>,
        spectral_image: Vec<Vec<Vec<Float>>>,
    ) -> PyResult<Vec<Vec<Vec<Float>>>> {
        let image = crate::integrate::nested_to_array(spectral_image)?;
        let xyz = self.xyz_emissive_img(&image_wl, &image)?;
        Ok(crate::integrate::array_to_nested(&xyz))
    }

    /// Convert a reflective spectral image given as nested lists with indices
    /// row, column, and band. <i class=python-only>Python only!</i>
    pub fn get_xyz_reflective_img(
        &self,
        wavelength_illu: Vec<Float>,
        spectrum_illu: Vec<Float>,
        image_wl: Vec<Float>,
        spectral_image: Vec<Vec<Vec<Float>>>,
    ) -> PyResult<Vec<Vec<Vec<Float>>>> {
        let image = crate::integrate::nested_to_array(spectral_image)?;
        let xyz = self.xyz_reflective_img(&wavelength_illu, &spectrum_illu, &image_wl, &image)?;
        Ok(crate::integrate::array_to_nested(&xyz))
    }

    /// Get a debug representation. <i class=python-only>Python only!</i>
    pub fn __repr__(&self) -> String {
        format!(
            "CMF(start={}, step={}, len={})",
            self.grid.start(),
            self.grid.step(),
            self.grid.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::{CmfOptions, ColorMatchingFunctions};
    use crate::assert_close_enough;
    use crate::core::Extrapolation;
    use crate::error::{ParseErrorKind, SpectralError};
    use crate::grid::GridEnd;

    const TRIANGLE: &str = "400,0,0,0\n550,0,1,0\n700,0,0,0\n";

    #[test]
    fn test_parse() {
        let cmf = ColorMatchingFunctions::from_csv(
            " 400, 0.1, 0.2 ,0.3\n\n500,1e-1,2E-1,3.0\n",
            CmfOptions::default().with_sampling(50.0),
        )
        .unwrap();
        assert_eq!(cmf.wavelengths(), vec![400.0, 450.0]);
        assert_eq!(cmf.at(0), Some((400.0, [0.1, 0.2, 0.3])));

        for (text, line, kind) in [
            ("400,0,0\n500,0,0,0", 1, ParseErrorKind::FieldCount(3)),
            ("400,0,0,0\n500,0,0,0,0", 2, ParseErrorKind::FieldCount(5)),
            ("400,0,0,0\n\n500,0,zero,0", 3, ParseErrorKind::MalformedNumber(2)),
            ("400,0,0,", 1, ParseErrorKind::MalformedNumber(3)),
        ] {
            let result = ColorMatchingFunctions::from_csv(text, CmfOptions::default());
            match result {
                Err(SpectralError::Parse(error)) => {
                    assert_eq!(error.line, line, "line for {:?}", text);
                    assert_eq!(error.kind, kind, "kind for {:?}", text);
                }
                other => panic!("expected parse error for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_reader() {
        let cmf = ColorMatchingFunctions::from_reader(
            std::io::Cursor::new(TRIANGLE),
            CmfOptions::default().with_sampling(50.0),
        )
        .unwrap();
        assert_eq!(cmf.y_bar().len(), 6);

        assert!(matches!(
            ColorMatchingFunctions::from_path("/nonexistent/cmf.csv", CmfOptions::default()),
            Err(SpectralError::Io(_))
        ));
    }

    #[test]
    fn test_reader_invalid_text() {
        let bytes: &[u8] = b"400,0,0,0\n500,0,\xff,0\n700,0,0,0\n";
        match ColorMatchingFunctions::from_reader(bytes, CmfOptions::default()) {
            Err(SpectralError::Parse(error)) => {
                assert_eq!(error.line, 2);
                assert_eq!(error.kind, ParseErrorKind::InvalidText);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid() {
        for sampling in [0.0, -1.0, crate::Float::NAN, 1e-30, 1e-6] {
            assert!(matches!(
                ColorMatchingFunctions::from_csv(
                    TRIANGLE,
                    CmfOptions::default().with_sampling(sampling)
                ),
                Err(SpectralError::InvalidConfiguration(_))
            ));
        }

        for text in ["", "400,0,1,0", "400,0,1,0\n400,0,1,0"] {
            assert!(matches!(
                ColorMatchingFunctions::from_csv(text, CmfOptions::default()),
                Err(SpectralError::InsufficientData { .. })
            ));
        }

        assert!(matches!(
            ColorMatchingFunctions::from_csv("500,0,1,0\n400,0,1,0", CmfOptions::default()),
            Err(SpectralError::UnorderedWavelengths { index: 1, .. })
        ));
    }

    #[test]
    fn test_grid() {
        for sampling in [1.0, 2.0, 3.0, 7.5, 50.0] {
            let cmf = ColorMatchingFunctions::from_csv(
                TRIANGLE,
                CmfOptions::default().with_sampling(sampling),
            )
            .unwrap();
            let expected = ((700.0 - 400.0) / sampling).ceil() as usize;
            assert_eq!(cmf.len(), expected);
            assert_eq!(cmf.delta(), sampling);
            assert!(cmf.wavelengths().iter().all(|&w| 400.0 <= w && w < 700.0));
        }

        let cmf = ColorMatchingFunctions::from_csv(
            TRIANGLE,
            CmfOptions::default()
                .with_sampling(50.0)
                .with_grid_end(GridEnd::Inclusive),
        )
        .unwrap();
        assert_eq!(cmf.wavelengths().last(), Some(&700.0));
    }

    #[test]
    fn test_triangle() {
        let cmf = ColorMatchingFunctions::from_csv(
            TRIANGLE,
            CmfOptions::default().with_sampling(50.0),
        )
        .unwrap();

        assert_eq!(cmf.x_bar(), &[0.0; 6]);
        assert_eq!(cmf.z_bar(), &[0.0; 6]);
        let expected = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 2.0 / 3.0, 1.0 / 3.0];
        for (actual, expected) in cmf.y_bar().iter().zip(expected) {
            assert_close_enough!(*actual, expected);
        }
    }

    #[test]
    fn test_zero_outside_domain() {
        // x-bar covers [400, 700] only, y-bar the whole range.
        let x = crate::SampledSpectrum::from_pairs(&[(400.0, 1.0), (700.0, 1.0)]).unwrap();
        let y = crate::SampledSpectrum::from_pairs(&[(300.0, 1.0), (800.0, 1.0)]).unwrap();
        let z = y.clone();

        let cmf = ColorMatchingFunctions::from_curves(
            &x,
            &y,
            &z,
            CmfOptions::default().with_sampling(10.0),
        )
        .unwrap();
        for (index, wavelength) in cmf.grid().iter().enumerate() {
            let expected = if (400.0..=700.0).contains(&wavelength) {
                1.0
            } else {
                0.0
            };
            assert_eq!(cmf.x_bar()[index], expected, "x-bar at {}nm", wavelength);
            assert_eq!(cmf.y_bar()[index], 1.0, "y-bar at {}nm", wavelength);
        }

        let cmf = ColorMatchingFunctions::from_curves(
            &x,
            &y,
            &z,
            CmfOptions::default()
                .with_sampling(10.0)
                .with_extrapolation(Extrapolation::Edge),
        )
        .unwrap();
        assert!(cmf.x_bar().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_idempotent() {
        let options = CmfOptions::default().with_sampling(1.5);
        let cmf1 = ColorMatchingFunctions::analytic_1931(options).unwrap();
        let cmf2 = ColorMatchingFunctions::analytic_1931(options).unwrap();

        let bits = |values: &[crate::Float]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(cmf1.x_bar()), bits(cmf2.x_bar()));
        assert_eq!(bits(cmf1.y_bar()), bits(cmf2.y_bar()));
        assert_eq!(bits(cmf1.z_bar()), bits(cmf2.z_bar()));
        assert_eq!(cmf1, cmf2);
    }

    #[test]
    fn test_analytic() {
        let cmf = ColorMatchingFunctions::analytic_1931(CmfOptions::default()).unwrap();
        assert_eq!(cmf.len(), 235);
        assert_eq!(cmf.grid().start(), 360.0);
        assert_eq!(cmf.grid().last(), 828.0);
        assert_eq!(cmf.options(), &CmfOptions::default());
        assert_eq!(cmf.at(235), None);
    }
}
