//! Utility module with spectraxyz's errors.

#[cfg(feature = "pyffi")]
use pyo3::{
    exceptions::{PyIOError, PyValueError},
    prelude::*,
};

use crate::Float;

/// The kinds of malformed records in a color matching function source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A record with the given number of comma-separated fields instead of
    /// four. For example, `400,0,0` is missing the z-bar value.
    FieldCount(usize),

    /// A record whose field with the given zero-based index is not a decimal
    /// number. For example, `400,0,zero,0` has a malformed y-bar value.
    MalformedNumber(usize),

    /// A line that is not valid UTF-8 text.
    InvalidText,
}

/// A malformed record in a color matching function source.
///
/// Each record must have exactly four comma-separated decimal numbers, the
/// wavelength followed by x-bar, y-bar, and z-bar values. The line number is
/// one-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ParseErrorKind::FieldCount(count) => write!(
                f,
                "record on line {} should have 4 comma-separated fields but has {}",
                self.line, count
            ),
            ParseErrorKind::MalformedNumber(field) => write!(
                f,
                "record on line {} should have a decimal number as field #{} but does not",
                self.line,
                field + 1
            ),
            ParseErrorKind::InvalidText => {
                write!(f, "record on line {} should be UTF-8 text but is not", self.line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(feature = "pyffi")]
impl From<ParseError> for PyErr {
    fn from(value: ParseError) -> Self {
        PyValueError::new_err(value.to_string())
    }
}

// ====================================================================================================================

/// An error while resampling color matching functions or integrating spectra.
///
/// All computations are deterministic. Hence none of these errors are
/// transient and retrying an operation with the same inputs fails the same
/// way. Wavelengths outside a curve's domain are not errors; they are handled
/// by the configured [`Extrapolation`](crate::Extrapolation).
#[derive(Debug)]
pub enum SpectralError {
    /// A malformed record in a color matching function source.
    Parse(ParseError),

    /// A sampling step that is not a positive, finite number or that results
    /// in more than [`WavelengthGrid::MAX_LEN`](crate::WavelengthGrid::MAX_LEN)
    /// grid wavelengths.
    InvalidConfiguration(Float),

    /// A curve or axis with too few samples. The string names the offending
    /// input.
    InsufficientData { what: &'static str, count: usize },

    /// An axis whose length differs from its counterpart's. For example, a
    /// spectral image's band axis must have as many entries as there are band
    /// wavelengths.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Wavelengths that are not strictly ascending. The index is that of the
    /// first wavelength that is smaller than or equal to its predecessor.
    UnorderedWavelengths { what: &'static str, index: usize },

    /// An illuminant whose luminance, i.e., its integral against y-bar, is zero
    /// or not finite, which makes normalization impossible.
    DivisionByZero,

    /// An I/O error while reading a color matching function source.
    Io(std::io::Error),
}

impl std::fmt::Display for SpectralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SpectralError::*;

        match self {
            Parse(error) => write!(f, "could not parse color matching functions: {}", error),
            InvalidConfiguration(sampling) => write!(
                f,
                "sampling step should be a positive number yielding at most {} \
                 wavelengths but is {}",
                crate::WavelengthGrid::MAX_LEN,
                sampling
            ),
            InsufficientData { what, count } => write!(
                f,
                "{} should have enough samples to interpolate but has {}",
                what, count
            ),
            ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{} should have length {} but has length {}",
                what, expected, actual
            ),
            UnorderedWavelengths { what, index } => write!(
                f,
                "{} should be strictly ascending but entry {} is not",
                what, index
            ),
            DivisionByZero => {
                f.write_str("illuminant should have non-zero luminance but integrates to zero")
            }
            Io(error) => write!(f, "could not read color matching functions: {}", error),
        }
    }
}

impl std::error::Error for SpectralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpectralError::Parse(error) => Some(error),
            SpectralError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ParseError> for SpectralError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<std::io::Error> for SpectralError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "pyffi")]
impl From<SpectralError> for PyErr {
    fn from(value: SpectralError) -> Self {
        match value {
            SpectralError::Io(_) => PyIOError::new_err(value.to_string()),
            _ => PyValueError::new_err(value.to_string()),
        }
    }
}
