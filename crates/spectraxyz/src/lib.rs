//! # Spectra to XYZ
//!
//! Spectraxyz converts spectral images, i.e., per-pixel radiance or
//! reflectance sampled at a set of wavelengths, into CIE XYZ tristimulus
//! images.
#![cfg_attr(
    not(feature = "pyffi"),
    doc = " This version of the API documentation **covers native Rust interfaces
only**."
)]
#![cfg_attr(
    feature = "pyffi",
    doc = " This version of the API documentation **covers both Rust and Python
interfaces**."
)]
//!
//!
//! ## 1. Overview
//!
//! Spectraxyz's main abstractions are:
//!
//!   * [`ColorMatchingFunctions`] loads three color matching functions
//!     sampled at arbitrary, possibly non-uniform, wavelengths and resamples
//!     them onto a uniform [`WavelengthGrid`]. That happens exactly once, upon
//!     construction. [`CmfOptions`] controls the grid step, whether the grid
//!     includes the end wavelength ([`GridEnd`]), and how wavelengths outside a
//!     curve's domain are treated ([`Extrapolation`]).
//!   * [`ColorMatchingFunctions::xyz_emissive_img`] integrates a self-luminous
//!     spectral image against the resampled functions.
//!   * [`ColorMatchingFunctions::xyz_reflective_img`] integrates a reflectance
//!     image against the product of an illuminant and the resampled
//!     functions, normalized by the illuminant's luminance.
//!     [`IlluminatedCmf`] caches that product for converting several images
//!     under the same illuminant.
//!   * [`SampledSpectrum`] represents a single curve, such as an illuminant,
//!     as (wavelength, value) pairs.
//!
//! All fallible operations return a [`SpectralError`](error::SpectralError).
//! Resampled color matching functions are immutable and hence can be shared
//! between threads without further synchronization.
//!
//!
//! ## 2. One Step
//!
//! ```
//! # use spectraxyz::{CmfOptions, ColorMatchingFunctions, error::SpectralError};
//! # use ndarray::Array3;
//! let cmf = ColorMatchingFunctions::from_csv(
//!     "400,0,0,0\n550,0,1,0\n700,0,0,0\n",
//!     CmfOptions::default().with_sampling(50.0),
//! )?;
//!
//! let image = Array3::from_elem((1, 1, 1), 2.0);
//! let xyz = cmf.xyz_emissive_img(&[550.0], &image)?;
//! assert_eq!(xyz[[0, 0, 1]], 2.0 * 1.0 * 50.0);
//! # Ok::<(), SpectralError>(())
//! ```
//!
//!
//! ## 3. Optional Features
//!
//! Spectraxyz supports three feature flags:
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     and `u64` as [`Bits`] instead of `f32` as [`Float`] and `u32` as
//!     [`Bits`]. This feature is enabled by default.
//!   - **`serde`** derives serialization and deserialization for
//!     [`CmfOptions`], [`GridEnd`], and [`Extrapolation`]. This feature is
//!     disabled by default.
//!   - **`pyffi`** controls spectraxyz's Python integration through
//!     [PyO3](https://pyo3.rs/). This feature is disabled by default.
//!
//! Spectraxyz logs through [`tracing`] and leaves installing a subscriber to
//! the application.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// [`Float`]'s bits.
#[cfg(feature = "f64")]
pub type Bits = u64;
/// [`Float`]'s bits.
#[cfg(not(feature = "f64"))]
pub type Bits = u32;

mod cmf;
mod core;
pub mod error;
mod grid;
mod integrate;
pub mod spectrum;

#[doc(hidden)]
pub use core::to_eq_bits;

pub use cmf::{CmfOptions, ColorMatchingFunctions};
pub use core::Extrapolation;
pub use grid::{GridEnd, WavelengthGrid};
pub use integrate::IlluminatedCmf;
pub use spectrum::SampledSpectrum;

#[cfg(feature = "pyffi")]
use pyo3::prelude::*;

#[doc(hidden)]
#[cfg(feature = "pyffi")]
#[pymodule]
pub fn spectraxyz(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ColorMatchingFunctions>()?;
    m.add_class::<Extrapolation>()?;
    m.add_class::<GridEnd>()?;

    m.add_function(wrap_pyfunction!(spectrum::std_observer::x, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum::std_observer::y, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum::std_observer::z, m)?)?;

    Ok(())
}
