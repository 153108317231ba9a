//! Integration of spectra against resampled color matching functions.
//!
//! Both conversions first resample each spectrum onto the color matching
//! functions' [`WavelengthGrid`](crate::WavelengthGrid), clamp the resampled
//! values to be non-negative, and then compute a rectangle-rule integral with
//! the grid's step as width:
//!
//!   * **Emissive** conversion integrates the spectrum against x-bar, y-bar,
//!     and z-bar directly.
//!   * **Reflective** conversion integrates the spectrum against the product
//!     of an illuminant with x-bar, y-bar, and z-bar and normalizes the result
//!     by the illuminant's own integral against y-bar. A perfect white
//!     reflector thus has a Y of one.
//!
//! Spectral images are [`ndarray`] arrays whose trailing axis holds the bands.
//! Since all pixels share the same band wavelengths, the mapping from bands to
//! grid wavelengths is computed once per image. The result has the same shape
//! as the input except for the trailing axis, which has length three for X, Y,
//! and Z.
//!
//! Not-a-number samples are not neutralized by clamping. They propagate into
//! the affected pixel's tristimulus values.

use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Zip};

use crate::cmf::ColorMatchingFunctions;
use crate::core::{
    clamp_non_negative, Accumulator, Extrapolation, InterpolationPlan, ThreeAccumulator,
};
use crate::error::SpectralError;
use crate::grid::WavelengthGrid;
use crate::spectrum::{check_ascending, SampledSpectrum};
use crate::Float;

/// Plan the resampling of a spectrum or spectral image onto the grid.
fn plan_bands(
    grid: &WavelengthGrid,
    extrapolation: Extrapolation,
    wavelengths: &[Float],
    bands: usize,
) -> Result<InterpolationPlan, SpectralError> {
    if wavelengths.len() != bands {
        return Err(SpectralError::ShapeMismatch {
            what: "spectral bands",
            expected: wavelengths.len(),
            actual: bands,
        });
    }
    if wavelengths.is_empty() {
        return Err(SpectralError::InsufficientData {
            what: "spectral wavelengths",
            count: 0,
        });
    }
    check_ascending("spectral wavelengths", wavelengths)?;

    let plan = InterpolationPlan::new(wavelengths, &grid.to_vec(), extrapolation);
    if !plan.overlaps() {
        tracing::warn!(
            first = wavelengths[0],
            last = wavelengths[wavelengths.len() - 1],
            grid_start = grid.start(),
            grid_last = grid.last(),
            "spectral wavelengths do not overlap color matching functions"
        );
    }

    Ok(plan)
}

/// Integrate one spectrum, accessed through a closure, against the weights.
#[inline]
fn integrate_spectrum<F>(
    plan: &InterpolationPlan,
    weights: [&[Float]; 3],
    scale: Float,
    value: F,
) -> [Float; 3]
where
    F: Fn(usize) -> Float,
{
    let [wx, wy, wz] = weights;
    let mut sum = ThreeAccumulator::new();

    for index in 0..plan.len() {
        let sample = clamp_non_negative(plan.evaluate(index, &value));
        sum += [sample * wx[index], sample * wy[index], sample * wz[index]];
    }

    let [x, y, z] = sum.total();
    [x * scale, y * scale, z * scale]
}

/// Integrate every spectrum along the trailing axis of the image.
fn integrate_image<S, D>(
    grid: &WavelengthGrid,
    extrapolation: Extrapolation,
    weights: [&[Float]; 3],
    scale: Float,
    image_wl: &[Float],
    spectral_image: &ArrayBase<S, D>,
) -> Result<Array<Float, D>, SpectralError>
where
    S: Data<Elem = Float>,
    D: Dimension,
{
    let ndim = spectral_image.ndim();
    if ndim == 0 {
        return Err(SpectralError::ShapeMismatch {
            what: "spectral image dimensions",
            expected: 1,
            actual: 0,
        });
    }

    let band_axis = Axis(ndim - 1);
    let plan = plan_bands(
        grid,
        extrapolation,
        image_wl,
        spectral_image.len_of(band_axis),
    )?;

    let mut shape = spectral_image.raw_dim();
    shape[ndim - 1] = 3;
    let mut output = Array::zeros(shape);

    tracing::trace!(
        pixels = output.len() / 3,
        bands = image_wl.len(),
        "integrating spectral image"
    );

    Zip::from(output.lanes_mut(band_axis))
        .and(spectral_image.lanes(band_axis))
        .for_each(|mut xyz, spectrum| {
            let [x, y, z] = integrate_spectrum(&plan, weights, scale, |band| spectrum[band]);
            xyz[0] = x;
            xyz[1] = y;
            xyz[2] = z;
        });

    Ok(output)
}

// --------------------------------------------------------------------------------------------------------------------

impl ColorMatchingFunctions {
    #[inline]
    fn weights(&self) -> [&[Float]; 3] {
        [
            self.x_bar.as_slice(),
            self.y_bar.as_slice(),
            self.z_bar.as_slice(),
        ]
    }

    /// Convert an emissive spectrum to tristimulus values.
    ///
    /// This method is the single-pixel version of
    /// [`ColorMatchingFunctions::xyz_emissive_img`].
    pub fn xyz_emissive(
        &self,
        wavelengths: &[Float],
        values: &[Float],
    ) -> Result<[Float; 3], SpectralError> {
        let plan = plan_bands(
            &self.grid,
            self.options.extrapolation,
            wavelengths,
            values.len(),
        )?;

        Ok(integrate_spectrum(
            &plan,
            self.weights(),
            self.grid.delta(),
            |band| values[band],
        ))
    }

    /// Convert an emissive spectral image to a tristimulus image.
    ///
    /// The image's trailing axis holds the bands, whose wavelengths are given
    /// by `image_wl`. The wavelengths must be strictly ascending and as many as
    /// there are bands. The image is linearly interpolated onto the grid with
    /// negative results clamped to zero, multiplied with each color matching
    /// function, summed, and scaled by the grid step.
    pub fn xyz_emissive_img<S, D>(
        &self,
        image_wl: &[Float],
        spectral_image: &ArrayBase<S, D>,
    ) -> Result<Array<Float, D>, SpectralError>
    where
        S: Data<Elem = Float>,
        D: Dimension,
    {
        integrate_image(
            &self.grid,
            self.options.extrapolation,
            self.weights(),
            self.grid.delta(),
            image_wl,
            spectral_image,
        )
    }

    /// Premultiply the illuminant with these color matching functions.
    ///
    /// The illuminant is resampled onto the grid with the same extrapolation
    /// policy as the color matching functions. This method fails if the
    /// illuminant's integral against y-bar is zero or not finite.
    pub fn illuminate(
        &self,
        illuminant: &SampledSpectrum,
    ) -> Result<IlluminatedCmf, SpectralError> {
        IlluminatedCmf::new(self, illuminant)
    }

    /// Convert a reflectance spectrum under the illuminant to tristimulus
    /// values.
    ///
    /// This method is the single-pixel version of
    /// [`ColorMatchingFunctions::xyz_reflective_img`].
    pub fn xyz_reflective(
        &self,
        illuminant: &SampledSpectrum,
        wavelengths: &[Float],
        values: &[Float],
    ) -> Result<[Float; 3], SpectralError> {
        self.illuminate(illuminant)?.xyz(wavelengths, values)
    }

    /// Convert a reflective spectral image under the illuminant to a
    /// tristimulus image.
    ///
    /// The illuminant is given by parallel slices of wavelengths and spectral
    /// radiance. Otherwise, this method accepts the same image arguments as
    /// [`ColorMatchingFunctions::xyz_emissive_img`]. When converting several
    /// images under the same illuminant, [`ColorMatchingFunctions::illuminate`]
    /// avoids repeating the illuminant's preparation.
    pub fn xyz_reflective_img<S, D>(
        &self,
        wavelength_illu: &[Float],
        spectrum_illu: &[Float],
        image_wl: &[Float],
        spectral_image: &ArrayBase<S, D>,
    ) -> Result<Array<Float, D>, SpectralError>
    where
        S: Data<Elem = Float>,
        D: Dimension,
    {
        let illuminant = SampledSpectrum::new(wavelength_illu.to_vec(), spectrum_illu.to_vec())?;
        self.illuminate(&illuminant)?.xyz_img(image_wl, spectral_image)
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Color matching functions premultiplied with an illuminant.
///
/// The per-wavelength products of illuminant and color matching functions are
/// also known as weighting factors. Together with the illuminant's luminance,
/// i.e., its integral against y-bar, they are all that is needed for
/// converting reflectance spectra.
#[derive(Clone, Debug)]
pub struct IlluminatedCmf {
    grid: WavelengthGrid,
    extrapolation: Extrapolation,
    weights: [Vec<Float>; 3],
    luminance: Float,
}

impl IlluminatedCmf {
    fn new(
        cmf: &ColorMatchingFunctions,
        illuminant: &SampledSpectrum,
    ) -> Result<Self, SpectralError> {
        let extrapolation = cmf.options.extrapolation;
        let values = illuminant.resample(&cmf.grid, extrapolation);

        let premultiply = |curve: &[Float]| -> Vec<Float> {
            values.iter().zip(curve).map(|(s, c)| s * c).collect()
        };
        let weights = [
            premultiply(cmf.x_bar.as_slice()),
            premultiply(cmf.y_bar.as_slice()),
            premultiply(cmf.z_bar.as_slice()),
        ];

        let mut sum = Accumulator::new();
        for weight in weights[1].iter() {
            sum += *weight;
        }
        let luminance = sum.total() * cmf.grid.delta();

        if luminance == 0.0 || !luminance.is_finite() {
            return Err(SpectralError::DivisionByZero);
        }

        tracing::debug!(
            samples = illuminant.len(),
            luminance,
            "prepared illuminant"
        );

        Ok(Self {
            grid: cmf.grid.clone(),
            extrapolation,
            weights,
            luminance,
        })
    }

    #[inline]
    fn weights(&self) -> [&[Float]; 3] {
        [
            self.weights[0].as_slice(),
            self.weights[1].as_slice(),
            self.weights[2].as_slice(),
        ]
    }

    #[inline]
    fn scale(&self) -> Float {
        self.grid.delta() / self.luminance
    }

    /// Get the illuminant's luminance, i.e., its integral against y-bar.
    #[inline]
    pub fn luminance(&self) -> Float {
        self.luminance
    }

    /// Get the premultiplied weights for x-bar, y-bar, and z-bar.
    #[inline]
    pub fn weighting_factors(&self) -> &[Vec<Float>; 3] {
        &self.weights
    }

    /// Determine the illuminant's white point.
    ///
    /// The white point is the tristimulus value of a perfect white reflector
    /// under the illuminant, with Y normalized to one.
    pub fn white_point(&self) -> [Float; 3] {
        let mut sum = ThreeAccumulator::new();
        for index in 0..self.grid.len() {
            sum += [
                self.weights[0][index],
                self.weights[1][index],
                self.weights[2][index],
            ];
        }

        let [x, y, z] = sum.total();
        [x / y, 1.0, z / y]
    }

    /// Convert a reflectance spectrum to tristimulus values.
    pub fn xyz(
        &self,
        wavelengths: &[Float],
        values: &[Float],
    ) -> Result<[Float; 3], SpectralError> {
        let plan = plan_bands(&self.grid, self.extrapolation, wavelengths, values.len())?;
        Ok(integrate_spectrum(
            &plan,
            self.weights(),
            self.scale(),
            |band| values[band],
        ))
    }

    /// Convert a reflective spectral image to a tristimulus image.
    pub fn xyz_img<S, D>(
        &self,
        image_wl: &[Float],
        spectral_image: &ArrayBase<S, D>,
    ) -> Result<Array<Float, D>, SpectralError>
    where
        S: Data<Elem = Float>,
        D: Dimension,
    {
        integrate_image(
            &self.grid,
            self.extrapolation,
            self.weights(),
            self.scale(),
            image_wl,
            spectral_image,
        )
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Convert nested rows, columns, and bands into an array.
///
/// All rows must have the same number of columns and all pixels the same
/// number of bands. Otherwise, this function fails with a shape mismatch.
#[cfg_attr(not(feature = "pyffi"), allow(dead_code))]
pub(crate) fn nested_to_array(
    data: Vec<Vec<Vec<Float>>>,
) -> Result<ndarray::Array3<Float>, SpectralError> {
    let rows = data.len();
    let columns = data.first().map_or(0, Vec::len);
    let bands = data
        .first()
        .and_then(|row| row.first())
        .map_or(0, Vec::len);

    let mut flat = Vec::with_capacity(rows * columns * bands);
    for row in data {
        if row.len() != columns {
            return Err(SpectralError::ShapeMismatch {
                what: "spectral image columns",
                expected: columns,
                actual: row.len(),
            });
        }
        for pixel in row {
            if pixel.len() != bands {
                return Err(SpectralError::ShapeMismatch {
                    what: "spectral image bands",
                    expected: bands,
                    actual: pixel.len(),
                });
            }
            flat.extend(pixel);
        }
    }

    let actual = flat.len();
    ndarray::Array3::from_shape_vec((rows, columns, bands), flat).map_err(|_| {
        SpectralError::ShapeMismatch {
            what: "spectral image samples",
            expected: rows * columns * bands,
            actual,
        }
    })
}

/// Convert an array into nested rows, columns, and channels.
#[cfg_attr(not(feature = "pyffi"), allow(dead_code))]
pub(crate) fn array_to_nested(data: &ndarray::Array3<Float>) -> Vec<Vec<Vec<Float>>> {
    data.outer_iter()
        .map(|row| row.outer_iter().map(|pixel| pixel.to_vec()).collect())
        .collect()
}

// --------------------------------------------------------------------------------------------------------------------
