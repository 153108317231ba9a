use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use spectraxyz::{CmfOptions, ColorMatchingFunctions, Float, SampledSpectrum};

pub fn run_benchmarks(c: &mut Criterion) {
    let options = CmfOptions::default();
    let cmf = ColorMatchingFunctions::analytic_1931(options)
        .expect("analytic observer should resample with default options");

    let image_wl: Vec<Float> = (0..31).map(|b| 400.0 + 10.0 * b as Float).collect();
    let image = Array3::from_shape_fn((64, 64, 31), |(r, c, b)| {
        ((r * 31 + c * 7 + b) % 17) as Float / 17.0
    });
    let illuminant = SampledSpectrum::from_pairs(&[(380.0, 50.0), (560.0, 100.0), (780.0, 80.0)])
        .expect("illuminant should be well-formed");

    let mut group = c.benchmark_group("spectral-conversion");
    group.sample_size(20);

    group.bench_function("resample", |b| {
        b.iter(|| ColorMatchingFunctions::analytic_1931(options))
    });

    group.bench_function("emissive-64x64x31", |b| {
        b.iter(|| cmf.xyz_emissive_img(&image_wl, &image))
    });

    group.bench_function("reflective-64x64x31", |b| {
        b.iter(|| {
            cmf.xyz_reflective_img(
                illuminant.wavelengths(),
                illuminant.values(),
                &image_wl,
                &image,
            )
        })
    });

    let illuminated = cmf
        .illuminate(&illuminant)
        .expect("illuminant should have non-zero luminance");
    group.bench_function("reflective-prepared-64x64x31", |b| {
        b.iter(|| illuminated.xyz_img(&image_wl, &image))
    });

    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
