mod equality;
mod interp;
mod math;

// equality
pub use equality::to_eq_bits;

// interp
pub use interp::Extrapolation;
pub(crate) use interp::InterpolationPlan;

// math
pub(crate) use math::{clamp_non_negative, Accumulator, FloatExt, ThreeAccumulator};
