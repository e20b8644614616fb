pub mod geometry;
pub mod lsq;
pub mod stats;

pub use geometry::{EffectiveEarth, Geometry};
pub use lsq::LeastSquares;
pub use stats::{dbz_to_z, z_to_dbz, ReflectivityStats, StatsHelper};
