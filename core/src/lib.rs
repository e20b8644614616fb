//! Vertical wind and reflectivity profiles from Doppler weather radar volumes.
//!
//! A [`PolarVolume`](volume::PolarVolume) is surveyed once, then every height
//! layer up to `hmax` is filled from the radial velocity and reflectivity bins
//! falling into it. Winds come from a least-squares fit of the azimuthal
//! velocity pattern, reflectivity from linear-Z averaging.

pub mod config;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod profile;
pub mod telemetry;
pub mod volume;

pub use config::{FieldSet, ProfileConfig, ProfileField, Variant};
pub use prelude::{ProfileError, ProfileResult};
pub use processing::{generate, ProfileGenerator};
pub use profile::VerticalProfile;
