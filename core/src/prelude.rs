pub use crate::config::{FieldSet, ProfileConfig, ProfileField, Variant};
pub use crate::profile::{ProfileLevel, VerticalProfile};

/// Failures that abort a whole profile generation.
///
/// Layers without enough data are not errors; they come back as nodata levels.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("allocation failure: {0}")]
    Allocation(String),
    #[error("no usable sweeps in volume")]
    NoUsableData,
}

pub type ProfileResult<T> = Result<T, ProfileError>;
