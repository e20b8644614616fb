pub mod aggregate;
pub mod assembler;
pub mod buffer;
pub mod collector;
pub mod fit;
pub mod survey;
pub mod variant;

pub use aggregate::LayerAggregator;
pub use assembler::{generate, ProfileGenerator};
pub use buffer::SampleBuffer;
pub use collector::{HeightLayer, LayerSamples, Sample, SampleCollector};
pub use fit::{FitOutcome, FitResult, FitSolver};
pub use survey::{SweepPlan, VolumeMetadata, VolumeSurvey};
pub use variant::{CountState, EnhancedStrategy, LegacyStrategy, RetrievalStrategy};
