pub mod artifact;
pub mod features;
pub mod runtime;
pub mod scaler;

pub use artifact::{ArtifactSource, FsArtifactSource, ModelArtifact};
pub use runtime::{LstmModel, ModelRuntime};
pub use scaler::ScalerState;
