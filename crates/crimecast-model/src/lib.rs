//! Model layer: artifact loading, one-hot feature encoding, and gradient-boosted
//! tree evaluation behind a single [`Predictor`].

mod error;
pub use error::ModelError;

pub mod artifacts;
pub mod booster;
pub mod features;
pub mod predictor;

pub use artifacts::{ArtifactPaths, CategoryMap, ColumnList};
pub use booster::{Booster, Objective};
pub use features::FeatureEncoder;
pub use predictor::{Prediction, Predictor};
