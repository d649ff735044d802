//! Projection random forests: oblique and structured split sampling.
//!
//! Provides a hand-rolled random-forest classifier whose trees split on
//! sparse linear projections of the input rather than single feature
//! columns. The projection sampler is selected by a named
//! [`ProjectionMatrix`] variant: unstructured sparse oblique combinations,
//! contiguous image patches, vertex neighborhoods, or random edge sets.
//! Training is parallelized per tree via rayon; out-of-bag evaluation is
//! available on request.

mod config;
mod error;
mod forest;
mod node;
mod oob;
mod predict;
mod projection;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, ProjectionForestConfig};
pub use error::ForestError;
pub use forest::ProjectionForest;
pub use node::{Impurity, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::ClassDistribution;
pub use projection::{ImageGeometry, PatchBounds, Projection, ProjectionMatrix};
pub use result::{ForestFitResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
