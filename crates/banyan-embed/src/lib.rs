//! Joint spectral embedding and nearest-neighbor classification.
//!
//! Provides the validated square [`Sample`] type, a joint spectral
//! embedding that places a stack of adjacency-like samples into one shared
//! low-dimensional score space (dimension selected automatically by a
//! profile-likelihood elbow), and the brute-force k-NN classifier used on
//! top of it. All numerics are deterministic.

mod dimension;
mod eigen;
mod error;
mod joint;
mod knn;
mod sample;

pub use error::EmbedError;
pub use joint::{JointEmbedding, JointEmbeddingConfig};
pub use knn::{FittedNeighbors, NearestNeighbors};
pub use sample::Sample;
