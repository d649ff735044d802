//! File I/O and validation for the banyan pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, GraphDataset, SampleId};
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::ResultWriter;
