//! Domain types for banyan-io.

use banyan_embed::Sample;

use crate::IoError;

/// A sample identifier from the first column of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleId(String);

impl SampleId {
    pub(crate) fn new(id: String) -> Self {
        debug_assert!(!id.is_empty(), "sample ID must not be empty");
        Self(id)
    }

    /// Return the sample ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labeled dataset of square samples, as read from CSV.
///
/// Sample IDs, samples, and labels are index-aligned parallel vectors;
/// `labels[i]` indexes into `class_names`.
#[derive(Debug)]
pub struct GraphDataset {
    sample_ids: Vec<SampleId>,
    class_names: Vec<String>,
    samples: Vec<Sample>,
    labels: Vec<usize>,
}

impl GraphDataset {
    pub(crate) fn new(
        sample_ids: Vec<SampleId>,
        class_names: Vec<String>,
        samples: Vec<Sample>,
        labels: Vec<usize>,
    ) -> Self {
        Self {
            sample_ids,
            class_names,
            samples,
            labels,
        }
    }

    /// Return the sample IDs in insertion order.
    #[must_use]
    pub fn sample_ids(&self) -> &[SampleId] {
        &self.sample_ids
    }

    /// Return the sorted class names; label `i` names `class_names()[i]`.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Return the samples in insertion order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Return the zero-based labels, parallel to `samples()`.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Return the sample order (height = width of every sample).
    #[must_use]
    pub fn order(&self) -> usize {
        self.samples.first().map_or(0, |s| s.height())
    }
}
