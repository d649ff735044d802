//! JSON result writer for classification and sweep outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes evaluation results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_classify.json` and
/// `{experiment}_sweep.json`.
///
/// Takes primitives rather than result types, so the writer has no
/// dependency on the evaluation crates.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

#[derive(Serialize)]
struct ClassifyArtifact<'a> {
    experiment: &'a str,
    n_samples: usize,
    n_classes: usize,
    n_folds: usize,
    columns: &'a [String],
    rows: &'a [Vec<f64>],
    column_means: &'a [f64],
}

#[derive(Serialize)]
struct SweepArtifact<'a> {
    experiment: &'a str,
    n_samples: usize,
    n_folds: usize,
    variants: &'a [String],
    /// `folds[fold][variant]` is a probability matrix: one row per test
    /// sample, one column per class.
    folds: &'a [Vec<Vec<Vec<f64>>>],
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write an error table to `{experiment}_classify.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_classify(
        &self,
        n_samples: usize,
        n_classes: usize,
        columns: &[String],
        rows: &[Vec<f64>],
        column_means: &[f64],
    ) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_classify.json", self.experiment.as_str()));

        let artifact = ClassifyArtifact {
            experiment: self.experiment.as_str(),
            n_samples,
            n_classes,
            n_folds: rows.len(),
            columns,
            rows,
            column_means,
        };

        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "classification result written");
        Ok(())
    }

    /// Write per-fold probability matrices to `{experiment}_sweep.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_sweep(
        &self,
        n_samples: usize,
        variants: &[String],
        folds: &[Vec<Vec<Vec<f64>>>],
    ) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_sweep.json", self.experiment.as_str()));

        let artifact = SweepArtifact {
            experiment: self.experiment.as_str(),
            n_samples,
            n_folds: folds.len(),
            variants,
            folds,
        };

        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "sweep result written");
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).expect("serialization cannot fail");
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
