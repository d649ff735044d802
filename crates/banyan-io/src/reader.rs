//! CSV dataset reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use banyan_embed::Sample;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{GraphDataset, SampleId};

/// Reads labeled square samples from a CSV file.
///
/// Expected CSV format:
/// - Header row required: `sample_id,label,a0,a1,...,a{n²-1}`
/// - One row per sample; the value columns are a row-major flattened
///   square matrix, so their count must be a perfect square
/// - Labels are arbitrary strings, mapped to zero-based class indices in
///   sorted order
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NonSquareSample`] | Value column count is not a perfect square |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable |
/// | [`IoError::DuplicateSampleId`] | Same sample_id appears twice |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`GraphDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<GraphDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) allows rows with varying column counts so that our
        // own InconsistentRowLength check fires instead of a low-level
        // CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let expected_cols = header.len();
        let n_cells = expected_cols.saturating_sub(2);
        let order = (n_cells as f64).sqrt().round() as usize;
        if n_cells == 0 || order * order != n_cells {
            return Err(IoError::NonSquareSample {
                path: self.path.clone(),
                n_cells,
            });
        }
        debug!(expected_cols, order, "read CSV header");

        let mut sample_ids = Vec::new();
        let mut raw_labels: Vec<String> = Vec::new();
        let mut samples = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                let sample_id = record.get(0).unwrap_or("").to_string();
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    sample_id,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let sample_id_str = record.get(0).unwrap_or("").to_string();
            if let Some(&first_row) = seen.get(&sample_id_str) {
                return Err(IoError::DuplicateSampleId {
                    path: self.path.clone(),
                    sample_id: sample_id_str,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(sample_id_str.clone(), row_index);

            let label = record.get(1).unwrap_or("").to_string();

            // Parse matrix values (columns 2..n).
            let mut values = Vec::with_capacity(n_cells);
            for col_index in 2..record.len() {
                let raw = record.get(col_index).unwrap_or("");
                let value: f64 = raw.parse().map_err(|_| IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    col_index: col_index - 2,
                    raw: raw.to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index: col_index - 2,
                        raw: raw.to_string(),
                    });
                }
                values.push(value);
            }

            // Shape and finiteness were validated above, so this cannot fail;
            // map any residual error to the dataset-level variant.
            let sample = Sample::square(values, order).map_err(|_| IoError::EmptyDataset {
                path: self.path.clone(),
            })?;

            sample_ids.push(SampleId::new(sample_id_str));
            raw_labels.push(label);
            samples.push(sample);
        }

        if sample_ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        // Map string labels to zero-based indices in sorted order.
        let mut class_names: Vec<String> = raw_labels.clone();
        class_names.sort();
        class_names.dedup();
        let class_index: HashMap<&str, usize> = class_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let labels: Vec<usize> = raw_labels
            .iter()
            .map(|name| class_index[name.as_str()])
            .collect();

        info!(
            n_samples = sample_ids.len(),
            n_classes = class_names.len(),
            order,
            "dataset loaded"
        );

        Ok(GraphDataset::new(sample_ids, class_names, samples, labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    const HEADER: &str = "sample_id,label,a0,a1,a2,a3";

    #[test]
    fn read_valid_2x2_samples() {
        let csv = format!(
            "{HEADER}\nG1,hot,0.0,1.0,1.0,0.0\nG2,cold,0.0,0.5,0.5,0.0\nG3,hot,0.0,1.1,1.1,0.0\n"
        );
        let f = write_csv(&csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.order(), 2);
        assert_eq!(ds.class_names(), ["cold", "hot"]);
        assert_eq!(ds.labels(), [1, 0, 1]);
        assert_eq!(ds.sample_ids()[0].as_str(), "G1");
        assert!((ds.samples()[0].get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn insertion_order_preserved() {
        let csv = format!("{HEADER}\nZZ,a,1,2,3,4\nAA,b,5,6,7,8\n");
        let f = write_csv(&csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.sample_ids()[0].as_str(), "ZZ");
        assert_eq!(ds.sample_ids()[1].as_str(), "AA");
    }

    #[test]
    fn error_file_not_found() {
        let result = DatasetReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv(&format!("{HEADER}\n"));
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_non_square_layout() {
        let csv = "sample_id,label,a0,a1,a2\nG1,x,1,2,3\n";
        let f = write_csv(csv);
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonSquareSample { n_cells: 3, .. })
        ));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let csv = format!("{HEADER}\nG1,x,1,2,3,4\nG2,x,1,2\n");
        let f = write_csv(&csv);
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, .. })
        ));
    }

    #[test]
    fn error_non_finite_values() {
        for bad in ["NaN", "Inf", "abc"] {
            let csv = format!("{HEADER}\nG1,x,1,2,{bad},4\n");
            let f = write_csv(&csv);
            let result = DatasetReader::new(f.path()).read();
            assert!(
                matches!(result, Err(IoError::NonFiniteValue { col_index: 2, .. })),
                "value {bad} accepted"
            );
        }
    }

    #[test]
    fn error_duplicate_sample_id() {
        let csv = format!("{HEADER}\nG1,x,1,2,3,4\nG2,x,1,2,3,4\nG1,x,5,6,7,8\n");
        let f = write_csv(&csv);
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateSampleId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }
}
