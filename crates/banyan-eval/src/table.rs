//! Per-fold error table.

/// Cross-validation error table: one row per fold, one named column per
/// variant plus the embedding baseline.
#[derive(Debug, Clone)]
pub struct ErrorTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ErrorTable {
    pub(crate) fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<f64>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    /// Return the column names, in evaluation order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the rows, one per fold in generation order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of folds (rows).
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return one column's per-fold values by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Return the per-column means across folds.
    #[must_use]
    pub fn column_means(&self) -> Vec<f64> {
        if self.rows.is_empty() {
            return vec![0.0; self.columns.len()];
        }
        let n = self.rows.len() as f64;
        (0..self.columns.len())
            .map(|c| self.rows.iter().map(|row| row[c]).sum::<f64>() / n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorTable;

    fn make_table() -> ErrorTable {
        let mut table = ErrorTable::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![0.1, 0.5]);
        table.push_row(vec![0.3, 0.7]);
        table
    }

    #[test]
    fn shape_accessors() {
        let table = make_table();
        assert_eq!(table.n_folds(), 2);
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.columns(), ["a", "b"]);
    }

    #[test]
    fn column_lookup_by_name() {
        let table = make_table();
        let col = table.column("b").unwrap();
        assert_eq!(col, vec![0.5, 0.7]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn column_means() {
        let table = make_table();
        let means = table.column_means();
        assert!((means[0] - 0.2).abs() < 1e-12);
        assert!((means[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn empty_table_means_are_zero() {
        let table = ErrorTable::new(vec!["a".to_string()]);
        assert_eq!(table.column_means(), vec![0.0]);
    }
}
