use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Header of the company column in the feedback export.
pub const COMPANY_COLUMN: &str = "Name of The Company";
/// Header of the student column in the feedback export.
pub const STUDENT_COLUMN: &str = "Name of The Student";
/// Known spellings of the mentor column header. Some exports carry a
/// trailing space, so resolution tries each candidate in order.
pub const MENTOR_COLUMN_CANDIDATES: [&str; 2] =
    ["Faculty Mentor from VIIT", "Faculty Mentor from VIIT "];

#[derive(Debug)]
pub enum DatasetError {
    MissingColumn { candidates: Vec<String> },
    UnevenColumn { column: String, expected: usize, actual: usize },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DatasetError::MissingColumn { candidates } => {
                write!(
                    f,
                    "None of the expected columns are present: {}",
                    candidates.join(", ")
                )
            }
            DatasetError::UnevenColumn {
                column,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Column '{}' has {} cells, expected {}",
                    column, actual, expected
                )
            }
        }
    }
}

impl std::error::Error for DatasetError {}

/// In-memory columnar view of one uploaded feedback CSV.
///
/// Columns keep the order they appear in the header row, and every column
/// holds exactly one cell per record, so index `i` across all columns is
/// one logical feedback row. The dataset is built once per file and never
/// mutated; filtering produces a new dataset.
#[derive(Debug, Clone)]
pub struct FeedbackDataset {
    columns: Vec<String>,
    cells: HashMap<String, Vec<String>>,
    row_count: usize,
}

impl FeedbackDataset {
    /// Builds a dataset from (column, cells) pairs, rejecting ragged input.
    pub fn from_columns(
        pairs: Vec<(String, Vec<String>)>,
    ) -> Result<Self, DatasetError> {
        let row_count = pairs.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut columns = Vec::with_capacity(pairs.len());
        let mut cells = HashMap::with_capacity(pairs.len());
        for (name, values) in pairs {
            if values.len() != row_count {
                return Err(DatasetError::UnevenColumn {
                    column: name,
                    expected: row_count,
                    actual: values.len(),
                });
            }
            columns.push(name.clone());
            cells.insert(name, values);
        }
        Ok(Self {
            columns,
            cells,
            row_count,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> =
            csv_reader.headers()?.iter().map(String::from).collect();

        let mut values: Vec<Vec<String>> =
            headers.iter().map(|_| Vec::new()).collect();
        for record in csv_reader.records() {
            let record = record?;
            for (idx, cell) in record.iter().enumerate() {
                if idx < values.len() {
                    values[idx].push(cell.to_string());
                }
            }
        }

        let pairs = headers.into_iter().zip(values).collect();
        Ok(Self::from_columns(pairs)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} records with {} columns from {}",
            dataset.row_count,
            dataset.columns.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Cells of a column, or None when the header is absent.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.cells.get(name).map(|v| v.as_slice())
    }

    /// First candidate header that exists in this dataset.
    pub fn resolve_column<'a>(
        &self,
        candidates: &[&'a str],
    ) -> Result<&'a str, DatasetError> {
        candidates
            .iter()
            .find(|name| self.cells.contains_key(**name))
            .copied()
            .ok_or_else(|| DatasetError::MissingColumn {
                candidates: candidates.iter().map(|s| s.to_string()).collect(),
            })
    }

    /// Distinct cell values of a column, first occurrence first. An absent
    /// column yields an empty list so callers can degrade to an empty
    /// choice set.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for value in self.column(name).unwrap_or(&[]) {
            if seen.insert(value.clone()) {
                distinct.push(value.clone());
            }
        }
        distinct
    }

    /// Rows whose cell in `key_column` equals `target` exactly.
    ///
    /// Matching is byte-for-byte: no trimming, no case folding. Records
    /// whose key differs only in incidental whitespace are dropped, which
    /// matches what the summaries downstream have always been built on.
    /// All columns are kept and the original row order is preserved; an
    /// unknown target just produces an empty subset.
    pub fn filter(
        &self,
        key_column: &str,
        target: &str,
    ) -> Result<FeedbackDataset, DatasetError> {
        let keys = self.column(key_column).ok_or_else(|| {
            DatasetError::MissingColumn {
                candidates: vec![key_column.to_string()],
            }
        })?;

        let matching: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, value)| value.as_str() == target)
            .map(|(idx, _)| idx)
            .collect();

        let mut cells = HashMap::with_capacity(self.columns.len());
        for name in &self.columns {
            let source = &self.cells[name];
            let filtered: Vec<String> =
                matching.iter().map(|&idx| source[idx].clone()).collect();
            cells.insert(name.clone(), filtered);
        }

        Ok(FeedbackDataset {
            columns: self.columns.clone(),
            row_count: matching.len(),
            cells,
        })
    }

    /// Deterministic textual form embedded into prompts: each column on
    /// one line, in header order, cells rendered as a JSON string array.
    pub fn prompt_block(&self) -> String {
        let mut block = String::from("{\n");
        for name in &self.columns {
            let cells = serde_json::to_string(&self.cells[name])
                .unwrap_or_else(|_| "[]".to_string());
            block.push_str(&format!(
                "  {}: {},\n",
                serde_json::to_string(name).unwrap_or_default(),
                cells
            ));
        }
        block.push('}');
        block
    }
}
