//! CSV/TSV dataset loader with light cleaning.
//!
//! Cleaning runs in three passes over every column: Yes/No text becomes 1/0,
//! text that parses as numbers becomes numeric, and numeric gaps are filled
//! with the column median.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use statrs::statistics::{Data, Median};

/// Cell contents that count as missing after trimming. Same set pandas
/// treats as NA by default.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f32>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f32>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }
}

/// A cleaned, column-oriented dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    nrows: usize,
}

impl Table {
    /// Build a table from a header and string records, then clean it.
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let nrows = records.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name: name.trim().to_string(),
                data: ColumnData::Text(Vec::with_capacity(nrows)),
            })
            .collect();

        for record in records {
            for (idx, column) in columns.iter_mut().enumerate() {
                let cell = record.get(idx).map(|s| s.trim()).unwrap_or("");
                if let ColumnData::Text(values) = &mut column.data {
                    values.push(if MISSING_TOKENS.contains(&cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    });
                }
            }
        }

        let mut table = Table { columns, nrows };
        table.map_yes_no();
        table.coerce_numeric();
        table.impute_median();
        table
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn numeric_column(&self, name: &str) -> Option<&[Option<f32>]> {
        self.column(name).and_then(Column::as_numeric)
    }

    fn map_yes_no(&mut self) {
        for column in self.columns.iter_mut() {
            let ColumnData::Text(values) = &column.data else {
                continue;
            };
            let mut present = values.iter().flatten().peekable();
            if present.peek().is_none() {
                continue;
            }
            let all_yes_no = present.all(|v| {
                v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("no")
            });
            if !all_yes_no {
                continue;
            }
            let mapped = values
                .iter()
                .map(|cell| match cell {
                    Some(v) if v.eq_ignore_ascii_case("yes") => Some(1.0),
                    Some(v) if v.eq_ignore_ascii_case("no") => Some(0.0),
                    _ => None,
                })
                .collect();
            log::debug!("Mapped Yes/No column '{}' to 1/0", column.name);
            column.data = ColumnData::Numeric(mapped);
        }
    }

    fn coerce_numeric(&mut self) {
        for column in self.columns.iter_mut() {
            let ColumnData::Text(values) = &column.data else {
                continue;
            };
            let parsed: Option<Vec<Option<f32>>> = values
                .iter()
                .map(|cell| match cell {
                    // `inf` and `NAN` parse as floats but are gaps to impute
                    Some(v) => v
                        .parse::<f32>()
                        .ok()
                        .map(|n| Some(n).filter(|n| n.is_finite())),
                    None => Some(None),
                })
                .collect();
            match parsed {
                Some(numbers) => column.data = ColumnData::Numeric(numbers),
                None => log::debug!("Column '{}' left as text", column.name),
            }
        }
    }

    fn impute_median(&mut self) {
        for column in self.columns.iter_mut() {
            let ColumnData::Numeric(values) = &mut column.data else {
                continue;
            };
            let present: Vec<f64> = values.iter().flatten().map(|&v| v as f64).collect();
            let missing = values.len() - present.len();
            if missing == 0 || present.is_empty() {
                continue;
            }
            let median = Data::new(present).median() as f32;
            log::info!(
                "Imputed {} missing values in '{}' with median {}",
                missing,
                column.name,
                median
            );
            for cell in values.iter_mut() {
                if cell.is_none() {
                    *cell = Some(median);
                }
            }
        }
    }
}

/// Load and clean a dataset. Files ending in `.tsv` are tab separated,
/// everything else is read as CSV.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;
    read_table(BufReader::new(file), delimiter_for(path))
        .with_context(|| format!("Failed to load dataset: {}", path.display()))
}

fn delimiter_for(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::from_records(headers, records))
}
