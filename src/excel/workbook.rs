//! Workbook loading.
//!
//! A workbook is read into two views per sheet: the formula view, where
//! formula cells hold their `=`-prefixed text, and the value view, where they
//! hold the last computed result cached in the file. Both views share the
//! sheet order and the reported bounds.

use crate::error::{DocToolsError, Result};
use calamine::{open_workbook, Data, DataType, Range, Reader, Xlsx, XlsxError};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// A non-empty cell value, typed the way the analyzer reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(String),
    Duration(String),
}

impl CellValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Text(_) => "str",
            CellValue::Bool(_) => "bool",
            CellValue::DateTime(_) => "datetime",
            CellValue::Duration(_) => "timedelta",
        }
    }

    /// Formula text when this is a string starting with `=`.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) if text.starts_with('=') => Some(text),
            _ => None,
        }
    }

    fn from_data(data: &Data) -> Option<Self> {
        let value = match data {
            Data::Empty => return None,
            Data::Int(i) => CellValue::Int(*i),
            // Whole numbers are stored as floats; report them as integers.
            Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                CellValue::Int(*f as i64)
            }
            Data::Float(f) => CellValue::Float(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(_) => CellValue::DateTime(
                data.as_datetime()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| data.to_string()),
            ),
            Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
            Data::DurationIso(s) => CellValue::Duration(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            #[allow(unreachable_patterns)]
            _ => CellValue::Text(data.to_string()),
        };
        Some(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) | CellValue::DateTime(s) | CellValue::Duration(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// Sparse cell storage keyed by 1-based (row, column).
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: HashMap<(u32, u32), CellValue>,
}

impl Grid {
    pub fn get(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.cells.get(&(row, column))
    }

    pub fn insert(&mut self, row: u32, column: u32, value: CellValue) {
        self.cells.insert((row, column), value);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn from_values(range: &Range<Data>) -> Self {
        let mut grid = Grid::default();
        let (row0, col0) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            if let Some(value) = CellValue::from_data(data) {
                grid.insert(row0 + row as u32 + 1, col0 + col as u32 + 1, value);
            }
        }
        grid
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    max_row: u32,
    max_column: u32,
    formulas: Grid,
    values: Grid,
    merged_ranges: usize,
}

impl Sheet {
    /// An empty sheet reports 1x1, like spreadsheet software does.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            max_row: 1,
            max_column: 1,
            formulas: Grid::default(),
            values: Grid::default(),
            merged_ranges: 0,
        }
    }

    pub fn with_bounds(mut self, max_row: u32, max_column: u32) -> Self {
        self.max_row = max_row;
        self.max_column = max_column;
        self
    }

    pub fn with_merged_ranges(mut self, count: usize) -> Self {
        self.merged_ranges = count;
        self
    }

    /// Stores a literal value in both views.
    pub fn set_value(&mut self, row: u32, column: u32, value: CellValue) {
        self.grow_to(row, column);
        self.formulas.insert(row, column, value.clone());
        self.values.insert(row, column, value);
    }

    /// Stores formula text in the formula view and its cached result, if
    /// any, in the value view.
    pub fn set_formula(&mut self, row: u32, column: u32, formula: &str, result: Option<CellValue>) {
        self.grow_to(row, column);
        self.formulas
            .insert(row, column, CellValue::Text(normalize_formula(formula)));
        if let Some(result) = result {
            self.values.insert(row, column, result);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    pub fn merged_ranges(&self) -> usize {
        self.merged_ranges
    }

    /// Cell as seen with formulas preserved.
    pub fn cell(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.formulas.get(row, column)
    }

    /// Cell as seen with formulas replaced by their cached results.
    pub fn computed(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.values.get(row, column)
    }

    fn grow_to(&mut self, row: u32, column: u32) {
        self.max_row = self.max_row.max(row);
        self.max_column = self.max_column.max(column);
    }

    fn from_ranges(name: &str, values: &Range<Data>, formulas: &Range<String>, merged: usize) -> Self {
        let value_grid = Grid::from_values(values);
        let mut formula_grid = value_grid.clone();

        let (row0, col0) = formulas.start().unwrap_or((0, 0));
        for (row, col, text) in formulas.used_cells() {
            if text.is_empty() {
                continue;
            }
            formula_grid.insert(
                row0 + row as u32 + 1,
                col0 + col as u32 + 1,
                CellValue::Text(normalize_formula(text)),
            );
        }

        let end = [values.end(), formulas.end()]
            .into_iter()
            .flatten()
            .fold((0, 0), |acc, (row, col)| (acc.0.max(row), acc.1.max(col)));

        Self {
            name: name.to_string(),
            max_row: end.0 + 1,
            max_column: end.1 + 1,
            formulas: formula_grid,
            values: value_grid,
            merged_ranges: merged,
        }
    }
}

fn normalize_formula(formula: &str) -> String {
    if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let workbook_error = |e: XlsxError| DocToolsError::Workbook {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_error)?;

        let sheet_names = workbook.sheet_names().to_owned();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for name in &sheet_names {
            let values = workbook.worksheet_range(name).map_err(workbook_error)?;
            let formulas = workbook.worksheet_formula(name).map_err(workbook_error)?;
            let merged = match workbook.worksheet_merge_cells(name) {
                Some(regions) => regions.map_err(workbook_error)?.len(),
                None => 0,
            };

            let sheet = Sheet::from_ranges(name, &values, &formulas, merged);
            tracing::debug!(
                "loaded sheet {} ({}x{}, {} merged ranges)",
                name,
                sheet.max_row,
                sheet.max_column,
                merged
            );
            sheets.push(sheet);
        }

        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| DocToolsError::SheetNotFound {
                name: name.to_string(),
            })
    }
}
