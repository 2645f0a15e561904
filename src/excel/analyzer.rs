use crate::config::ExcelConfig;
use crate::excel::address::cell_address;
use crate::excel::workbook::{CellValue, Sheet, Workbook};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const FORMULA_MARKER: &str = "[FORMULA]";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaEntry {
    pub cell: String,
    pub formula: String,
    pub result: Option<CellValue>,
}

impl FormulaEntry {
    /// Formulas addressing another sheet use the `Sheet!A1` qualifier.
    pub fn is_cross_sheet(&self) -> bool {
        self.formula.contains('!')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputEntry {
    pub cell: String,
    pub value: CellValue,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Every non-empty cell is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellClass<'a> {
    Formula(&'a str),
    Input(&'a CellValue),
}

pub fn classify(value: &CellValue) -> CellClass<'_> {
    match value.as_formula() {
        Some(formula) => CellClass::Formula(formula),
        None => CellClass::Input(value),
    }
}

#[derive(Debug, Clone)]
pub struct SheetAnalysis {
    pub name: String,
    pub max_row: u32,
    pub max_column: u32,
    pub rows_scanned: u32,
    pub merged_ranges: usize,
    pub formulas: Vec<FormulaEntry>,
    pub inputs: Vec<InputEntry>,
    pub preview: Vec<Vec<String>>,
}

impl SheetAnalysis {
    pub fn cross_sheet_references(&self) -> impl Iterator<Item = &FormulaEntry> {
        self.formulas.iter().filter(|entry| entry.is_cross_sheet())
    }

    pub fn cross_reference_count(&self) -> usize {
        self.cross_sheet_references().count()
    }

    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.max_row, self.max_column)
    }

    pub fn summary(&self) -> SheetSummary {
        SheetSummary {
            dimensions: self.dimensions(),
            formula_count: self.formulas.len(),
            input_count: self.inputs.len(),
            has_cross_refs: self.cross_reference_count() > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub dimensions: String,
    pub formula_count: usize,
    pub input_count: usize,
    pub has_cross_refs: bool,
}

/// Per-sheet summaries serialized as a JSON object in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetsDetail(pub Vec<(String, SheetSummary)>);

impl SheetsDetail {
    pub fn get(&self, name: &str) -> Option<&SheetSummary> {
        self.0
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, summary)| summary)
    }
}

impl Serialize for SheetsDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, summary) in &self.0 {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_sheets: usize,
    pub sheet_names: Vec<String>,
    pub sheets_detail: SheetsDetail,
}

#[derive(Debug, Clone)]
pub struct WorkbookAnalysis {
    pub source: String,
    pub sheets: Vec<SheetAnalysis>,
}

impl WorkbookAnalysis {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            total_sheets: self.sheets.len(),
            sheet_names: self.sheet_names(),
            sheets_detail: SheetsDetail(
                self.sheets
                    .iter()
                    .map(|sheet| (sheet.name.clone(), sheet.summary()))
                    .collect(),
            ),
        }
    }
}

pub struct StructureAnalyzer {
    settings: ExcelConfig,
}

impl StructureAnalyzer {
    pub fn new(settings: ExcelConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExcelConfig {
        &self.settings
    }

    pub fn analyze(&self, source: &str, workbook: &Workbook) -> WorkbookAnalysis {
        WorkbookAnalysis {
            source: source.to_string(),
            sheets: workbook
                .sheets()
                .iter()
                .map(|sheet| self.analyze_sheet(sheet))
                .collect(),
        }
    }

    /// Classifies every non-empty cell in the first `row_limit` rows and
    /// builds the top-left preview.
    pub fn analyze_sheet(&self, sheet: &Sheet) -> SheetAnalysis {
        let max_row = sheet.max_row();
        let max_column = sheet.max_column();
        let rows_scanned = max_row.min(self.settings.row_limit);

        let mut formulas = Vec::new();
        let mut inputs = Vec::new();

        for row in 1..=rows_scanned {
            for column in 1..=max_column {
                let Some(value) = sheet.cell(row, column) else {
                    continue;
                };

                match classify(value) {
                    CellClass::Formula(formula) => formulas.push(FormulaEntry {
                        cell: cell_address(row, column),
                        formula: formula.to_string(),
                        result: sheet.computed(row, column).cloned(),
                    }),
                    CellClass::Input(value) => inputs.push(InputEntry {
                        cell: cell_address(row, column),
                        value: value.clone(),
                        type_name: value.type_name().to_string(),
                    }),
                }
            }
        }

        if rows_scanned < max_row {
            tracing::info!(
                "sheet {}: scanning the first {} of {} rows",
                sheet.name(),
                rows_scanned,
                max_row
            );
        }

        tracing::debug!(
            "sheet {}: {} formulas, {} inputs in {} rows",
            sheet.name(),
            formulas.len(),
            inputs.len(),
            rows_scanned
        );

        SheetAnalysis {
            name: sheet.name().to_string(),
            max_row,
            max_column,
            rows_scanned,
            merged_ranges: sheet.merged_ranges(),
            formulas,
            inputs,
            preview: self.preview(sheet),
        }
    }

    fn preview(&self, sheet: &Sheet) -> Vec<Vec<String>> {
        let rows = sheet.max_row().min(self.settings.preview_rows);
        let columns = sheet.max_column().min(self.settings.preview_cols);

        (1..=rows)
            .map(|row| {
                (1..=columns)
                    .map(|column| match sheet.cell(row, column).map(classify) {
                        None => String::new(),
                        Some(CellClass::Formula(_)) => FORMULA_MARKER.to_string(),
                        Some(CellClass::Input(value)) => {
                            truncate_chars(&value.to_string(), self.settings.preview_value_width)
                                .to_string()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self::new(ExcelConfig::default())
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_sheet() -> Sheet {
        let mut sheet = Sheet::new("Budget");
        sheet.set_value(1, 1, CellValue::Int(3));
        sheet.set_formula(2, 2, "=A1+1", Some(CellValue::Int(5)));
        sheet
    }

    #[test]
    fn test_formula_and_input_classification() {
        let analysis = StructureAnalyzer::default().analyze_sheet(&budget_sheet());

        assert_eq!(
            analysis.formulas,
            vec![FormulaEntry {
                cell: "B2".to_string(),
                formula: "=A1+1".to_string(),
                result: Some(CellValue::Int(5)),
            }]
        );
        assert_eq!(
            analysis.inputs,
            vec![InputEntry {
                cell: "A1".to_string(),
                value: CellValue::Int(3),
                type_name: "int".to_string(),
            }]
        );
    }

    #[test]
    fn test_counts_cover_every_non_empty_cell_once() {
        let mut sheet = Sheet::new("Mixed");
        let mut non_empty = 0;
        for row in 1..=12u32 {
            for column in 1..=6u32 {
                match (row * column) % 4 {
                    0 => continue,
                    1 => sheet.set_formula(row, column, "B1*2", None),
                    2 => sheet.set_value(row, column, CellValue::Text(format!("r{}c{}", row, column))),
                    _ => sheet.set_value(row, column, CellValue::Float(row as f64 / 3.0)),
                }
                non_empty += 1;
            }
        }

        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        assert_eq!(analysis.formulas.len() + analysis.inputs.len(), non_empty);

        let mut cells: Vec<&str> = analysis
            .formulas
            .iter()
            .map(|f| f.cell.as_str())
            .chain(analysis.inputs.iter().map(|i| i.cell.as_str()))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), non_empty);
    }

    #[test]
    fn test_literal_equals_string_is_a_formula() {
        let mut sheet = Sheet::new("Notes");
        sheet.set_value(1, 1, CellValue::Text("=not really".to_string()));
        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        assert_eq!(analysis.formulas.len(), 1);
        assert_eq!(analysis.formulas[0].result, Some(CellValue::Text("=not really".into())));
    }

    #[test]
    fn test_row_cap() {
        let mut sheet = Sheet::new("Long");
        for row in 1..=150 {
            sheet.set_value(row, 1, CellValue::Int(row as i64));
        }

        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        assert_eq!(analysis.rows_scanned, 100);
        assert_eq!(analysis.inputs.len(), 100);
        assert_eq!(analysis.inputs.last().unwrap().cell, "A100");
        assert_eq!(analysis.dimensions(), "150x1");
    }

    #[test]
    fn test_reported_bounds_limit_the_scan() {
        let mut sheet = Sheet::new("Clipped");
        sheet.set_value(1, 1, CellValue::Int(1));
        sheet.set_value(5, 5, CellValue::Int(2));
        let sheet = sheet.with_bounds(3, 3);

        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        assert_eq!(analysis.rows_scanned, 3);
        assert_eq!(analysis.inputs.len(), 1);
        assert_eq!(analysis.dimensions(), "3x3");
    }

    #[test]
    fn test_custom_row_limit() {
        let mut sheet = Sheet::new("Short");
        for row in 1..=10 {
            sheet.set_value(row, 1, CellValue::Int(1));
        }
        let settings = ExcelConfig {
            row_limit: 4,
            ..ExcelConfig::default()
        };

        let analysis = StructureAnalyzer::new(settings).analyze_sheet(&sheet);
        assert_eq!(analysis.inputs.len(), 4);
    }

    #[test]
    fn test_cross_sheet_references() {
        let mut sheet = Sheet::new("Schedule");
        sheet.set_formula(1, 1, "Inputs!B4*2", Some(CellValue::Int(8)));
        sheet.set_formula(1, 2, "A1+1", Some(CellValue::Int(9)));
        sheet.set_formula(1, 3, "SUM('Cost Data'!A1:A9)", None);

        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        let refs: Vec<&str> = analysis
            .cross_sheet_references()
            .map(|f| f.cell.as_str())
            .collect();

        assert_eq!(refs, vec!["A1", "C1"]);
        assert!(analysis.cross_reference_count() <= analysis.formulas.len());
        assert!(analysis.summary().has_cross_refs);
    }

    #[test]
    fn test_preview() {
        let mut sheet = budget_sheet();
        sheet.set_value(1, 2, CellValue::Text("A very long label that keeps going".to_string()));
        sheet.set_value(1, 12, CellValue::Int(99));

        let analysis = StructureAnalyzer::default().analyze_sheet(&sheet);
        assert_eq!(analysis.preview.len(), 2);
        assert_eq!(analysis.preview[0].len(), 10);
        assert_eq!(analysis.preview[0][0], "3");
        assert_eq!(analysis.preview[0][1], "A very long label th");
        assert_eq!(analysis.preview[1][0], "");
        assert_eq!(analysis.preview[1][1], FORMULA_MARKER);
    }

    #[test]
    fn test_summary_preserves_sheet_order() {
        let workbook = Workbook::from_sheets(vec![
            budget_sheet(),
            Sheet::new("Appendix"),
        ]);
        let analysis = StructureAnalyzer::default().analyze("budget.xlsx", &workbook);
        let summary = analysis.summary();

        assert_eq!(summary.total_sheets, 2);
        assert_eq!(summary.sheet_names, vec!["Budget", "Appendix"]);

        let budget = summary.sheets_detail.get("Budget").unwrap();
        assert_eq!(budget.dimensions, "2x2");
        assert_eq!(budget.formula_count, 1);
        assert_eq!(budget.input_count, 1);
        assert!(!budget.has_cross_refs);

        let json = serde_json::to_string(&summary).unwrap();
        let budget_at = json.find("\"Budget\":").unwrap();
        let appendix_at = json.find("\"Appendix\":").unwrap();
        assert!(budget_at < appendix_at);
        assert!(json.contains("\"dimensions\":\"1x1\""));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 20), "hi");
        assert_eq!(truncate_chars("Größe über", 4), "Größ");
    }
}
