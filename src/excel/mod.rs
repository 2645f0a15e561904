pub mod address;
pub mod analyzer;
pub mod report;
pub mod workbook;

pub use address::{cell_address, column_letter};
pub use analyzer::{
    classify, AnalysisSummary, CellClass, FormulaEntry, InputEntry, SheetAnalysis, SheetSummary,
    SheetsDetail, StructureAnalyzer, WorkbookAnalysis,
};
pub use report::{render_report, render_sheet, summary_json};
pub use workbook::{CellValue, Grid, Sheet, Workbook};
