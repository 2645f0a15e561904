//! Plain-text rendering of a workbook analysis.

use crate::config::ExcelConfig;
use crate::error::Result;
use crate::excel::analyzer::{truncate_chars, AnalysisSummary, SheetAnalysis, WorkbookAnalysis};
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn summary_json(summary: &AnalysisSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// The full report: header, one section per sheet, then the JSON summary.
pub fn render_report(analysis: &WorkbookAnalysis, settings: &ExcelConfig) -> Result<String> {
    let mut out = String::new();
    let names = analysis.sheet_names();

    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "COMPREHENSIVE EXCEL ANALYSIS: {}", analysis.source);
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "\nTotal Sheets: {}", names.len());
    let _ = writeln!(out, "Sheet Names: {}\n", names.join(", "));

    for sheet in &analysis.sheets {
        out.push_str(&render_sheet(sheet, settings));
    }

    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "{}", summary_json(&analysis.summary())?);

    Ok(out)
}

pub fn render_sheet(sheet: &SheetAnalysis, settings: &ExcelConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(out, "SHEET: {}", sheet.name);
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(
        out,
        "Dimensions: {} rows x {} columns",
        sheet.max_row, sheet.max_column
    );

    let _ = writeln!(out, "\nFormula cells found: {}", sheet.formulas.len());
    let _ = writeln!(out, "Potential input cells: {}", sheet.inputs.len());
    let _ = writeln!(out, "Merged cell ranges: {}", sheet.merged_ranges);

    let _ = writeln!(out, "\nFirst {} rows preview:", settings.preview_rows);
    let _ = writeln!(out, "{}", light_rule());
    for (index, row) in sheet.preview.iter().enumerate() {
        let _ = writeln!(out, "Row {:2}: {}", index + 1, row.join(" | "));
    }

    if !sheet.formulas.is_empty() {
        let _ = writeln!(out, "\nSample formulas (first {}):", settings.formula_samples);
        let _ = writeln!(out, "{}", light_rule());
        for entry in sheet.formulas.iter().take(settings.formula_samples) {
            let _ = writeln!(
                out,
                "{}: {}",
                entry.cell,
                truncate_chars(&entry.formula, settings.formula_width)
            );
        }
    }

    let cross_refs = sheet.cross_reference_count();
    if cross_refs > 0 {
        let _ = writeln!(out, "\nCross-sheet references found: {}", cross_refs);
        let _ = writeln!(out, "Sample cross-sheet references:");
        for entry in sheet.cross_sheet_references().take(settings.cross_ref_samples) {
            let _ = writeln!(
                out,
                "  {}: {}",
                entry.cell,
                truncate_chars(&entry.formula, settings.cross_ref_width)
            );
        }
    }

    out
}
