/// Spreadsheet column letters for a 1-based column index: 1 → `A`, 27 → `AA`.
pub fn column_letter(column: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = column;

    while remaining > 0 {
        let offset = ((remaining - 1) % 26) as u8;
        letters.push((b'A' + offset) as char);
        remaining = (remaining - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// `A1`-style address for a 1-based (row, column) pair.
pub fn cell_address(row: u32, column: u32) -> String {
    format!("{}{}", column_letter(column), row)
}
