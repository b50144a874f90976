//! Table and JSON rendering shared by the commands.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

/// A table with the house style and the given header row.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)));
    table
}

/// A right-aligned cell, for amounts and counts.
pub fn num(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Optional text, shown as `-` when absent.
pub fn opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_renders_rows() {
        let mut t = table(&["Name", "Amount"]);
        t.add_row(vec![Cell::new("Tea"), num("12.50")]);
        let rendered = t.to_string();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("12.50"));
    }

    #[test]
    fn test_opt() {
        assert_eq!(opt(None), "-");
        assert_eq!(opt(Some("x")), "x");
    }
}
