use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

/// A borderless column: header text and whether values hug the right edge.
pub type Column<'a> = (&'a str, bool);

/// Render `rows` as whitespace-aligned columns, every line prefixed by `indent`.
///
/// Columns are two spaces apart and sized to their widest cell.
pub fn render_table<I>(columns: &[Column<'_>], rows: I, indent: &str) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|(name, _)| *name).collect::<Vec<_>>());

    for row in rows {
        table.add_row(row);
    }

    let last = columns.len().saturating_sub(1);
    for (i, (_, right)) in columns.iter().enumerate() {
        if let Some(column) = table.column_mut(i) {
            column.set_cell_alignment(if *right {
                CellAlignment::Right
            } else {
                CellAlignment::Left
            });
            column.set_padding((u16::from(i != 0), u16::from(i != last)));
        }
    }

    table
        .lines()
        .map(|line| format!("{indent}{}\n", line.trim_end()))
        .collect()
}
