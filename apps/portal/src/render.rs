//! Text renderer for table view-models.
//!
//! The view-models in `torque_core::table` carry formatted strings only; this
//! module just lays them out with comfy-table.

use comfy_table::{Attribute, Cell, Table};
use torque_core::table::{TableBody, TableRow, TableView};

/// Renders one page, with the "Showing ..." line and pager below it.
pub fn render_page<R: TableRow>(view: &TableView<R>) -> String {
    let mut table = Table::new();
    table.set_header(
        R::HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    match &view.body {
        TableBody::Rows(rows) => {
            for row in rows {
                table.add_row(row.cells());
            }
        }
        TableBody::Placeholder(text) => {
            let mut cells = vec![Cell::new(text)];
            cells.extend((1..R::HEADERS.len()).map(|_| Cell::new("")));
            table.add_row(cells);
        }
    }

    format!("{}\n{}", table, pager_line(view))
}

fn pager_line<R>(view: &TableView<R>) -> String {
    let prev = if view.has_prev { "« prev" } else { "      " };
    let next = if view.has_next { "next »" } else { "" };
    format!(
        "{}   {} Page {} of {} {}",
        view.showing, prev, view.current_page, view.total_pages, next
    )
    .trim_end()
    .to_string()
}

/// Two-column label/value table (dashboard cards, invoice totals).
pub fn render_pairs<L: AsRef<str>, V: AsRef<str>>(title: &str, pairs: &[(L, V)]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    for (label, value) in pairs {
        table.add_row(vec![Cell::new(label.as_ref()), Cell::new(value.as_ref())]);
    }
    table.to_string()
}
