// src/process/mod.rs

pub mod normalize;
pub mod record;

pub use record::{FieldValue, Record};

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

/// Raw labels recognized on a detail page. Rows with any other label are
/// dropped. `cn / ln` is spelled the way the source spells it.
pub const FIELDS: &[&str] = &[
    "Date",
    "Time",
    "Location",
    "Operator",
    "Flight #",
    "Route",
    "AC Type",
    "Registration",
    "cn / ln",
    "Aboard",
    "Fatalities",
    "Ground",
    "Summary",
];

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract one crash record from a detail-page body.
///
/// The data sits in the single table matching the structural signature
/// `border="0" cellpadding="3"`; `None` means no such table, which the
/// caller treats the same as a missing page. Only two-cell rows count;
/// the label cell loses its trailing colon, the value cell is trimmed
/// text. An existing table with no recognized rows yields an empty
/// record (the page is consumed but contributes nothing).
pub fn extract_record(html: &str) -> Option<Record> {
    let table_sel = Selector::parse(r#"table[border="0"][cellpadding="3"]"#)
        .expect("CSS selector for the crash table should be valid");
    let row_sel = Selector::parse("tr").expect("tr selector should be valid");
    let cell_sel = Selector::parse("td").expect("td selector should be valid");

    let doc = Html::parse_document(html);
    let table = doc.select(&table_sel).next()?;

    let mut record = Record::new();
    for row in table.select(&row_sel) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() != 2 {
            continue;
        }
        let label = cell_text(&cells[0]);
        let label = label.trim_end_matches(':').trim_end();
        if !FIELDS.contains(&label) {
            trace!(label, "dropping unrecognized row");
            continue;
        }
        let value = cell_text(&cells[1]);
        for (name, field) in normalize::normalize_field(label, &value) {
            record.insert(name, field);
        }
    }

    Some(record)
}
