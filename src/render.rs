use crate::record::{CaseRecord, records_from_payload};
use crate::roc::format_roc_datetime;
use serde::Serialize;
use serde_json::Value;

/// Placeholder shown when the feed has no sessions to display.
pub const NO_DATA: &str = "<p>No data</p>";

const HEADERS: [&str; 6] = ["Date & time", "Sys", "Dpt", "Case", "Courtroom", "Type"];

/// A rendered table fragment together with the number of records in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTable {
    pub html: String,
    pub count: usize,
}

/// Escape text for embedding in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render session records as an HTML table, one row per record in input order.
///
/// `None` and an empty slice both render as [`NO_DATA`].
pub fn render_table(records: Option<&[CaseRecord]>) -> String {
    let records = match records {
        Some(records) if !records.is_empty() => records,
        _ => return NO_DATA.to_string(),
    };

    let mut html = String::from("<table>\n  <thead>\n    <tr>\n");
    for header in HEADERS {
        html.push_str(&format!("      <th>{}</th>\n", escape_html(header)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for record in records {
        html.push_str("    <tr>\n");
        for cell in row_cells(record) {
            html.push_str(&format!("      <td>{}</td>\n", escape_html(&cell)));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Render whatever record list a feed payload carries.
pub fn render_payload(payload: &Value) -> RenderedTable {
    let records = records_from_payload(payload);
    RenderedTable {
        html: render_table(records.as_deref()),
        count: records.map_or(0, |r| r.len()),
    }
}

fn row_cells(record: &CaseRecord) -> [String; 6] {
    let field = |f: &Option<String>| f.as_deref().unwrap_or("").to_string();

    // A partly missing case number still renders its separators, e.g. " -".
    [
        format_roc_datetime(record.dudt.as_deref(), record.dutm.as_deref()),
        field(&record.sys),
        field(&record.dpt),
        format!(
            "{} {}-{}",
            field(&record.crmyy),
            field(&record.crmid),
            field(&record.crmno)
        ),
        format!("{} / {}", field(&record.dunm), field(&record.ducd)),
        field(&record.dukd),
    ]
}
