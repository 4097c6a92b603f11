//! HTML rendering for the country form page.

use std::fmt::Write as _;

use client_core::SnapshotMeta;
use shared::{
    domain::{FieldSlot, ProjectionFields},
    view::{RawViewInput, SortDirection},
};

/// Identifier of the `<pre>` holding the derived view, stable for test tooling.
pub(crate) const VIEW_TEST_ID: &str = "countries-test-id";

pub(crate) struct PageModel<'a> {
    pub(crate) fields: &'a ProjectionFields,
    pub(crate) controls: &'a RawViewInput,
    pub(crate) data_json: Option<&'a str>,
    pub(crate) meta: Option<&'a SnapshotMeta>,
}

pub(crate) fn render_page(model: &PageModel<'_>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>Countries</title></head>\n<body>\n<div>\n");
    render_fields_form(&mut html, model);
    render_view_controls(&mut html, model.controls);
    if let Some(data_json) = model.data_json {
        render_data(&mut html, data_json, model.meta);
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_fields_form(html: &mut String, model: &PageModel<'_>) {
    html.push_str("<form method=\"post\" action=\"/submit\">\n");
    for slot in FieldSlot::ALL {
        let name = slot.input_name();
        let _ = write!(
            html,
            "  <div>\n    <label for=\"{name}\">{label}</label>\n    <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n  </div>\n",
            label = slot.label(),
            value = escape_html(model.fields.get(slot)),
        );
    }
    // Carry the current view controls through the submission round trip.
    let controls = model.controls;
    for (name, value) in [
        ("search", &controls.search),
        ("population", &controls.population),
        ("sort", &controls.sort),
        ("limit", &controls.limit),
    ] {
        let _ = writeln!(
            html,
            "  <input type=\"hidden\" name=\"{name}\" value=\"{}\">",
            escape_html(value)
        );
    }
    html.push_str("  <button type=\"submit\">Submit</button>\n</form>\n");
}

fn render_view_controls(html: &mut String, controls: &RawViewInput) {
    let direction = SortDirection::from_token(&controls.sort);
    html.push_str("<form method=\"get\" action=\"/\">\n");
    let _ = write!(
        html,
        "  <div>\n    <label for=\"search\">Search Countries:</label>\n    <input type=\"text\" id=\"search\" name=\"search\" value=\"{}\">\n  </div>\n",
        escape_html(&controls.search)
    );
    let _ = write!(
        html,
        "  <div>\n    <label for=\"population\">Filter by Population (in millions):</label>\n    <input type=\"number\" id=\"population\" name=\"population\" step=\"any\" value=\"{}\">\n  </div>\n",
        escape_html(&controls.population)
    );
    html.push_str("  <div>\n    <label for=\"sort\">Sort Countries:</label>\n    <select id=\"sort\" name=\"sort\">\n");
    for (option, caption) in [
        (SortDirection::Ascending, "Ascending"),
        (SortDirection::Descending, "Descending"),
    ] {
        let selected = if option == direction { " selected" } else { "" };
        let _ = writeln!(
            html,
            "      <option value=\"{}\"{selected}>{caption}</option>",
            option.as_token()
        );
    }
    html.push_str("    </select>\n  </div>\n");
    let _ = write!(
        html,
        "  <div>\n    <label for=\"limit\">Record Limit:</label>\n    <input type=\"number\" id=\"limit\" name=\"limit\" min=\"0\" step=\"1\" value=\"{}\">\n  </div>\n",
        escape_html(&controls.limit)
    );
    html.push_str("  <button type=\"submit\">Apply</button>\n</form>\n");
}

fn render_data(html: &mut String, data_json: &str, meta: Option<&SnapshotMeta>) {
    html.push_str("<div>\n  <h3>Fetched Data</h3>\n");
    if let Some(meta) = meta {
        let _ = writeln!(
            html,
            "  <p>{} records for fields <code>{}</code>, fetched {}</p>",
            meta.count,
            escape_html(&meta.fields.joined()),
            meta.fetched_at.to_rfc3339()
        );
    }
    let _ = writeln!(
        html,
        "  <pre data-testid=\"{VIEW_TEST_ID}\">{}</pre>",
        escape_html(data_json)
    );
    html.push_str("</div>\n");
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
