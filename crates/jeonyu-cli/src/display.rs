//! Vertical card display for `--pretty`.
//!
//! Renders a payload as grouped key/value sections. Fields missing from a
//! payload are skipped, and so is a section with nothing to show.

use serde_json::Value;

const MAX_LIST_ITEMS: usize = 20;

const ADDRESS: &[&str] = &["input", "road", "jibun", "keys"];
const BUILDING: &[&str] = &["floors", "max_floor"];
const FLOOR: &[&str] = &["floor", "floor_pick", "floor_items"];
const UNITS: &[&str] = &["units", "note"];
const AREA: &[&str] = &[
    "unit",
    "area_m2",
    "area_pyeong",
    "source",
    "match_kind",
    "matched",
    "warning",
];
const DIAGNOSTICS: &[&str] = &["want_key", "unit_label_samples", "attempts"];
const FAILURE: &[&str] = &["status", "kind", "message"];
const STAMP: &[&str] = &["build", "generated_at"];

/// Render a payload as a card.
pub fn render_card(payload: &Value) -> String {
    let mut out = String::new();
    let mode = payload.get("mode").and_then(Value::as_str).unwrap_or("error");
    let ok = payload.get("ok").and_then(Value::as_bool).unwrap_or(false);
    out.push_str(&format!("=== {} ({}) ===\n\n", mode, if ok { "ok" } else { "failed" }));

    section(&mut out, payload, "Failure", FAILURE);
    section(&mut out, payload, "Address", ADDRESS);
    section(&mut out, payload, "Building", BUILDING);
    section(&mut out, payload, "Floor", FLOOR);
    section(&mut out, payload, "Units", UNITS);
    section(&mut out, payload, "Area", AREA);
    section(&mut out, payload, "Diagnostics", DIAGNOSTICS);
    section(&mut out, payload, "Build", STAMP);
    out
}

// ── Section rendering ──

fn section(out: &mut String, payload: &Value, header: &str, keys: &[&str]) {
    let present: Vec<(&str, &Value)> = keys
        .iter()
        .filter_map(|&k| payload.get(k).filter(|v| !v.is_null()).map(|v| (k, v)))
        .collect();
    if present.is_empty() {
        return;
    }

    out.push_str(header);
    out.push('\n');
    for (key, value) in present {
        match key {
            "floors" => line(out, key, &floor_labels(value)),
            "floor" => line(out, key, &scalar(value.get("label").unwrap_or(value))),
            "units" => unit_rows(out, value),
            "floor_items" => floor_item_rows(out, value),
            "floor_pick" => floor_pick(out, value),
            "attempts" => attempt_rows(out, value),
            "keys" | "matched" => object(out, key, value),
            _ => line(out, key, &scalar(value)),
        }
    }
    out.push('\n');
}

fn line(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("  {:<20} {}\n", key, value));
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn object(out: &mut String, key: &str, value: &Value) {
    let Some(map) = value.as_object() else {
        line(out, key, &scalar(value));
        return;
    };
    let parts: Vec<String> = map
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{k}={}", scalar(v)))
        .collect();
    line(out, key, &parts.join("  "));
}

fn floor_labels(value: &Value) -> String {
    value
        .as_array()
        .map(|floors| {
            floors
                .iter()
                .filter_map(|f| f.get("label").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn truncated(out: &mut String, len: usize) {
    if len > MAX_LIST_ITEMS {
        out.push_str(&format!("    ... and {} more\n", len - MAX_LIST_ITEMS));
    }
}

// ── Lists ──

fn floor_pick(out: &mut String, value: &Value) {
    let item = value.get("item").unwrap_or(&Value::Null);
    let area = value.get("area_m2").map(scalar).unwrap_or_else(|| "-".into());
    let pyeong = value.get("area_pyeong").map(scalar).unwrap_or_else(|| "-".into());
    line(
        out,
        "floor_pick",
        &format!("{area} m2 / {pyeong} py  {}", text(item, "usage_text")),
    );
}

fn floor_item_rows(out: &mut String, value: &Value) {
    let Some(items) = value.as_array() else {
        return;
    };
    out.push_str(&format!("  floor_items ({}):\n", items.len()));
    for item in items.iter().take(MAX_LIST_ITEMS) {
        out.push_str(&format!(
            "    {:<10} {:<24} {}\n",
            text(item, "area"),
            text(item, "usage_text"),
            text(item, "usage_detail_text"),
        ));
    }
    truncated(out, items.len());
}

fn unit_rows(out: &mut String, value: &Value) {
    let Some(units) = value.as_array() else {
        return;
    };
    out.push_str(&format!("  units ({}):\n", units.len()));
    for unit in units.iter().take(MAX_LIST_ITEMS) {
        let label = unit
            .get("label_variants")
            .and_then(|v| v.get(0))
            .and_then(Value::as_str)
            .unwrap_or_else(|| text(unit, "unit_key"));
        let exclusive = unit.get("exclusive_area_m2").map(scalar).unwrap_or_default();
        let shared = unit.get("shared_area_m2").map(scalar).unwrap_or_default();
        out.push_str(&format!(
            "    {:<12} exclusive {:<10} shared {}\n",
            label, exclusive, shared
        ));
    }
    truncated(out, units.len());
}

fn attempt_rows(out: &mut String, value: &Value) {
    let Some(attempts) = value.as_array() else {
        return;
    };
    out.push_str(&format!("  attempts ({}):\n", attempts.len()));
    for attempt in attempts {
        let mut row = format!("    {:<28} {}", text(attempt, "stage"), text(attempt, "reason"));
        if let Some(candidates) = attempt.get("candidates") {
            row.push_str(&format!(" [{}]", scalar(candidates)));
        }
        row.push('\n');
        out.push_str(&row);
    }
}
