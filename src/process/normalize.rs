// src/process/normalize.rs

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::record::FieldValue;

/// The source marks unknown values with a literal question mark.
const UNKNOWN: &str = "?";

static BARE_CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,4}$").unwrap());
static LEADING_TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)").unwrap());
static PASSENGERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"passengers:([\d?]+)").unwrap());
static CREW: Lazy<Regex> = Lazy::new(|| Regex::new(r"crew:([\d?]+)").unwrap());

/// Normalize a raw time cell to `HH:MM` (24-hour).
///
/// Three accepted shapes, tried in order:
/// 1. a bare 3-4 digit clock like `1600` or `400`, zero-padded and split
///    without range validation (the source sometimes carries `2500`-style
///    typos and they pass through as-is);
/// 2. a 12-hour time with meridiem, `4:00 PM`;
/// 3. a direct 24-hour `HH:MM`.
///
/// `"?"`, empty, and anything else return `None`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN {
        return None;
    }
    let upper = trimmed.to_uppercase();

    if BARE_CLOCK.is_match(&upper) {
        let padded = if upper.len() == 3 {
            format!("0{}", upper)
        } else {
            upper
        };
        return Some(format!("{}:{}", &padded[..2], &padded[2..]));
    }

    if let Ok(t) = NaiveTime::parse_from_str(&upper, "%I:%M %p") {
        return Some(t.format("%H:%M").to_string());
    }
    NaiveTime::parse_from_str(&upper, "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// A total plus a passengers/crew breakdown, each independently possibly
/// unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountTriple {
    pub total: Option<u32>,
    pub passengers: Option<u32>,
    pub crew: Option<u32>,
}

fn sub_count(re: &Regex, text: &str) -> Option<u32> {
    let captured = re.captures(text)?.get(1)?.as_str();
    if captured == UNKNOWN {
        return None;
    }
    captured.parse().ok()
}

/// Parse a casualty cell like `7 (passengers:6 crew:1)`.
///
/// The leading integer is the total; the parenthesized sub-counts are
/// searched for anywhere in the text, independently of each other. Text
/// that matches none of the patterns (including a bare `"?"`) yields
/// all-`None` with no error signal.
pub fn parse_count_triple(raw: &str) -> CountTriple {
    let text = raw.trim();
    CountTriple {
        total: LEADING_TOTAL
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        passengers: sub_count(&PASSENGERS, text),
        crew: sub_count(&CREW, text),
    }
}

fn count_field(value: Option<u32>) -> FieldValue {
    value.map_or(FieldValue::Null, FieldValue::Int)
}

/// Normalize one recognized (label, raw value) pair into its typed output
/// fields. Time yields one field, the casualty labels fan out into three
/// suffixed fields, and everything else is the sentinel mapping: `"?"` →
/// null, otherwise the trimmed text verbatim.
pub fn normalize_field(label: &str, raw: &str) -> Vec<(String, FieldValue)> {
    match label {
        "Time" => {
            let value = normalize_time(raw).map_or(FieldValue::Null, FieldValue::Text);
            vec![(label.to_string(), value)]
        }
        "Aboard" | "Fatalities" => {
            let triple = parse_count_triple(raw);
            vec![
                (format!("{} Total", label), count_field(triple.total)),
                (format!("{} Passengers", label), count_field(triple.passengers)),
                (format!("{} Crew", label), count_field(triple.crew)),
            ]
        }
        _ => {
            let trimmed = raw.trim();
            let value = if trimmed == UNKNOWN {
                FieldValue::Null
            } else {
                FieldValue::Text(trimmed.to_string())
            };
            vec![(label.to_string(), value)]
        }
    }
}
