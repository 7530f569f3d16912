//! Cell renderers and column helpers shared by the managers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tickerdash_core::{format_currency, format_number, format_percent, Trend};

use crate::surface::{Cell, Column};

/// `change_percent` -> `Change %`, `purchase_price` -> `Purchase Price`.
pub fn column_title(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| match word {
            "percent" | "pct" => "%".to_string(),
            _ => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn column(field: &str) -> Column {
    Column {
        field: field.to_string(),
        title: column_title(field),
    }
}

pub fn columns(fields: &[&str]) -> Vec<Column> {
    fields.iter().map(|f| column(f)).collect()
}

pub fn currency(value: Decimal) -> Cell {
    Cell::text(format_currency(value))
}

/// Currency colored by sign.
pub fn currency_change(value: Decimal) -> Cell {
    Cell::styled(format_currency(value), Trend::of(value).class())
}

/// Percent colored by sign.
pub fn percent(value: Decimal) -> Cell {
    Cell::styled(format_percent(value), Trend::of(value).class())
}

pub fn number(value: Decimal, decimals: u32) -> Cell {
    Cell::text(format_number(value, decimals))
}

pub fn date(value: NaiveDate) -> Cell {
    Cell::text(value.format("%Y-%m-%d").to_string())
}

pub fn timestamp(value: DateTime<Utc>) -> Cell {
    Cell::text(value.format("%Y-%m-%d %H:%M").to_string())
}

/// Render `Some` with `f`, `None` as an empty cell.
pub fn optional<T>(value: Option<T>, f: impl FnOnce(T) -> Cell) -> Cell {
    value.map(f).unwrap_or_else(Cell::empty)
}
