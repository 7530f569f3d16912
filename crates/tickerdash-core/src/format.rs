//! Display formatting for table cells and summary cards.

use rust_decimal::{Decimal, RoundingStrategy};

/// Direction of a change value, used to pick the cell colour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn of(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self::Up
        } else if value < Decimal::ZERO {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// CSS-style class name for the trend.
    pub fn class(self) -> &'static str {
        match self {
            Self::Up => "positive",
            Self::Down => "negative",
            Self::Flat => "neutral",
        }
    }
}

/// Format as US dollars with thousands separators, e.g. `-$1,234.50`.
pub fn format_currency(value: Decimal) -> String {
    let sign = if round(value, 2) < Decimal::ZERO {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", fixed(value.abs(), 2))
}

/// Format a percentage with an explicit sign, e.g. `+1.25%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = round(value, 2);
    let sign = if rounded > Decimal::ZERO {
        "+"
    } else if rounded < Decimal::ZERO {
        "-"
    } else {
        ""
    };
    format!("{sign}{}%", fixed(rounded.abs(), 2))
}

/// Format with thousands separators and a fixed number of decimals.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let sign = if round(value, decimals) < Decimal::ZERO {
        "-"
    } else {
        ""
    };
    format!("{sign}{}", fixed(value.abs(), decimals))
}

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Non-negative value rounded and zero-padded to `decimals`, integer part grouped.
fn fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded = round(value, decimals);
    rounded.rescale(decimals);
    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let grouped = group_thousands(int_part);
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
