//! Backend payload types.
//!
//! These mirror the JSON documents served by the tracking backend. The client
//! never owns any of this state: every record is fetched, displayed, and
//! refetched after a write.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Latest quote for a tracked stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub change: Option<Decimal>,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A holding in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub id: i64,
    pub symbol: String,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl PortfolioPosition {
    /// Amount paid for the position.
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.purchase_price
    }

    /// Current value, falling back to cost basis when no quote is known.
    pub fn market_value(&self) -> Decimal {
        self.current_price
            .map(|px| self.quantity * px)
            .unwrap_or_else(|| self.cost_basis())
    }

    /// Unrealized gain in currency.
    pub fn gain(&self) -> Decimal {
        self.market_value() - self.cost_basis()
    }

    /// Unrealized gain as a percentage of cost basis.
    pub fn gain_percent(&self) -> Option<Decimal> {
        let basis = self.cost_basis();
        if basis.is_zero() {
            None
        } else {
            Some(self.gain() / basis * Decimal::ONE_HUNDRED)
        }
    }
}

/// Body of a "add position" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosition {
    pub symbol: String,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
}

/// Partial update of a position. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
}

/// A received or announced dividend payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub symbol: String,
    #[serde(default)]
    pub ex_date: Option<NaiveDate>,
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
    /// Amount per share.
    pub amount: Decimal,
    #[serde(default)]
    pub shares: Option<Decimal>,
}

impl Dividend {
    /// Total payout (amount x shares), if the share count is known.
    pub fn total(&self) -> Option<Decimal> {
        self.shares.map(|s| s * self.amount)
    }
}

/// Unit a KPI value is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiUnit {
    Currency,
    Percent,
    #[default]
    Number,
}

/// A key performance indicator computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub value: Decimal,
    #[serde(default)]
    pub unit: KpiUnit,
    #[serde(default)]
    pub change: Option<Decimal>,
}

/// Event produced by the drainer analysis job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainerEvent {
    pub symbol: String,
    pub detected_at: DateTime<Utc>,
    pub event_type: String,
    #[serde(default)]
    pub magnitude: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Direction in which a price alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            other => Err(CoreError::InvalidValue {
                field: "condition",
                reason: format!("expected 'above' or 'below', got '{other}'"),
            }),
        }
    }
}

/// A price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub symbol: String,
    pub target_price: Decimal,
    pub condition: AlertCondition,
}

/// Body of a "create alert" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub symbol: String,
    pub target_price: Decimal,
    pub condition: AlertCondition,
}

impl NewAlert {
    /// Validate user input before it is sent to the backend.
    ///
    /// Normalizes the symbol to upper case.
    pub fn validated(mut self) -> crate::Result<Self> {
        self.symbol = self.symbol.trim().to_ascii_uppercase();
        if self.symbol.is_empty() {
            return Err(CoreError::InvalidValue {
                field: "symbol",
                reason: "symbol is required".to_string(),
            });
        }
        if self.target_price <= Decimal::ZERO {
            return Err(CoreError::InvalidValue {
                field: "target_price",
                reason: "target price must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }
}

/// A news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// State of the backend data-collection bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    pub running: bool,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Daily closing price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingPrice {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
}

/// A scheduled maintenance task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of a "create maintenance task" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceTask {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// One line of the backend log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
    pub message: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

/// Acknowledgement returned when the backend starts an asynchronous job.
///
/// Progress and completion arrive later on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Column selection for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPreference {
    /// Every field the backend can provide, in canonical order.
    #[serde(default)]
    pub all: Vec<String>,
    /// Fields to render, in display order.
    #[serde(default)]
    pub visible: Vec<String>,
}

impl ColumnPreference {
    pub fn new(all: Vec<String>, visible: Vec<String>) -> Self {
        Self { all, visible }
    }

    /// Visible fields that the backend actually knows about, without duplicates.
    ///
    /// When `all` is empty the visible list is trusted as-is.
    pub fn effective_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.visible.len());
        for field in &self.visible {
            let known = self.all.is_empty() || self.all.contains(field);
            if known && !out.contains(field) {
                out.push(field.clone());
            }
        }
        out
    }

    /// Replace the visible list, keeping only known fields.
    pub fn with_visible(&self, visible: Vec<String>) -> Self {
        let mut next = Self {
            all: self.all.clone(),
            visible,
        };
        next.visible = next.effective_columns();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(qty: Decimal, cost: Decimal, px: Option<Decimal>) -> PortfolioPosition {
        PortfolioPosition {
            id: 1,
            symbol: "AAPL".to_string(),
            quantity: qty,
            purchase_price: cost,
            current_price: px,
            purchase_date: None,
        }
    }

    #[test]
    fn test_position_gain() {
        let p = position(dec!(10), dec!(100), Some(dec!(110)));
        assert_eq!(p.cost_basis(), dec!(1000));
        assert_eq!(p.market_value(), dec!(1100));
        assert_eq!(p.gain(), dec!(100));
        assert_eq!(p.gain_percent(), Some(dec!(10)));
    }

    #[test]
    fn test_position_without_quote() {
        let p = position(dec!(5), dec!(20), None);
        assert_eq!(p.market_value(), dec!(100));
        assert_eq!(p.gain(), Decimal::ZERO);
    }

    #[test]
    fn test_position_zero_basis_has_no_percent() {
        let p = position(dec!(0), dec!(20), Some(dec!(25)));
        assert_eq!(p.gain_percent(), None);
    }

    #[test]
    fn test_alert_condition_parse() {
        assert_eq!("above".parse::<AlertCondition>().unwrap(), AlertCondition::Above);
        assert_eq!(" Below ".parse::<AlertCondition>().unwrap(), AlertCondition::Below);
        assert!("sideways".parse::<AlertCondition>().is_err());
    }

    #[test]
    fn test_alert_json_shape() {
        let alert: Alert = serde_json::from_str(
            r#"{"id": 7, "symbol": "MSFT", "target_price": "410.5", "condition": "below"}"#,
        )
        .unwrap();
        assert_eq!(alert.condition, AlertCondition::Below);
        assert_eq!(alert.target_price, dec!(410.5));
    }

    #[test]
    fn test_new_alert_validation() {
        let ok = NewAlert {
            symbol: " tsla ".to_string(),
            target_price: dec!(200),
            condition: AlertCondition::Above,
        }
        .validated()
        .unwrap();
        assert_eq!(ok.symbol, "TSLA");

        let empty = NewAlert {
            symbol: "  ".to_string(),
            target_price: dec!(200),
            condition: AlertCondition::Above,
        };
        assert!(empty.validated().is_err());

        let zero = NewAlert {
            symbol: "TSLA".to_string(),
            target_price: Decimal::ZERO,
            condition: AlertCondition::Above,
        };
        assert!(zero.validated().is_err());
    }

    #[test]
    fn test_effective_columns_drops_unknown_and_duplicates() {
        let pref = ColumnPreference::new(
            vec!["symbol".into(), "price".into(), "volume".into()],
            vec!["price".into(), "bogus".into(), "symbol".into(), "price".into()],
        );
        assert_eq!(pref.effective_columns(), vec!["price", "symbol"]);
    }

    #[test]
    fn test_effective_columns_without_catalog() {
        let pref = ColumnPreference::new(vec![], vec!["a".into(), "b".into()]);
        assert_eq!(pref.effective_columns(), vec!["a", "b"]);
    }

    #[test]
    fn test_with_visible() {
        let pref = ColumnPreference::new(vec!["symbol".into(), "price".into()], vec![]);
        let next = pref.with_visible(vec!["price".into(), "nope".into()]);
        assert_eq!(next.visible, vec!["price"]);
        assert_eq!(next.all, pref.all);
    }

    #[test]
    fn test_dividend_total() {
        let d = Dividend {
            symbol: "KO".into(),
            ex_date: None,
            pay_date: None,
            amount: dec!(0.46),
            shares: Some(dec!(100)),
        };
        assert_eq!(d.total(), Some(dec!(46.00)));
    }

    #[test]
    fn test_kpi_unit_default() {
        let kpi: Kpi = serde_json::from_str(r#"{"name": "Positions", "value": 12}"#).unwrap();
        assert_eq!(kpi.unit, KpiUnit::Number);
    }
}
