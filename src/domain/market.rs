use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{require_text, Validate};

/// Chart timeframe accepted by `GET /market-data/{symbol}?timeframe=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::OneYear => "1Y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1 Day",
            Timeframe::OneWeek => "1 Week",
            Timeframe::OneMonth => "1 Month",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::OneYear => "1 Year",
        }
    }

    /// Cycle to the next timeframe, wrapping around
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|tf| tf == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous timeframe, wrapping around
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|tf| tf == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1D" => Ok(Timeframe::OneDay),
            "1W" => Ok(Timeframe::OneWeek),
            "1M" => Ok(Timeframe::OneMonth),
            "3M" => Ok(Timeframe::ThreeMonths),
            "1Y" => Ok(Timeframe::OneYear),
            _ => Err("invalid timeframe; expected 1D|1W|1M|3M|1Y"),
        }
    }
}

/// Latest quote from `GET /market-data/quote/{symbol}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub volume: Decimal,
}

impl Validate for Quote {
    fn validate(&self) -> Result<(), String> {
        require_text("symbol", &self.symbol)?;
        if self.price.is_sign_negative() {
            return Err("price must not be negative".to_string());
        }
        if self.volume.is_sign_negative() {
            return Err("volume must not be negative".to_string());
        }
        Ok(())
    }
}

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub datetime: String,
    #[serde(default)]
    pub open: Decimal,
    #[serde(default)]
    pub high: Decimal,
    #[serde(default)]
    pub low: Decimal,
    pub close: Decimal,
    #[serde(default)]
    pub volume: Decimal,
}

impl PriceBar {
    /// Axis label: time of day for intraday charts, date otherwise
    pub fn label(&self, timeframe: Timeframe) -> String {
        let parsed = DateTime::parse_from_rfc3339(&self.datetime)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(&self.datetime, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| NaiveDateTime::parse_from_str(&self.datetime, "%Y-%m-%d %H:%M:%S"));

        match (parsed, timeframe) {
            (Ok(dt), Timeframe::OneDay) => dt.format("%H:%M").to_string(),
            (Ok(dt), _) => dt.format("%m/%d/%Y").to_string(),
            (Err(_), _) => self.datetime.clone(),
        }
    }
}

impl Validate for PriceBar {
    fn validate(&self) -> Result<(), String> {
        require_text("datetime", &self.datetime)?;
        if self.close.is_sign_negative() {
            return Err("close must not be negative".to_string());
        }
        Ok(())
    }
}

/// Price/volume series from `GET /market-data/{symbol}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    pub values: Vec<PriceBar>,
}

impl Validate for MarketSeries {
    fn validate(&self) -> Result<(), String> {
        self.values.validate()
    }
}

impl MarketSeries {
    pub fn closes(&self) -> Vec<Decimal> {
        self.values.iter().map(|bar| bar.close).collect()
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.values.last().map(|bar| bar.close)
    }

    /// Most recent SMA value, if the series is long enough
    pub fn latest_sma(&self, period: usize) -> Option<Decimal> {
        sma(&self.closes(), period).last().copied().flatten()
    }
}

/// Simple moving average; `None` until `period` points are available
pub fn sma(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let divisor = Decimal::from(period as u64);
    let mut out = Vec::with_capacity(values.len());
    let mut window_sum = Decimal::ZERO;

    for (i, value) in values.iter().enumerate() {
        window_sum += *value;
        if i >= period {
            window_sum -= values[i - period];
        }
        if i + 1 >= period {
            out.push(Some(window_sum / divisor));
        } else {
            out.push(None);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_timeframe_round_trip_and_cycle() {
        for tf in Timeframe::ALL {
            assert_eq!(Timeframe::from_str(tf.as_str()).unwrap(), tf);
        }
        assert_eq!(Timeframe::OneYear.next(), Timeframe::OneDay);
        assert_eq!(Timeframe::OneDay.prev(), Timeframe::OneYear);
        assert_eq!(Timeframe::from_str("3m").unwrap(), Timeframe::ThreeMonths);
        assert!(Timeframe::from_str("2H").is_err());
    }

    #[test]
    fn test_sma_needs_full_window() {
        let values: Vec<Decimal> = (1..=25).map(Decimal::from).collect();
        let averages = sma(&values, 20);

        assert_eq!(averages.len(), 25);
        assert!(averages[..19].iter().all(Option::is_none));
        // mean of 1..=20
        assert_eq!(averages[19], Some(dec!(10.5)));
        // mean of 6..=25
        assert_eq!(averages[24], Some(dec!(15.5)));
    }

    #[test]
    fn test_series_requires_values_key() {
        let missing: std::result::Result<MarketSeries, _> =
            serde_json::from_str(r#"{"data":[]}"#);
        assert!(missing.is_err());

        let series: MarketSeries = serde_json::from_str(
            r#"{"values":[{"datetime":"2024-01-02T10:30:00","close":"151.2","volume":1200}]}"#,
        )
        .unwrap();
        assert_eq!(series.last_price(), Some(dec!(151.2)));
        assert_eq!(series.values[0].label(Timeframe::OneDay), "10:30");
        assert_eq!(series.values[0].label(Timeframe::OneMonth), "01/02/2024");
    }

    #[test]
    fn test_quote_validation() {
        let quote = Quote {
            symbol: "IBM".into(),
            price: dec!(-1),
            volume: dec!(10),
        };
        assert!(quote.validate().is_err());
    }
}
