use crate::config::Settings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
}

pub const USD: Currency = Currency {
    code: "USD",
    symbol: "$",
};

pub const INR: Currency = Currency {
    code: "INR",
    symbol: "₹",
};

/// Fixed-rate conversion from the provider's quote currency into the display currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyConverter {
    pub source: Currency,
    pub target: Currency,
    pub rate: f64,
}

impl CurrencyConverter {
    pub fn new(source: Currency, target: Currency, rate: f64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            rate.is_finite() && rate > 0.0,
            "conversion rate {}->{} must be positive (got {rate})",
            source.code,
            target.code
        );
        Ok(Self {
            source,
            target,
            rate,
        })
    }

    pub fn usd_to_inr(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(USD, INR, settings.usd_to_inr_rate)
    }

    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

/// Two-decimal amount prefixed with the currency symbol, e.g. `₹8300.00`.
pub fn format_amount(currency: Currency, amount: f64) -> String {
    format!("{}{:.2}", currency.symbol, amount)
}
