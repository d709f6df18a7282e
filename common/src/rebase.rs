//! Re-expressing rate tables relative to a different base currency.
//!
//! A [`RateTable`] stores every rate as "units of X per 1 unit of base".
//! Rebasing to a new base `N` divides every entry by the rate of `N`; the
//! old base becomes a normal entry and `N` becomes implicit.

use crate::models::{ConversionResult, RateSnapshot, RateTable};
use crate::{Error, Result};

/// Rate of `to` expressed per unit of `from`.
///
/// Returns `1.0` whenever both inputs are equal, including when both are
/// zero, so it cannot be used to detect missing currencies.
pub fn to_rate(from: f64, to: f64) -> f64 {
    if from == to {
        return 1.0;
    }
    to * (1.0 / from)
}

impl RateTable {
    /// Rate of `currency` relative to the table's base.
    ///
    /// The base itself has rate 1.0. An absent code is an error rather than
    /// a silent 0.0.
    pub fn rate_of(&self, currency: &str) -> Result<f64> {
        if currency == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(currency.to_string()))
    }

    /// Derive a copy of this table anchored at `new_base`.
    pub fn rebase(&self, new_base: &str) -> Result<RateTable> {
        if new_base == self.base {
            return Ok(self.clone());
        }

        let pivot = self
            .rates
            .get(new_base)
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(new_base.to_string()))?;
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(Error::InvalidRate {
                currency: new_base.to_string(),
                rate: pivot,
            });
        }

        let mut rates = self.rates.clone();
        // old base joins the table at its implicit value before recomputing
        rates.insert(self.base.clone(), 1.0);
        for value in rates.values_mut() {
            *value = to_rate(pivot, *value);
        }
        rates.remove(new_base);

        Ok(RateTable {
            base: new_base.to_string(),
            date: self.date.clone(),
            rates,
        })
    }

    /// Convert one unit of the table's base into `target`. No rebasing.
    pub fn convert(&self, target: &str) -> Result<ConversionResult> {
        let rate = self.rate_of(target)?;
        Ok(ConversionResult {
            from: self.base.clone(),
            from_value: 1.0,
            to: target.to_string(),
            to_value: rate,
            rate,
        })
    }

    /// Convert one unit of `base` into `target`, rebasing first if needed.
    pub fn cross_rate(&self, base: &str, target: &str) -> Result<ConversionResult> {
        self.rebase(base)?.convert(target)
    }
}

impl RateSnapshot {
    /// Derived copy of this snapshot anchored at `new_base`. The stored
    /// record is left untouched.
    pub fn rebase(&self, new_base: &str) -> Result<RateSnapshot> {
        Ok(RateSnapshot {
            id: self.id,
            fetched_at: self.fetched_at,
            table: self.table.rebase(new_base)?,
        })
    }

    pub fn convert(&self, target: &str) -> Result<ConversionResult> {
        self.table.convert(target)
    }

    pub fn cross_rate(&self, base: &str, target: &str) -> Result<ConversionResult> {
        self.table.cross_rate(base, target)
    }
}
