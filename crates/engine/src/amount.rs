use crate::EngineError;

/// Signed expense amount represented as **integer cents**.
///
/// Amounts carry no currency. Negative values are allowed (refunds,
/// corrections), so no sign invariant is enforced here.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::from_decimal(12.34).unwrap();
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.as_decimal(), 12.34);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

/// Largest magnitude accepted from a JSON number. Beyond 2^53 cents an `f64`
/// can no longer represent every cent exactly.
const MAX_DECIMAL_CENTS: f64 = 9_007_199_254_740_992.0;

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a decimal number (as received on the JSON boundary) into
    /// cents, rounding half away from zero to two places.
    pub fn from_decimal(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidRequest(
                "amount must be a finite number".to_string(),
            ));
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_DECIMAL_CENTS {
            return Err(EngineError::InvalidRequest("amount too large".to_string()));
        }
        Ok(Self(cents as i64))
    }

    /// Returns the amount as a decimal number of major units.
    #[must_use]
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Adds two amounts, failing with [`EngineError::Internal`] when the
    /// total leaves the `i64` cent range.
    pub fn checked_add(self, rhs: Amount) -> Result<Self, EngineError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| EngineError::Internal("expense total out of range".to_string()))
    }
}
