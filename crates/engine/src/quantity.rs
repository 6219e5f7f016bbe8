use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Number of micro-units in one whole unit.
pub const MICRO: i64 = 1_000_000;

/// Signed quantity represented as **integer micro-units** (millionths).
///
/// Use this type for **all** quantity values in the engine (recipe lines,
/// pantry balances, densities) to avoid floating-point drift. Six fractional
/// digits are kept exactly; rounding happens once per conversion, never in
/// between.
///
/// The value is signed so that intermediate accounting (`owned - removed`)
/// stays representable, but stored pantry quantities are always > 0.
///
/// # Examples
///
/// ```rust
/// use engine::Quantity;
///
/// let amount = Quantity::from_micro(1_500_000);
/// assert_eq!(amount.micro(), 1_500_000);
/// assert_eq!(amount.to_string(), "1.5");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 6 decimals):
///
/// ```rust
/// use engine::Quantity;
///
/// assert_eq!("2".parse::<Quantity>().unwrap().micro(), 2_000_000);
/// assert_eq!("0,25".parse::<Quantity>().unwrap().micro(), 250_000);
/// assert!("1.2345678".parse::<Quantity>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Creates a new quantity from integer micro-units.
    #[must_use]
    pub const fn from_micro(micro: i64) -> Self {
        Self(micro)
    }

    /// Creates a new quantity from a whole number of units.
    #[must_use]
    pub const fn from_whole(units: i64) -> Self {
        Self(units * MICRO)
    }

    /// Returns the raw value in micro-units.
    #[must_use]
    pub const fn micro(self) -> i64 {
        self.0
    }

    /// Returns `true` if the quantity is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the quantity is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_add(rhs.0).map(Quantity)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    /// Absolute difference, for tolerance checks.
    #[must_use]
    pub fn abs_diff(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.abs_diff(rhs.0) as i64)
    }
}

impl fmt::Display for Quantity {
    /// Formats with up to 6 decimals, trailing zeros trimmed (`1.5`, not
    /// `1.500000`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MICRO as u64;
        let frac = abs % MICRO as u64;
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let frac = format!("{frac:06}");
        write!(f, "{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Self::Output {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Self::Output {
        Quantity(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Quantity) {
        self.0 -= rhs.0;
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Self::Output {
        Quantity(-self.0)
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    /// Parses a decimal string into micro-units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`.
    ///
    /// Validation rules:
    /// - max 6 fractional digits (rejects `1.2345678`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidQuantity("empty quantity".to_string());
        let invalid = || EngineError::InvalidQuantity("invalid quantity".to_string());
        let overflow = || EngineError::InvalidQuantity("quantity too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let whole_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole_str.parse().map_err(|_| invalid())?;

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if frac.len() > 6 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(EngineError::InvalidQuantity(
                        "too many decimals".to_string(),
                    ));
                }
                let parsed: i64 = frac.parse().map_err(|_| invalid())?;
                parsed * 10i64.pow(6 - frac.len() as u32)
            }
        };

        let total = whole
            .checked_mul(MICRO)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Quantity(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Quantity::from_micro(0).to_string(), "0");
        assert_eq!(Quantity::from_micro(1).to_string(), "0.000001");
        assert_eq!(Quantity::from_micro(250_000).to_string(), "0.25");
        assert_eq!(Quantity::from_micro(1_500_000).to_string(), "1.5");
        assert_eq!(Quantity::from_micro(-1_500_000).to_string(), "-1.5");
        assert_eq!(Quantity::from_whole(12).to_string(), "12");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("2".parse::<Quantity>().unwrap().micro(), 2_000_000);
        assert_eq!("2.5".parse::<Quantity>().unwrap().micro(), 2_500_000);
        assert_eq!("0,25".parse::<Quantity>().unwrap().micro(), 250_000);
        assert_eq!("-0.5".parse::<Quantity>().unwrap().micro(), -500_000);
        assert_eq!("+1.0".parse::<Quantity>().unwrap().micro(), 1_000_000);
        assert_eq!("  3.2 ".parse::<Quantity>().unwrap().micro(), 3_200_000);
    }

    #[test]
    fn parse_rejects_more_than_six_decimals() {
        assert!("1.2345678".parse::<Quantity>().is_err());
        assert!("0.0000001".parse::<Quantity>().is_err());
    }

    #[test]
    fn parse_pads_short_fractions() {
        assert_eq!("1.2".parse::<Quantity>().unwrap().micro(), 1_200_000);
        assert_eq!("1.234567".parse::<Quantity>().unwrap().micro(), 1_234_567);
    }
}
