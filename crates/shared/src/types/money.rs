//! Money display with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//!
//! Display follows the Brazilian convention used throughout the ledger:
//! `.` groups thousands, `,` separates cents (`R$ 1.234,56`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in Brazilian reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    /// Wraps an amount in reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The wrapped amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cents = self.0.round_dp(2);
        let sign = if cents.is_sign_negative() && !cents.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}R$ {}", group_digits(cents.abs(), 2))
    }
}

/// Formats a percentage with one decimal place (`10,0%`).
#[must_use]
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp(1);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}%", group_digits(rounded.abs(), 1))
}

/// Renders a non-negative decimal with `.` thousand groups and `,` decimals.
fn group_digits(value: Decimal, scale: usize) -> String {
    let text = format!("{value:.scale$}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{grouped},{frac_part}")
    }
}
