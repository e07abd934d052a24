//! Investment position types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One investment's position, folded from all of its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedInvestment {
    /// Display name (as written on the entry that last set the balance).
    pub name: String,
    /// Sum of every contribution.
    pub total_invested: Decimal,
    /// Latest known account balance.
    pub current_balance: Decimal,
    /// Return in percent; `None` when nothing was invested.
    pub performance: Option<Decimal>,
}

/// Percentage return of `current_balance` over `total_invested`.
///
/// Unrounded and unclamped. `None` when `total_invested` is zero or the
/// arithmetic overflows.
#[must_use]
pub fn performance(total_invested: Decimal, current_balance: Decimal) -> Option<Decimal> {
    current_balance
        .checked_sub(total_invested)?
        .checked_div(total_invested)?
        .checked_mul(Decimal::ONE_HUNDRED)
}
