//! Folding investment transactions into per-investment positions.

use rust_decimal::Decimal;

use super::types::{performance, ConsolidatedInvestment};
use crate::grouping::OrderedGroups;
use crate::ledger::Expense;

/// Running state of one investment while folding.
struct Position {
    name: String,
    total_invested: Decimal,
    current_balance: Decimal,
}

/// Consolidates investment transactions by name.
///
/// Entries are grouped by `name.to_lowercase()` (no trimming, so a trailing
/// space makes a separate group) and folded in input order:
/// - every entry adds its `amount` to `total_invested`;
/// - the first entry of a group seeds `current_balance` with its
///   `investment_balance`, or its `amount` when it has none;
/// - a later entry replaces `current_balance` (and the display name) only
///   when it carries an `investment_balance`.
///
/// Groups come out in first-seen order. The input is expected to contain
/// investment-type expenses only; nothing is filtered here.
#[must_use]
pub fn consolidate(investments: &[Expense]) -> Vec<ConsolidatedInvestment> {
    let mut positions: OrderedGroups<String, Position> = OrderedGroups::new();

    for entry in investments {
        positions.fold(
            entry.name.to_lowercase(),
            || Position {
                name: entry.name.clone(),
                total_invested: entry.amount,
                current_balance: entry.investment_balance.unwrap_or(entry.amount),
            },
            |position| {
                position.total_invested = position.total_invested.saturating_add(entry.amount);
                if let Some(balance) = entry.investment_balance {
                    position.current_balance = balance;
                    position.name.clone_from(&entry.name);
                }
            },
        );
    }

    positions
        .into_groups()
        .map(|(_, position)| ConsolidatedInvestment {
            performance: performance(position.total_invested, position.current_balance),
            name: position.name,
            total_invested: position.total_invested,
            current_balance: position.current_balance,
        })
        .collect()
}
