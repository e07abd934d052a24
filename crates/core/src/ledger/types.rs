//! Domain records supplied by the persistence layer.
//!
//! Totals saturate at the `Decimal` bounds instead of overflowing.

use chrono::{DateTime, Utc};
use finsync_shared::types::ExpenseId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::MonthYear;

/// Monthly income, replaced wholesale whenever it changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    /// Salary for the month.
    pub salary: Decimal,
    /// Any income on top of the salary.
    pub extra_income: Decimal,
}

impl Income {
    /// Creates a new income record.
    #[must_use]
    pub const fn new(salary: Decimal, extra_income: Decimal) -> Self {
        Self {
            salary,
            extra_income,
        }
    }

    /// Salary plus extra income.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.salary.saturating_add(self.extra_income)
    }
}

/// Which income source pays for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid from the salary.
    Salary,
    /// Paid from extra income.
    Extra,
}

/// Expense classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    /// Recurring expense (rent, subscriptions).
    Fixed,
    /// One-off expense.
    Variable,
    /// Money moved into an investment; not counted as spending.
    Investment,
}

/// A single expense transaction.
///
/// Expenses are created once and deleted, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Free-form name; investment entries are consolidated by it.
    pub name: String,
    /// Amount, expected to be positive.
    pub amount: Decimal,
    /// Spending category.
    pub category: String,
    /// Income source paying for it.
    pub payment_method: PaymentMethod,
    /// Classification.
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    /// When the expense happened.
    pub date: DateTime<Utc>,
    /// Investment account balance after this transaction (investments only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_balance: Option<Decimal>,
}

impl Expense {
    /// Creates an expense with a fresh ID and no investment balance.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        payment_method: PaymentMethod,
        expense_type: ExpenseType,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            name: name.into(),
            amount,
            category: category.into(),
            payment_method,
            expense_type,
            date,
            investment_balance: None,
        }
    }

    /// Sets the post-transaction investment balance.
    #[must_use]
    pub fn with_investment_balance(mut self, balance: Decimal) -> Self {
        self.investment_balance = Some(balance);
        self
    }

    /// Returns true for investment transactions.
    #[must_use]
    pub fn is_investment(&self) -> bool {
        self.expense_type == ExpenseType::Investment
    }
}

/// Sums the amounts of the given expenses.
pub fn sum_amounts<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Decimal {
    expenses
        .into_iter()
        .fold(Decimal::ZERO, |total, e| total.saturating_add(e.amount))
}

/// Closed (or in-progress) month of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyData {
    /// Month name, e.g. "outubro".
    pub month: String,
    /// Calendar year.
    pub year: i32,
    /// Income for the month.
    pub income: Income,
    /// Expenses recorded in the month.
    pub expenses: Vec<Expense>,
    /// Salary plus extra income.
    pub total_income: Decimal,
    /// Fixed plus variable spending.
    pub total_expenses: Decimal,
    /// Income left after spending.
    pub remaining_income: Decimal,
}

impl MonthlyData {
    /// A month with no income and no expenses.
    #[must_use]
    pub fn empty(period: MonthYear) -> Self {
        Self::close(period, Income::default(), Vec::new())
    }

    /// Builds a month snapshot, deriving its totals.
    ///
    /// Investments are kept in `expenses` but do not count towards
    /// `total_expenses`.
    #[must_use]
    pub fn close(period: MonthYear, income: Income, expenses: Vec<Expense>) -> Self {
        let total_income = income.total();
        let total_expenses = sum_amounts(expenses.iter().filter(|e| !e.is_investment()));
        Self {
            month: period.month_name().to_string(),
            year: period.year(),
            income,
            expenses,
            total_income,
            total_expenses,
            remaining_income: total_income.saturating_sub(total_expenses),
        }
    }

    /// Sum of the investment transactions of the month.
    #[must_use]
    pub fn total_investments(&self) -> Decimal {
        sum_amounts(self.expenses.iter().filter(|e| e.is_investment()))
    }
}
