//! Business rule validation for ledger records.
//!
//! The engine itself never needs these checks to stay consistent; they guard
//! the boundary where records arrive from the persistence layer.

use finsync_shared::types::ExpenseId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::period::MonthYear;
use super::types::{Expense, ExpenseType, Income, MonthlyData};

/// Validation errors for ledger records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerValidationError {
    /// Salary or extra income is negative.
    #[error("Income cannot be negative")]
    NegativeIncome,

    /// Expense amount is zero or negative.
    #[error("Expense {id} amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// Offending expense.
        id: ExpenseId,
        /// Amount supplied.
        amount: Decimal,
    },

    /// Expense has a blank name.
    #[error("Expense {id} has an empty name")]
    EmptyName {
        /// Offending expense.
        id: ExpenseId,
    },

    /// Expense has a blank category.
    #[error("Expense {id} has an empty category")]
    EmptyCategory {
        /// Offending expense.
        id: ExpenseId,
    },

    /// Investment balance supplied on a non-investment expense.
    #[error("Expense {id} is not an investment but carries an investment balance")]
    UnexpectedInvestmentBalance {
        /// Offending expense.
        id: ExpenseId,
    },

    /// Month number outside 1-12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    /// Month name that is not a calendar month.
    #[error("Unknown month name: {0}")]
    UnknownMonthName(String),
}

/// Validates an income record.
///
/// # Errors
///
/// Returns `LedgerValidationError::NegativeIncome` if either part is negative.
pub fn validate_income(income: &Income) -> Result<(), LedgerValidationError> {
    if income.salary < Decimal::ZERO || income.extra_income < Decimal::ZERO {
        return Err(LedgerValidationError::NegativeIncome);
    }
    Ok(())
}

/// Validates a single expense.
///
/// # Errors
///
/// Returns the first rule the expense breaks.
pub fn validate_expense(expense: &Expense) -> Result<(), LedgerValidationError> {
    if expense.amount <= Decimal::ZERO {
        return Err(LedgerValidationError::NonPositiveAmount {
            id: expense.id.clone(),
            amount: expense.amount,
        });
    }

    if expense.name.trim().is_empty() {
        return Err(LedgerValidationError::EmptyName { id: expense.id.clone() });
    }

    if expense.category.trim().is_empty() {
        return Err(LedgerValidationError::EmptyCategory { id: expense.id.clone() });
    }

    if expense.expense_type != ExpenseType::Investment && expense.investment_balance.is_some() {
        return Err(LedgerValidationError::UnexpectedInvestmentBalance { id: expense.id.clone() });
    }

    Ok(())
}

/// Validates every expense of a list.
///
/// # Errors
///
/// Returns the error of the first invalid expense.
pub fn validate_expenses(expenses: &[Expense]) -> Result<(), LedgerValidationError> {
    expenses.iter().try_for_each(validate_expense)
}

/// Validates a month snapshot and everything it contains.
///
/// # Errors
///
/// Returns the first problem found in the month name, income or expenses.
pub fn validate_month(month: &MonthlyData) -> Result<(), LedgerValidationError> {
    if MonthYear::from_name(&month.month, month.year).is_none() {
        return Err(LedgerValidationError::UnknownMonthName(month.month.clone()));
    }
    validate_income(&month.income)?;
    validate_expenses(&month.expenses)
}
