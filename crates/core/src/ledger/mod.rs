//! Ledger records.
//!
//! This module holds the records the engine aggregates:
//! - Income, Expense and MonthlyData value types
//! - Calendar months and their Portuguese labels
//! - Boundary validation rules

pub mod period;
pub mod types;
pub mod validation;

pub use period::MonthYear;
pub use types::{sum_amounts, Expense, ExpenseType, Income, MonthlyData, PaymentMethod};
pub use validation::{
    validate_expense, validate_expenses, validate_income, validate_month, LedgerValidationError,
};
