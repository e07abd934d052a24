//! The consolidated spreadsheet snapshot pushed to subscribers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::changelog::ChangeLogEntry;
use crate::investment::ConsolidatedInvestment;
use crate::ledger::{Expense, MonthYear, MonthlyData};

/// Whole-ledger state: summary, per-section views and the recent change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedSpreadsheet {
    /// Whole-ledger totals.
    pub summary: Summary,
    /// Per-section derived views.
    pub sections: Sections,
    /// Most recent change-log entries, oldest first.
    pub logs: Vec<ChangeLogEntry>,
}

impl ConsolidatedSpreadsheet {
    /// Empty snapshot for an engine created at `now` during `period`.
    #[must_use]
    pub fn initial(now: DateTime<Utc>, period: MonthYear) -> Self {
        Self {
            summary: Summary::empty(now),
            sections: Sections::empty(now, period),
            logs: Vec::new(),
        }
    }
}

/// Whole-ledger totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Salary plus extra income.
    pub total_income: Decimal,
    /// Fixed plus variable spending; investments excluded.
    pub total_expenses: Decimal,
    /// Raw sum of investment contributions.
    pub total_investments: Decimal,
    /// `total_income - total_expenses`.
    pub net_balance: Decimal,
    /// Spending broken down by income source.
    pub income_usage: IncomeUsage,
    /// Time of the last recompute.
    pub last_updated: DateTime<Utc>,
}

impl Summary {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            total_investments: Decimal::ZERO,
            net_balance: Decimal::ZERO,
            income_usage: IncomeUsage::default(),
            last_updated: now,
        }
    }
}

/// How much of each income source has been spent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeUsage {
    /// Spending paid from the salary.
    pub salary_spent: Decimal,
    /// Spending paid from extra income.
    pub extra_spent: Decimal,
    /// Salary left.
    pub remaining_salary: Decimal,
    /// Extra income left.
    pub remaining_extra: Decimal,
    /// Share of the salary spent, in percent (2 dp).
    pub salary_usage_percent: Decimal,
}

/// Per-section derived views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sections {
    /// Income view.
    pub income: IncomeSection,
    /// Expense view.
    pub expenses: ExpenseSection,
    /// Investment view.
    pub investments: InvestmentSection,
    /// Month in progress.
    pub monthly: MonthlySection,
    /// Closed months.
    pub history: HistorySection,
}

impl Sections {
    fn empty(now: DateTime<Utc>, period: MonthYear) -> Self {
        Self {
            income: IncomeSection {
                salary: Decimal::ZERO,
                extra_income: Decimal::ZERO,
                total_income: Decimal::ZERO,
                last_updated: now,
            },
            expenses: ExpenseSection {
                fixed: Vec::new(),
                variable: Vec::new(),
                total_fixed: Decimal::ZERO,
                total_variable: Decimal::ZERO,
                by_category: Vec::new(),
                by_payment_method: PaymentMethodTotals::default(),
                last_updated: now,
            },
            investments: InvestmentSection {
                transactions: Vec::new(),
                consolidated: Vec::new(),
                total_invested: Decimal::ZERO,
                last_updated: now,
            },
            monthly: MonthlySection::new(MonthlyData::empty(period), now),
            history: HistorySection {
                months: Vec::new(),
                yearly_totals: Vec::new(),
                last_updated: now,
            },
        }
    }
}

/// Income view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSection {
    /// Salary.
    pub salary: Decimal,
    /// Extra income.
    pub extra_income: Decimal,
    /// Salary plus extra income.
    pub total_income: Decimal,
    /// Time of the last income change.
    pub last_updated: DateTime<Utc>,
}

/// Expense view; investments are not listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSection {
    /// Fixed expenses, in input order.
    pub fixed: Vec<Expense>,
    /// Variable expenses, in input order.
    pub variable: Vec<Expense>,
    /// Sum of fixed expenses.
    pub total_fixed: Decimal,
    /// Sum of variable expenses.
    pub total_variable: Decimal,
    /// Spending per category, in first-seen order.
    pub by_category: Vec<CategoryTotal>,
    /// Spending per income source.
    pub by_payment_method: PaymentMethodTotals,
    /// Time of the last expense change.
    pub last_updated: DateTime<Utc>,
}

/// Spending in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category name, as first seen.
    pub category: String,
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of expenses.
    pub count: usize,
}

/// Spending per income source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentMethodTotals {
    /// Paid from the salary.
    pub salary: Decimal,
    /// Paid from extra income.
    pub extra: Decimal,
}

/// Investment view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSection {
    /// Every investment transaction, in input order.
    pub transactions: Vec<Expense>,
    /// Positions consolidated by name.
    pub consolidated: Vec<ConsolidatedInvestment>,
    /// Raw sum of contributions.
    pub total_invested: Decimal,
    /// Time of the last investment change.
    pub last_updated: DateTime<Utc>,
}

/// Month in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySection {
    /// Month name, e.g. "outubro".
    pub current_month: String,
    /// Calendar year.
    pub current_year: i32,
    /// Income, non-investment expenses and totals of the month.
    pub monthly_data: MonthlyData,
    /// Time of the last monthly change.
    pub last_updated: DateTime<Utc>,
}

impl MonthlySection {
    /// Section showing `month`.
    #[must_use]
    pub fn new(month: MonthlyData, now: DateTime<Utc>) -> Self {
        Self {
            current_month: month.month.clone(),
            current_year: month.year,
            monthly_data: month,
            last_updated: now,
        }
    }
}

/// Closed months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySection {
    /// Closed months, as supplied.
    pub months: Vec<MonthlyData>,
    /// Totals per year, in first-seen order.
    pub yearly_totals: Vec<YearlyTotal>,
    /// Time of the last history change.
    pub last_updated: DateTime<Utc>,
}

/// Totals of the closed months of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTotal {
    /// Calendar year.
    pub year: i32,
    /// Sum of monthly income.
    pub total_income: Decimal,
    /// Sum of monthly spending; investments excluded.
    pub total_expenses: Decimal,
    /// Sum of monthly investment contributions.
    pub total_investments: Decimal,
    /// `total_income - total_expenses`.
    pub net_balance: Decimal,
}
