//! Section derivations and the whole-ledger summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::changelog::SectionData;
use super::snapshot::{
    CategoryTotal, ExpenseSection, HistorySection, IncomeSection, IncomeUsage, InvestmentSection,
    MonthlySection, PaymentMethodTotals, Sections, Summary, YearlyTotal,
};
use crate::grouping::OrderedGroups;
use crate::investment::consolidate;
use crate::ledger::{sum_amounts, Expense, ExpenseType, Income, MonthlyData, PaymentMethod};

/// Service deriving the snapshot sections and summary from change data.
pub struct AggregationService;

impl AggregationService {
    /// Applies one change's data to the sections it affects.
    ///
    /// Income and expense changes also update the month in progress.
    pub fn apply(sections: &mut Sections, data: &SectionData, now: DateTime<Utc>) {
        match data {
            SectionData::Income(income) => {
                sections.income = Self::income_section(income, now);
                let month = &mut sections.monthly.monthly_data;
                month.income = *income;
                month.total_income = income.total();
                month.remaining_income = month.total_income.saturating_sub(month.total_expenses);
                sections.monthly.last_updated = now;
            }
            SectionData::Expense(expenses) => {
                sections.expenses = Self::expense_section(expenses, now);
                let month = &mut sections.monthly.monthly_data;
                month.expenses = expenses.iter().filter(|e| !e.is_investment()).cloned().collect();
                month.total_expenses = sum_amounts(&month.expenses);
                month.remaining_income = month.total_income.saturating_sub(month.total_expenses);
                sections.monthly.last_updated = now;
            }
            SectionData::Investment(expenses) => {
                sections.investments = Self::investment_section(expenses, now);
            }
            SectionData::Monthly(month) => {
                sections.monthly = MonthlySection::new(month.clone(), now);
            }
            SectionData::History(months) => {
                sections.history = Self::history_section(months, now);
            }
        }
    }

    /// Income view of `income`.
    #[must_use]
    pub fn income_section(income: &Income, now: DateTime<Utc>) -> IncomeSection {
        IncomeSection {
            salary: income.salary,
            extra_income: income.extra_income,
            total_income: income.total(),
            last_updated: now,
        }
    }

    /// Expense view of `expenses`; investment entries are skipped.
    #[must_use]
    pub fn expense_section(expenses: &[Expense], now: DateTime<Utc>) -> ExpenseSection {
        let mut fixed = Vec::new();
        let mut variable = Vec::new();
        let mut by_category: OrderedGroups<String, CategoryTotal> = OrderedGroups::new();
        let mut by_payment_method = PaymentMethodTotals::default();

        for expense in expenses {
            match expense.expense_type {
                ExpenseType::Fixed => fixed.push(expense.clone()),
                ExpenseType::Variable => variable.push(expense.clone()),
                ExpenseType::Investment => continue,
            }

            by_category.fold(
                expense.category.clone(),
                || CategoryTotal {
                    category: expense.category.clone(),
                    total: expense.amount,
                    count: 1,
                },
                |total| {
                    total.total = total.total.saturating_add(expense.amount);
                    total.count += 1;
                },
            );

            let spent = match expense.payment_method {
                PaymentMethod::Salary => &mut by_payment_method.salary,
                PaymentMethod::Extra => &mut by_payment_method.extra,
            };
            *spent = spent.saturating_add(expense.amount);
        }

        ExpenseSection {
            total_fixed: sum_amounts(&fixed),
            total_variable: sum_amounts(&variable),
            fixed,
            variable,
            by_category: by_category.into_groups().map(|(_, total)| total).collect(),
            by_payment_method,
            last_updated: now,
        }
    }

    /// Investment view of the investment entries in `expenses`.
    #[must_use]
    pub fn investment_section(expenses: &[Expense], now: DateTime<Utc>) -> InvestmentSection {
        let transactions: Vec<Expense> = expenses
            .iter()
            .filter(|e| e.is_investment())
            .cloned()
            .collect();

        InvestmentSection {
            consolidated: consolidate(&transactions),
            total_invested: sum_amounts(&transactions),
            transactions,
            last_updated: now,
        }
    }

    /// History view of `months`.
    #[must_use]
    pub fn history_section(months: &[MonthlyData], now: DateTime<Utc>) -> HistorySection {
        HistorySection {
            months: months.to_vec(),
            yearly_totals: Self::yearly_totals(months),
            last_updated: now,
        }
    }

    /// Totals per year, in first-seen year order.
    #[must_use]
    pub fn yearly_totals(months: &[MonthlyData]) -> Vec<YearlyTotal> {
        let mut years: OrderedGroups<i32, YearlyTotal> = OrderedGroups::new();

        for month in months {
            let investments = month.total_investments();
            years.fold(
                month.year,
                || YearlyTotal {
                    year: month.year,
                    total_income: month.total_income,
                    total_expenses: month.total_expenses,
                    total_investments: investments,
                    net_balance: Decimal::ZERO,
                },
                |total| {
                    total.total_income = total.total_income.saturating_add(month.total_income);
                    total.total_expenses =
                        total.total_expenses.saturating_add(month.total_expenses);
                    total.total_investments = total.total_investments.saturating_add(investments);
                },
            );
        }

        years
            .into_groups()
            .map(|(_, mut total)| {
                total.net_balance = total.total_income.saturating_sub(total.total_expenses);
                total
            })
            .collect()
    }

    /// Recomputes the whole-ledger summary from the current sections.
    #[must_use]
    pub fn recompute(sections: &Sections, now: DateTime<Utc>) -> Summary {
        let total_income = sections.income.total_income;
        let expenses = &sections.expenses;
        let total_expenses = expenses.total_fixed.saturating_add(expenses.total_variable);

        Summary {
            total_income,
            total_expenses,
            total_investments: sections.investments.total_invested,
            net_balance: total_income.saturating_sub(total_expenses),
            income_usage: Self::income_usage(&sections.income, &expenses.by_payment_method),
            last_updated: now,
        }
    }

    /// Spending per income source against that source.
    #[must_use]
    pub fn income_usage(income: &IncomeSection, spent: &PaymentMethodTotals) -> IncomeUsage {
        let salary_usage_percent = spent
            .salary
            .checked_div(income.salary)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ZERO, |percent| percent.round_dp(2));

        IncomeUsage {
            salary_spent: spent.salary,
            extra_spent: spent.extra,
            remaining_salary: income.salary.saturating_sub(spent.salary),
            remaining_extra: income.extra_income.saturating_sub(spent.extra),
            salary_usage_percent,
        }
    }
}
