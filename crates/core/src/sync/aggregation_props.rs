//! Property-based tests for section aggregation.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregation::AggregationService;
use super::changelog::SectionData;
use super::snapshot::ConsolidatedSpreadsheet;
use crate::ledger::{Expense, ExpenseType, Income, MonthYear, MonthlyData, PaymentMethod};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn expense() -> impl Strategy<Value = Expense> {
    (
        prop_oneof![Just("Moradia"), Just("Lazer"), Just("Saúde")],
        amount(),
        prop_oneof![Just(PaymentMethod::Salary), Just(PaymentMethod::Extra)],
        prop_oneof![
            Just(ExpenseType::Fixed),
            Just(ExpenseType::Variable),
            Just(ExpenseType::Investment),
        ],
    )
        .prop_map(|(category, amount, payment_method, expense_type)| {
            Expense::new(
                "Item",
                amount,
                category,
                payment_method,
                expense_type,
                Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            )
        })
}

fn month() -> impl Strategy<Value = MonthlyData> {
    (
        1u32..=12,
        2020i32..2027,
        amount(),
        proptest::collection::vec(expense(), 0..6),
    )
        .prop_map(|(m, y, salary, expenses)| {
            MonthlyData::close(
                MonthYear::new(m, y).unwrap(),
                Income::new(salary, Decimal::ZERO),
                expenses,
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Summary totals after an income + expense + investment sequence.
    #[test]
    fn prop_summary_identities(
        salary in amount(),
        extra in amount(),
        expenses in proptest::collection::vec(expense(), 0..30),
    ) {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        let period = MonthYear::new(5, 2025).unwrap();
        let mut sections = ConsolidatedSpreadsheet::initial(now, period).sections;
        let income = Income::new(salary, extra);
        AggregationService::apply(&mut sections, &SectionData::Income(income), now);
        AggregationService::apply(&mut sections, &SectionData::Expense(expenses.clone()), now);
        AggregationService::apply(&mut sections, &SectionData::Investment(expenses.clone()), now);

        let summary = AggregationService::recompute(&sections, now);

        let (invested, spent): (Vec<&Expense>, Vec<&Expense>) =
            expenses.iter().partition(|e| e.is_investment());
        let spent: Decimal = spent.iter().map(|e| e.amount).sum();
        let invested: Decimal = invested.iter().map(|e| e.amount).sum();
        prop_assert_eq!(summary.total_income, salary + extra);
        prop_assert_eq!(summary.total_expenses, spent);
        prop_assert_eq!(summary.total_investments, invested);
        prop_assert_eq!(summary.net_balance, summary.total_income - summary.total_expenses);
        prop_assert_eq!(
            summary.income_usage.salary_spent + summary.income_usage.extra_spent,
            spent
        );
        prop_assert_eq!(sections.monthly.monthly_data.remaining_income, salary + extra - spent);
    }

    /// Category totals partition non-investment spending.
    #[test]
    fn prop_category_totals_partition_spending(
        expenses in proptest::collection::vec(expense(), 0..30),
    ) {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        let section = AggregationService::expense_section(&expenses, now);

        let by_category: Decimal = section.by_category.iter().map(|c| c.total).sum();
        let count: usize = section.by_category.iter().map(|c| c.count).sum();
        prop_assert_eq!(by_category, section.total_fixed + section.total_variable);
        prop_assert_eq!(count, section.fixed.len() + section.variable.len());
    }

    /// Yearly totals partition the history.
    #[test]
    fn prop_yearly_totals_partition_history(
        months in proptest::collection::vec(month(), 0..24),
    ) {
        let totals = AggregationService::yearly_totals(&months);

        let income: Decimal = totals.iter().map(|t| t.total_income).sum();
        let expenses: Decimal = totals.iter().map(|t| t.total_expenses).sum();
        let investments: Decimal = totals.iter().map(|t| t.total_investments).sum();
        prop_assert_eq!(income, months.iter().map(|m| m.total_income).sum::<Decimal>());
        prop_assert_eq!(expenses, months.iter().map(|m| m.total_expenses).sum::<Decimal>());
        let month_investments: Decimal = months.iter().map(MonthlyData::total_investments).sum();
        prop_assert_eq!(investments, month_investments);

        let mut years: Vec<i32> = months.iter().map(|m| m.year).collect();
        years.dedup();
        let mut seen = Vec::new();
        for year in years {
            if !seen.contains(&year) {
                seen.push(year);
            }
        }
        let reported: Vec<i32> = totals.iter().map(|t| t.year).collect();
        prop_assert_eq!(reported, seen);
    }
}
