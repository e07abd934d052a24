//! Integration tests for the sync engine, driven through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finsync_core::investment::consolidate;
use finsync_core::ledger::{Expense, ExpenseType, Income, MonthYear, MonthlyData, PaymentMethod};
use finsync_core::sync::{
    Action, ChangeDescriptor, ChangeMetadata, Clock, ConsolidatedSpreadsheet, SectionData,
    Subscriber, SubscriberError, SyncEngine, SyncError,
};
use finsync_shared::SyncConfig;

/// Clock that advances one second per reading.
struct SteppingClock {
    current: Cell<DateTime<Utc>>,
}

impl SteppingClock {
    fn starting_at(start: DateTime<Utc>) -> Box<Self> {
        Box::new(Self {
            current: Cell::new(start),
        })
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.current.get();
        self.current.set(now + Duration::seconds(1));
        now
    }
}

fn start() -> DateTime<Utc> {
    // 09:00 in Brasília.
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

fn engine_with(config: &SyncConfig) -> SyncEngine {
    SyncEngine::with_clock(config, SteppingClock::starting_at(start())).unwrap()
}

fn engine() -> SyncEngine {
    engine_with(&SyncConfig::default())
}

fn expense(name: &str, amount: Decimal, expense_type: ExpenseType) -> Expense {
    Expense::new(
        name,
        amount,
        "Geral",
        PaymentMethod::Salary,
        expense_type,
        start(),
    )
}

fn income_change(salary: Decimal) -> ChangeDescriptor {
    ChangeDescriptor::new(
        Action::Update,
        SectionData::Income(Income::new(salary, Decimal::ZERO)),
        ChangeMetadata::new("março 2025").with_amount(salary),
    )
}

#[test]
fn test_consolidation_first_last_rule() {
    let result = consolidate(&[
        expense("X", dec!(100), ExpenseType::Investment),
        expense("X", dec!(50), ExpenseType::Investment).with_investment_balance(dec!(200)),
    ]);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].name, "X");
    assert_eq!(result[0].total_invested, dec!(150));
    assert_eq!(result[0].current_balance, dec!(200));

    let result = consolidate(&[expense("X", dec!(100), ExpenseType::Investment)]);
    assert_eq!(result[0].current_balance, dec!(100));
}

#[test]
fn test_consolidation_case_grouping() {
    let result = consolidate(&[
        expense("Tesouro", dec!(10), ExpenseType::Investment),
        expense("tesouro", dec!(20), ExpenseType::Investment),
        expense("Tesouro ", dec!(30), ExpenseType::Investment),
    ]);

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].total_invested, dec!(30));
    assert_eq!(result[1].total_invested, dec!(30));
}

#[test]
fn test_summary_excludes_investments() {
    let mut engine = engine();
    engine
        .initialize_with_data(
            &Income::new(dec!(5000), dec!(0)),
            &[
                expense("Aluguel", dec!(1000), ExpenseType::Fixed),
                expense("Tesouro", dec!(2000), ExpenseType::Investment),
            ],
            &[],
        )
        .unwrap();

    let summary = &engine.consolidated_data().summary;
    assert_eq!(summary.total_expenses, dec!(1000));
    assert_eq!(summary.net_balance, dec!(4000));
    assert_eq!(summary.total_investments, dec!(2000));
}

#[test]
fn test_log_view_keeps_most_recent_in_order() {
    let mut engine = engine();
    let mut ids = Vec::new();
    for n in 0..150 {
        ids.push(engine.record(income_change(Decimal::from(n))).unwrap());
    }

    let logs = &engine.consolidated_data().logs;
    assert_eq!(logs.len(), 100);
    let view: Vec<_> = logs.iter().map(|e| e.id).collect();
    assert_eq!(view, ids[50..].to_vec());
    assert!(logs.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_every_subscriber_sees_same_pass() {
    let mut engine = engine();
    let seen: Rc<RefCell<Vec<DateTime<Utc>>>> = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..3 {
        let seen = Rc::clone(&seen);
        engine.subscribe(move |snapshot: &ConsolidatedSpreadsheet| {
            seen.borrow_mut().push(snapshot.summary.last_updated);
        });
    }

    engine.record(income_change(dec!(3000))).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|t| *t == seen[0]));
}

#[test]
fn test_reinitialization_is_idempotent() {
    let income = Income::new(dec!(5000), dec!(750));
    let expenses = vec![
        expense("Aluguel", dec!(1500), ExpenseType::Fixed),
        expense("Cinema", dec!(80), ExpenseType::Variable),
        expense("CDB", dec!(500), ExpenseType::Investment).with_investment_balance(dec!(520)),
    ];
    let mut engine = engine();

    engine.initialize_with_data(&income, &expenses, &[]).unwrap();
    let first = engine.consolidated_data().clone();
    engine.initialize_with_data(&income, &expenses, &[]).unwrap();
    let second = engine.consolidated_data();

    assert_eq!(first.summary.total_income, second.summary.total_income);
    assert_eq!(first.summary.total_expenses, second.summary.total_expenses);
    assert_eq!(first.summary.total_investments, second.summary.total_investments);
    assert_eq!(first.summary.net_balance, second.summary.net_balance);
    assert_eq!(first.summary.income_usage, second.summary.income_usage);
    assert_eq!(first.sections.investments.consolidated, second.sections.investments.consolidated);
    assert_ne!(first.summary.last_updated, second.summary.last_updated);
}

#[test]
fn test_initialize_logs_four_changes() {
    let mut engine = engine();
    engine
        .initialize_with_data(&Income::new(dec!(1000), dec!(0)), &[], &[])
        .unwrap();

    let entries: Vec<_> = engine.logs().collect();
    let sections: Vec<&str> = entries.iter().map(|e| e.section().as_str()).collect();
    assert_eq!(sections, vec!["income", "expense", "investment", "history"]);
    assert!(entries.iter().all(|e| e.action == Action::Update));
    assert!(entries.iter().all(|e| e.metadata.month_year == "março 2025"));
    assert_eq!(entries[0].related_sections, vec!["monthly", "summary"]);
    assert_eq!(entries[3].related_sections, vec!["summary"]);
    assert_eq!(
        entries[2].metadata.description.as_deref(),
        Some("Inicialização dos investimentos")
    );
}

#[test]
fn test_performance_formula() {
    let result = consolidate(&[
        expense("Fundo", dec!(1000), ExpenseType::Investment).with_investment_balance(dec!(1100)),
    ]);
    assert_eq!(result[0].performance, Some(dec!(10)));
}

#[test]
fn test_strict_validation_rejects_and_leaves_state() {
    let config = SyncConfig {
        strict_validation: true,
        ..SyncConfig::default()
    };
    let mut engine = engine_with(&config);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    engine.subscribe(move |_: &ConsolidatedSpreadsheet| counter.set(counter.get() + 1));
    let before = engine.consolidated_data().clone();

    let result = engine.record(ChangeDescriptor::new(
        Action::Create,
        SectionData::Expense(vec![expense("Erro", dec!(0), ExpenseType::Variable)]),
        ChangeMetadata::new("março 2025"),
    ));

    assert!(matches!(result, Err(SyncError::Validation(_))));
    assert_eq!(engine.logs().count(), 0);
    assert_eq!(engine.consolidated_data(), &before);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_lenient_validation_records_anyway() {
    let mut engine = engine();
    engine
        .record(ChangeDescriptor::new(
            Action::Create,
            SectionData::Expense(vec![expense("Estorno", dec!(-50), ExpenseType::Variable)]),
            ChangeMetadata::new("março 2025"),
        ))
        .unwrap();

    assert_eq!(engine.logs().count(), 1);
    assert_eq!(engine.consolidated_data().summary.total_expenses, dec!(-50));
}

struct Rejecting;

impl Subscriber for Rejecting {
    fn on_snapshot(&self, _: &ConsolidatedSpreadsheet) -> Result<(), SubscriberError> {
        Err(SubscriberError::new("rejected"))
    }
}

struct Exploding;

impl Subscriber for Exploding {
    fn on_snapshot(&self, _: &ConsolidatedSpreadsheet) -> Result<(), SubscriberError> {
        panic!("subscriber exploded")
    }
}

#[test]
fn test_failing_subscribers_are_isolated() {
    let mut engine = engine();
    let reached = Rc::new(Cell::new(0));
    engine.subscribe(Rejecting);
    engine.subscribe(Exploding);
    let counter = Rc::clone(&reached);
    engine.subscribe(move |_: &ConsolidatedSpreadsheet| counter.set(counter.get() + 1));

    engine.record(income_change(dec!(1))).unwrap();
    engine.record(income_change(dec!(2))).unwrap();

    assert_eq!(reached.get(), 2);
    assert_eq!(engine.consolidated_data().summary.total_income, dec!(2));
}

#[test]
fn test_unsubscribe_is_a_noop_when_repeated_or_after_dispose() {
    let mut engine = engine();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let first = engine.subscribe(move |_: &ConsolidatedSpreadsheet| counter.set(counter.get() + 1));
    let second = engine.subscribe(|_: &ConsolidatedSpreadsheet| {});

    assert!(first.unsubscribe());
    assert!(!first.unsubscribe());
    engine.record(income_change(dec!(1))).unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(engine.subscriber_count(), 1);

    engine.dispose();
    assert!(!second.unsubscribe());
}

#[test]
fn test_retention_bounds_export() {
    let config = SyncConfig {
        log_retention: 120,
        ..SyncConfig::default()
    };
    let mut engine = engine_with(&config);
    for n in 0..150 {
        engine.record(income_change(Decimal::from(n))).unwrap();
    }

    assert_eq!(engine.logs().count(), 120);
    assert_eq!(engine.consolidated_data().logs.len(), 100);
    assert_eq!(engine.evicted_count(), 30);

    let csv = engine.export_csv().unwrap();
    assert_eq!(csv.lines().count(), 121);
    assert!(csv.lines().nth(1).unwrap().contains(",30,"));
}

#[test]
fn test_history_yearly_totals() {
    let month = |m: u32, y: i32, expenses: Vec<Expense>| {
        MonthlyData::close(
            MonthYear::new(m, y).unwrap(),
            Income::new(dec!(4000), dec!(0)),
            expenses,
        )
    };
    let mut engine = engine();
    engine
        .record(ChangeDescriptor::new(
            Action::Update,
            SectionData::History(vec![
                month(12, 2024, vec![
                    expense("Aluguel", dec!(1500), ExpenseType::Fixed),
                    expense("CDB", dec!(700), ExpenseType::Investment),
                ]),
                month(1, 2025, vec![expense("Aluguel", dec!(1500), ExpenseType::Fixed)]),
                month(11, 2024, vec![]),
            ]),
            ChangeMetadata::new("março 2025"),
        ))
        .unwrap();

    let totals = &engine.consolidated_data().sections.history.yearly_totals;
    let years: Vec<i32> = totals.iter().map(|t| t.year).collect();
    assert_eq!(years, vec![2024, 2025]);
    assert_eq!(totals[0].total_income, dec!(8000));
    assert_eq!(totals[0].total_expenses, dec!(1500));
    assert_eq!(totals[0].total_investments, dec!(700));
    assert_eq!(totals[0].net_balance, dec!(6500));
    assert_eq!(totals[1].net_balance, dec!(2500));
}

#[test]
fn test_csv_layout() {
    let mut engine = engine();
    engine
        .record(
            ChangeDescriptor::new(
                Action::Create,
                SectionData::Expense(vec![expense("Mercado", dec!(87.40), ExpenseType::Variable)]),
                ChangeMetadata::new("março 2025")
                    .with_description("Mercado")
                    .with_amount(dec!(87.40))
                    .with_category("Alimentação"),
            ),
        )
        .unwrap();
    engine.record(income_change(dec!(5000))).unwrap();

    let csv = engine.export_csv().unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();

    assert_eq!(
        lines,
        vec![
            "Timestamp,Section,Action,Description,Amount,Category,Month/Year",
            "10/03/2025 09:00:01,expense,create,Mercado,87.40,Alimentação,março 2025",
            "10/03/2025 09:00:02,income,update,,5000,,março 2025",
        ]
    );
}

#[test]
fn test_reset_month_closes_into_history() {
    let mut engine = engine();
    engine
        .initialize_with_data(
            &Income::new(dec!(5000), dec!(500)),
            &[
                expense("Aluguel", dec!(1500), ExpenseType::Fixed),
                expense("CDB", dec!(1000), ExpenseType::Investment),
            ],
            &[],
        )
        .unwrap();

    let next = MonthYear::new(4, 2025).unwrap();
    let closed = engine.reset_month(next).unwrap();

    assert_eq!(closed.month, "março");
    assert_eq!(closed.total_income, dec!(5500));
    assert_eq!(closed.total_expenses, dec!(1500));
    assert_eq!(closed.remaining_income, dec!(4000));
    assert_eq!(closed.total_investments(), dec!(1000));

    let data = engine.consolidated_data();
    assert_eq!(data.sections.history.months, vec![closed]);
    assert_eq!(data.sections.history.yearly_totals[0].total_investments, dec!(1000));
    assert_eq!(data.sections.monthly.current_month, "abril");
    assert!(data.sections.monthly.monthly_data.expenses.is_empty());

    let last: Vec<_> = engine.logs().skip(4).map(|e| (e.section().as_str(), e.action)).collect();
    assert_eq!(last, vec![("history", Action::Update), ("monthly", Action::Reset)]);
}
