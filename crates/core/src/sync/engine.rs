//! The sync engine: change log, aggregation and fan-out behind one handle.

use chrono::FixedOffset;
use finsync_shared::config::{SyncConfig, SyncConfigError};
use finsync_shared::types::ChangeId;
use tracing::{debug, warn};

use super::aggregation::AggregationService;
use super::changelog::{
    Action, ChangeDescriptor, ChangeLog, ChangeLogEntry, ChangeMetadata, SectionData,
};
use super::clock::{Clock, SystemClock};
use super::error::SyncError;
use super::export::{check_timestamp_format, export_csv};
use super::notify::{Subscriber, Subscribers, Subscription};
use super::snapshot::ConsolidatedSpreadsheet;
use crate::ledger::{
    validate_expenses, validate_income, validate_month, Expense, Income, LedgerValidationError,
    MonthYear, MonthlyData,
};

/// Sections touched by income and expense changes besides their own.
const MONTHLY_AND_SUMMARY: [&str; 2] = ["monthly", "summary"];

/// Consolidated ledger state driven by reported changes.
///
/// Every successful [`record`](Self::record) appends one log entry, updates
/// one section, recomputes the summary and notifies every subscriber once,
/// before returning. The engine is single-threaded (`!Send`).
pub struct SyncEngine {
    config: SyncConfig,
    offset: FixedOffset,
    clock: Box<dyn Clock>,
    snapshot: ConsolidatedSpreadsheet,
    log: ChangeLog,
    subscribers: Subscribers,
}

impl SyncEngine {
    /// Creates an engine using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidConfig` or `SyncError::InvalidTimestampFormat`
    /// if `config` is inconsistent.
    pub fn create(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Creates an engine reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidConfig` or `SyncError::InvalidTimestampFormat`
    /// if `config` is inconsistent.
    pub fn with_clock(config: &SyncConfig, clock: Box<dyn Clock>) -> Result<Self, SyncError> {
        config.validate()?;
        let offset = config
            .display_offset()
            .ok_or(SyncConfigError::InvalidOffset(config.display_utc_offset_minutes))?;
        check_timestamp_format(&config.csv_timestamp_format)?;

        let now = clock.now();
        let period = MonthYear::containing(&now.with_timezone(&offset));
        debug!(
            period = %period,
            log_retention = config.log_retention,
            strict_validation = config.strict_validation,
            "Sync engine created"
        );

        Ok(Self {
            config: config.clone(),
            offset,
            clock,
            snapshot: ConsolidatedSpreadsheet::initial(now, period),
            log: ChangeLog::with_capacity(config.log_retention),
            subscribers: Subscribers::new(),
        })
    }

    /// Records one change and propagates it.
    ///
    /// In lenient mode an invalid change is logged and processed as given;
    /// in strict mode it is rejected and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` in strict mode for invalid data.
    pub fn record(&mut self, change: ChangeDescriptor) -> Result<ChangeId, SyncError> {
        if let Err(err) = change.data.validate() {
            if self.config.strict_validation {
                return Err(err.into());
            }
            warn!(section = %change.section(), error = %err, "Recording invalid change");
        }

        let entry = ChangeLogEntry::new(ChangeId::new(), self.clock.now(), change);
        let (id, section, action, now) = (entry.id, entry.section(), entry.action, entry.timestamp);

        AggregationService::apply(&mut self.snapshot.sections, &entry.data, now);
        self.snapshot.summary = AggregationService::recompute(&self.snapshot.sections, now);

        if let Some(evicted) = self.log.push(entry) {
            debug!(change_id = %evicted.id, "Evicted change-log entry");
        }
        self.snapshot.logs = self.log.recent(self.config.log_view_limit);
        debug!(change_id = %id, section = %section, action = %action, "Recorded change");

        let report = self.subscribers.notify(&self.snapshot);
        if report.failed > 0 {
            debug!(change_id = %id, failed = report.failed, "Notified with failures");
        }
        Ok(id)
    }

    /// Seeds the engine from persisted data.
    ///
    /// Records, in order: income, expenses, investments (from the same
    /// expense list) and history. Subscribers are notified after each.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` in strict mode if any input is invalid;
    /// nothing is recorded in that case.
    pub fn initialize_with_data(
        &mut self,
        income: &Income,
        expenses: &[Expense],
        history: &[MonthlyData],
    ) -> Result<(), SyncError> {
        if self.config.strict_validation {
            validate_income(income)?;
            validate_expenses(expenses)?;
            history.iter().try_for_each(validate_month)?;
        }

        let label = self.current_period().label();
        let metadata =
            |description: &str| ChangeMetadata::new(label.clone()).with_description(description);

        self.record(
            ChangeDescriptor::new(
                Action::Update,
                SectionData::Income(*income),
                metadata("Inicialização da renda"),
            )
            .with_related(MONTHLY_AND_SUMMARY),
        )?;
        self.record(
            ChangeDescriptor::new(
                Action::Update,
                SectionData::Expense(expenses.to_vec()),
                metadata("Inicialização das despesas"),
            )
            .with_related(MONTHLY_AND_SUMMARY),
        )?;
        self.record(
            ChangeDescriptor::new(
                Action::Update,
                SectionData::Investment(expenses.to_vec()),
                metadata("Inicialização dos investimentos"),
            )
            .with_related(["summary"]),
        )?;
        self.record(
            ChangeDescriptor::new(
                Action::Update,
                SectionData::History(history.to_vec()),
                metadata("Inicialização do histórico"),
            )
            .with_related(["summary"]),
        )?;
        Ok(())
    }

    /// Closes the month in progress and starts `next`.
    ///
    /// The closed month holds the monthly income, its non-investment expenses
    /// and the current investment transactions. It is appended to history
    /// (`history/update`), then the monthly section is replaced by an empty
    /// `next` (`monthly/reset`). Income and expense sections are left alone;
    /// the caller reports the new month's data as it arrives.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` if the current month name is not
    /// recognised, or in strict mode if the closed month is invalid.
    pub fn reset_month(&mut self, next: MonthYear) -> Result<MonthlyData, SyncError> {
        let sections = &self.snapshot.sections;
        let monthly = &sections.monthly;
        let period = MonthYear::from_name(&monthly.current_month, monthly.current_year)
            .ok_or_else(|| LedgerValidationError::UnknownMonthName(monthly.current_month.clone()))?;

        let expenses: Vec<Expense> = monthly
            .monthly_data
            .expenses
            .iter()
            .filter(|e| !e.is_investment())
            .chain(&sections.investments.transactions)
            .cloned()
            .collect();
        let closed = MonthlyData::close(period, monthly.monthly_data.income, expenses);

        let mut months = sections.history.months.clone();
        months.push(closed.clone());

        self.record(
            ChangeDescriptor::new(
                Action::Update,
                SectionData::History(months),
                ChangeMetadata::new(period.label())
                    .with_description(format!("Fechamento de {}", period.label()))
                    .with_amount(closed.remaining_income),
            )
            .with_related(["summary"]),
        )?;
        self.record(
            ChangeDescriptor::new(
                Action::Reset,
                SectionData::Monthly(MonthlyData::empty(next)),
                ChangeMetadata::new(next.label())
                    .with_description(format!("Início de {}", next.label())),
            )
            .with_related(["summary"]),
        )?;
        Ok(closed)
    }

    /// Registers a subscriber; it receives every later snapshot.
    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) -> Subscription {
        self.subscribers.subscribe(subscriber)
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Current snapshot.
    #[must_use]
    pub const fn consolidated_data(&self) -> &ConsolidatedSpreadsheet {
        &self.snapshot
    }

    /// Every retained change-log entry, oldest first.
    pub fn logs(&self) -> impl Iterator<Item = &ChangeLogEntry> {
        self.log.iter()
    }

    /// Number of entries evicted from the change log so far.
    #[must_use]
    pub const fn evicted_count(&self) -> u64 {
        self.log.evicted()
    }

    /// The month containing the clock's current time, in the display offset.
    #[must_use]
    pub fn current_period(&self) -> MonthYear {
        MonthYear::containing(&self.clock.now().with_timezone(&self.offset))
    }

    /// Renders the retained change log as CSV.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Export` or `SyncError::ExportEncoding` if the CSV
    /// writer fails.
    pub fn export_csv(&self) -> Result<String, SyncError> {
        export_csv(self.log.iter(), self.offset, &self.config.csv_timestamp_format)
    }

    /// Tears the engine down.
    ///
    /// Outstanding [`Subscription`] handles become no-ops.
    pub fn dispose(mut self) {
        self.subscribers.clear();
        self.log.clear();
        debug!("Sync engine disposed");
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("log_len", &self.log.len())
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}
