//! Change-driven consolidation of the ledger.
//!
//! Callers report changes to a [`SyncEngine`]; it logs each one, re-derives
//! the affected section and the summary, and pushes the resulting
//! [`ConsolidatedSpreadsheet`] to every subscriber.

pub mod aggregation;
pub mod changelog;
pub mod clock;
pub mod engine;
pub mod error;
pub mod export;
pub mod notify;
pub mod snapshot;

#[cfg(test)]
mod aggregation_props;

pub use aggregation::AggregationService;
pub use changelog::{
    Action, ChangeDescriptor, ChangeLog, ChangeLogEntry, ChangeMetadata, Section, SectionData,
};
pub use clock::{Clock, SystemClock};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use export::{export_csv, CSV_HEADERS};
pub use notify::{NotifyReport, Subscriber, SubscriberError, Subscribers, Subscription};
pub use snapshot::{
    CategoryTotal, ConsolidatedSpreadsheet, ExpenseSection, HistorySection, IncomeSection,
    IncomeUsage, InvestmentSection, MonthlySection, PaymentMethodTotals, Sections, Summary,
    YearlyTotal,
};
