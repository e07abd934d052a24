//! Change descriptors and the bounded change log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use finsync_shared::types::ChangeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{
    validate_expenses, validate_income, validate_month, Expense, Income, LedgerValidationError,
    MonthlyData,
};

/// Ledger section a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Salary and extra income.
    Income,
    /// Fixed and variable expenses.
    Expense,
    /// Investment transactions.
    Investment,
    /// The month in progress.
    Monthly,
    /// Closed months.
    History,
}

impl Section {
    /// Lower-case name, as written to logs and CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
            Self::Monthly => "monthly",
            Self::History => "history",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutation reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A record was added.
    Create,
    /// A record or list was replaced.
    Update,
    /// A record was removed.
    Delete,
    /// The section was reset (e.g. month rollover).
    Reset,
}

impl Action {
    /// Lower-case name, as written to logs and CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative data carried by a change; the variant decides the section.
///
/// Expense and investment changes both carry the full expense list; each
/// section picks the expense types it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "lowercase")]
pub enum SectionData {
    /// New income.
    Income(Income),
    /// Current expense list.
    Expense(Vec<Expense>),
    /// Current expense list, read for its investment entries.
    Investment(Vec<Expense>),
    /// Replacement month in progress.
    Monthly(MonthlyData),
    /// Closed months.
    History(Vec<MonthlyData>),
}

impl SectionData {
    /// Section this payload updates.
    #[must_use]
    pub const fn section(&self) -> Section {
        match self {
            Self::Income(_) => Section::Income,
            Self::Expense(_) => Section::Expense,
            Self::Investment(_) => Section::Investment,
            Self::Monthly(_) => Section::Monthly,
            Self::History(_) => Section::History,
        }
    }

    /// Checks the payload against the ledger rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule broken by the payload.
    pub fn validate(&self) -> Result<(), LedgerValidationError> {
        match self {
            Self::Income(income) => validate_income(income),
            Self::Expense(expenses) | Self::Investment(expenses) => validate_expenses(expenses),
            Self::Monthly(month) => validate_month(month),
            Self::History(months) => months.iter().try_for_each(validate_month),
        }
    }
}

/// Descriptive fields attached to a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMetadata {
    /// User who made the change, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Month label, e.g. "outubro 2026".
    pub month_year: String,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Amount involved, for single-record changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Category involved, for single-record changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ChangeMetadata {
    /// Metadata with only the month label set.
    #[must_use]
    pub fn new(month_year: impl Into<String>) -> Self {
        Self {
            month_year: month_year.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A change as reported by a caller, before the log assigns id and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDescriptor {
    /// Kind of mutation.
    pub action: Action,
    /// Authoritative section data after the mutation.
    pub data: SectionData,
    /// Other sections (or views) affected, informational only.
    pub related_sections: Vec<String>,
    /// Descriptive fields.
    pub metadata: ChangeMetadata,
}

impl ChangeDescriptor {
    /// Creates a descriptor with no related sections.
    #[must_use]
    pub fn new(action: Action, data: SectionData, metadata: ChangeMetadata) -> Self {
        Self {
            action,
            data,
            related_sections: Vec::new(),
            metadata,
        }
    }

    /// Sets the related sections.
    #[must_use]
    pub fn with_related<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// Section this change updates.
    #[must_use]
    pub const fn section(&self) -> Section {
        self.data.section()
    }
}

/// A recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Unique ID assigned at record time.
    pub id: ChangeId,
    /// Record time.
    pub timestamp: DateTime<Utc>,
    /// Kind of mutation.
    pub action: Action,
    /// Section and its data.
    #[serde(flatten)]
    pub data: SectionData,
    /// Other sections affected.
    pub related_sections: Vec<String>,
    /// Descriptive fields.
    pub metadata: ChangeMetadata,
}

impl ChangeLogEntry {
    /// Stamps a descriptor with its id and time.
    #[must_use]
    pub fn new(id: ChangeId, timestamp: DateTime<Utc>, change: ChangeDescriptor) -> Self {
        Self {
            id,
            timestamp,
            action: change.action,
            data: change.data,
            related_sections: change.related_sections,
            metadata: change.metadata,
        }
    }

    /// Section this entry updated.
    #[must_use]
    pub const fn section(&self) -> Section {
        self.data.section()
    }
}

/// Append-only change log with a fixed retention capacity.
///
/// Once full, each append evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    entries: VecDeque<ChangeLogEntry>,
    capacity: usize,
    evicted: u64,
}

impl ChangeLog {
    /// Creates an empty log retaining at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            evicted: 0,
        }
    }

    /// Appends an entry, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, entry: ChangeLogEntry) -> Option<ChangeLogEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.evicted += 1;
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// The `limit` most recent entries, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ChangeLogEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Every retained entry, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeLogEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retention capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries evicted since creation.
    #[must_use]
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Drops every retained entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
