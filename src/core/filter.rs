//! In-memory filtering of chemical records for the listing page.
//!
//! Filtering never touches the database: callers load the records once and
//! narrow them here. All active criteria must match, and the output keeps the
//! input order.

use crate::entities::chemical;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// An optional inclusive range of calendar dates.
///
/// Dates carry no time of day, so an inclusive upper bound already covers
/// the whole `to` day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub from: Option<NaiveDate>,
    /// Last day included
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// A range constrains records as soon as either bound is set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Whether `date` passes this range. A missing date fails any active range.
    #[must_use]
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Criteria for narrowing the chemical list. Empty fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive search over name, PO number, invoice number and serial
    pub text: Option<String>,
    /// Exact end user
    pub end_user: Option<String>,
    /// Exact vendor
    pub vendor_name: Option<String>,
    /// Exact PO number
    pub po_number: Option<String>,
    /// Range on the received date
    pub received: DateRange,
    /// Range on the PO date
    pub po_date: DateRange,
    /// Range on the invoice submission date
    pub invoice_submitted: DateRange,
}

impl FilterSpec {
    /// Whether no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_text().is_none()
            && active(self.end_user.as_ref()).is_none()
            && active(self.vendor_name.as_ref()).is_none()
            && active(self.po_number.as_ref()).is_none()
            && !self.received.is_active()
            && !self.po_date.is_active()
            && !self.invoice_submitted.is_active()
    }

    /// Whether `record` satisfies every active criterion.
    #[must_use]
    pub fn matches(&self, record: &chemical::Model) -> bool {
        if let Some(needle) = self.search_text() {
            let haystack = format!(
                "{} {} {} {}",
                record.name,
                record.po_number.as_deref().unwrap_or_default(),
                record.invoice_no.as_deref().unwrap_or_default(),
                record.serial_no
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        equals(self.end_user.as_ref(), record.end_user.as_ref())
            && equals(self.vendor_name.as_ref(), record.vendor_name.as_ref())
            && equals(self.po_number.as_ref(), record.po_number.as_ref())
            && self.received.admits(record.received_on)
            && self.po_date.admits(record.po_date)
            && self.invoice_submitted.admits(record.invoice_submitted_on)
    }

    fn search_text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

fn active(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.is_empty())
}

fn equals(wanted: Option<&String>, actual: Option<&String>) -> bool {
    active(wanted).is_none_or(|wanted| actual == Some(wanted))
}

/// Returns the records matching `spec`, in their original order.
#[must_use]
pub fn filter_chemicals(records: &[chemical::Model], spec: &FilterSpec) -> Vec<chemical::Model> {
    records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect()
}

/// Distinct values offered by the listing page's dropdown filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Sorted, distinct, non-empty end users
    pub end_users: Vec<String>,
    /// Sorted, distinct, non-empty vendors
    pub vendor_names: Vec<String>,
    /// Sorted, distinct, non-empty PO numbers
    pub po_numbers: Vec<String>,
}

/// Collects the dropdown options from a set of records.
#[must_use]
pub fn filter_options(records: &[chemical::Model]) -> FilterOptions {
    fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
        values
            .flatten()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    FilterOptions {
        end_users: distinct(records.iter().map(|r| r.end_user.as_ref())),
        vendor_names: distinct(records.iter().map(|r| r.vendor_name.as_ref())),
        po_numbers: distinct(records.iter().map(|r| r.po_number.as_ref())),
    }
}
