//! Purchase-order reconciliation.
//!
//! A purchase order is not stored on its own: it is the set of chemical rows
//! sharing one PO number. Editing a PO means submitting the full list of rows
//! again. This module works out which stored rows to delete, which to update
//! and which submitted rows are new, then applies those operations without a
//! cross-row transaction: every operation is attempted and reported
//! individually, so the caller can tell a fully applied batch from a partial
//! one.

use crate::{
    core::{
        chemical::{self, ChemicalDraft, ChemicalInput},
        form::{FormValue, deserialize_form_date, non_blank},
    },
    entities::chemical as chemical_entity,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use futures::future::join_all;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, instrument, warn};

/// PO-level form state shared by every row of a purchase order.
///
/// A row that leaves one of these fields blank takes the value from here;
/// a value set on the row itself always wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoFields {
    #[serde(default, rename = "ponumber", alias = "po_number")]
    pub po_number: Option<String>,
    #[serde(
        default,
        rename = "podate",
        alias = "po_date",
        deserialize_with = "deserialize_form_date"
    )]
    pub po_date: Option<NaiveDate>,
    #[serde(default, rename = "vendorname", alias = "vendor_name")]
    pub vendor_name: Option<String>,
    #[serde(default, rename = "enduser", alias = "end_user")]
    pub end_user: Option<String>,
    #[serde(default, rename = "invoiceno", alias = "invoice_no")]
    pub invoice_no: Option<String>,
    #[serde(
        default,
        rename = "invoicedate",
        alias = "invoice_date",
        deserialize_with = "deserialize_form_date"
    )]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, rename = "invoiceamount", alias = "invoice_amount")]
    pub invoice_amount: Option<FormValue>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub invoice_submitted_on: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Default received date for rows that do not carry their own
    #[serde(
        default,
        rename = "receivedon",
        alias = "received_on",
        deserialize_with = "deserialize_form_date"
    )]
    pub received_on: Option<NaiveDate>,
}

impl PoFields {
    /// Takes the PO-level values from the first row of a stored purchase order.
    #[must_use]
    pub fn from_rows(rows: &[chemical_entity::Model]) -> Self {
        rows.first()
            .map(|first| Self {
                po_number: first.po_number.clone(),
                po_date: first.po_date,
                vendor_name: first.vendor_name.clone(),
                end_user: first.end_user.clone(),
                invoice_no: first.invoice_no.clone(),
                invoice_date: first.invoice_date,
                invoice_amount: first.invoice_amount.map(FormValue::Number),
                invoice_submitted_on: first.invoice_submitted_on,
                remarks: first.remarks.clone(),
                received_on: first.received_on,
            })
            .unwrap_or_default()
    }

    /// Fills every blank PO-level field of `draft` from this form state.
    pub fn fill_blanks(&self, draft: &mut ChemicalDraft) {
        fn inherit<T: Clone>(slot: &mut Option<T>, fallback: Option<&T>) {
            if slot.is_none() {
                *slot = fallback.cloned();
            }
        }

        let po_number = non_blank(self.po_number.clone());
        let vendor_name = non_blank(self.vendor_name.clone());
        let end_user = non_blank(self.end_user.clone());
        let invoice_no = non_blank(self.invoice_no.clone());
        let remarks = non_blank(self.remarks.clone());
        let invoice_amount = self.invoice_amount.as_ref().and_then(FormValue::to_number);

        inherit(&mut draft.po_number, po_number.as_ref());
        inherit(&mut draft.po_date, self.po_date.as_ref());
        inherit(&mut draft.vendor_name, vendor_name.as_ref());
        inherit(&mut draft.end_user, end_user.as_ref());
        inherit(&mut draft.invoice_no, invoice_no.as_ref());
        inherit(&mut draft.invoice_date, self.invoice_date.as_ref());
        inherit(&mut draft.invoice_amount, invoice_amount.as_ref());
        inherit(&mut draft.invoice_submitted_on, self.invoice_submitted_on.as_ref());
        inherit(&mut draft.remarks, remarks.as_ref());
        inherit(&mut draft.received_on, self.received_on.as_ref());
    }
}

/// An update of one stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    /// Serial of the stored row
    pub serial_no: i64,
    /// Full replacement contents
    pub draft: ChemicalDraft,
}

/// The operations needed to turn the stored rows of a PO into the submitted rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcilePlan {
    /// PO being edited
    pub po_number: String,
    /// Stored serials no longer submitted, ascending
    pub to_delete: Vec<i64>,
    /// Submitted rows that match a stored serial, in submission order
    pub to_update: Vec<PlannedUpdate>,
    /// Submitted rows without a stored serial, in submission order
    pub to_insert: Vec<ChemicalDraft>,
}

impl ReconcilePlan {
    /// Serials targeted by updates, in submission order.
    #[must_use]
    pub fn update_serials(&self) -> Vec<i64> {
        self.to_update.iter().map(|u| u.serial_no).collect()
    }

    /// Total number of store operations the plan will issue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_delete.len() + self.to_update.len() + self.to_insert.len()
    }

    /// Whether the plan issues no operation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every row that will be written.
    ///
    /// # Errors
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<()> {
        self.to_update
            .iter()
            .map(|u| &u.draft)
            .chain(&self.to_insert)
            .try_for_each(ChemicalDraft::validate)
    }
}

/// Diffs the submitted rows of a PO against the serials currently stored for it.
///
/// Every row is normalized (numbers parsed, serial normalized, derived stock
/// recomputed on write) and blank PO-level fields are inherited from `po`,
/// falling back to `po_number` for the PO number itself. A row whose serial is
/// stored becomes an update; a row without a serial, or with one that is not
/// stored for this PO, becomes an insert that keeps its serial. Stored serials
/// no longer submitted are deleted. When the same stored serial is submitted
/// twice, the later row wins.
#[must_use]
pub fn reconcile(
    po_number: &str,
    prior_serials: &BTreeSet<i64>,
    submitted: Vec<ChemicalInput>,
    po: &PoFields,
) -> ReconcilePlan {
    let mut to_update: Vec<PlannedUpdate> = Vec::new();
    let mut update_index: HashMap<i64, usize> = HashMap::new();
    let mut to_insert = Vec::new();

    for input in submitted {
        let mut draft = ChemicalDraft::from(input);
        po.fill_blanks(&mut draft);
        if draft.po_number.is_none() && !po_number.trim().is_empty() {
            draft.po_number = Some(po_number.trim().to_string());
        }

        match draft.serial_no.filter(|s| prior_serials.contains(s)) {
            Some(serial_no) => {
                if let Some(&slot) = update_index.get(&serial_no) {
                    to_update[slot].draft = draft;
                } else {
                    update_index.insert(serial_no, to_update.len());
                    to_update.push(PlannedUpdate { serial_no, draft });
                }
            }
            None => to_insert.push(draft),
        }
    }

    let to_delete = prior_serials
        .iter()
        .copied()
        .filter(|serial| !update_index.contains_key(serial))
        .collect();

    ReconcilePlan {
        po_number: po_number.to_string(),
        to_delete,
        to_update,
        to_insert,
    }
}

/// Kind of store operation issued during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Delete,
    Update,
    Insert,
}

/// Result of one store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    /// What was attempted
    pub operation: OperationKind,
    /// Serial affected; for inserts, the serial that was assigned or requested
    pub serial_no: Option<i64>,
    /// Whether the operation succeeded
    pub applied: bool,
    /// Failure message when not applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationOutcome {
    fn from_result<T>(
        operation: OperationKind,
        serial_no: Option<i64>,
        result: &Result<T>,
    ) -> Self {
        match result {
            Ok(_) => Self {
                operation,
                serial_no,
                applied: true,
                error: None,
            },
            Err(e) => {
                warn!(?operation, ?serial_no, error = %e, "Reconciliation operation failed");
                Self {
                    operation,
                    serial_no,
                    applied: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Overall state of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every operation succeeded (or there was nothing to do)
    FullyApplied,
    /// Some operations succeeded, some failed
    PartiallyApplied,
    /// Every operation failed
    Failed,
}

/// Per-operation report of an applied reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// PO that was reconciled
    pub po_number: String,
    /// Overall outcome
    pub status: BatchStatus,
    /// One entry per operation: deletes, then updates, then inserts
    pub operations: Vec<OperationOutcome>,
}

impl ReconcileReport {
    fn new(po_number: String, operations: Vec<OperationOutcome>) -> Self {
        let applied = operations.iter().filter(|op| op.applied).count();
        let status = if applied == operations.len() {
            BatchStatus::FullyApplied
        } else if applied == 0 {
            BatchStatus::Failed
        } else {
            BatchStatus::PartiallyApplied
        };
        Self {
            po_number,
            status,
            operations,
        }
    }

    /// Operations that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.operations.iter().filter(|op| !op.applied)
    }
}

/// Issues the operations of a plan against the store.
///
/// Deletes and updates target distinct stored keys and are dispatched together.
/// Inserts follow once that batch has settled, one after another so assigned
/// serials follow submission order. A failing operation never stops the others.
#[instrument(skip(db, plan), fields(po_number = %plan.po_number))]
pub async fn apply_plan(db: &DatabaseConnection, plan: ReconcilePlan) -> ReconcileReport {
    let ReconcilePlan {
        po_number,
        to_delete,
        to_update,
        to_insert,
    } = plan;

    let deletes = to_delete.into_iter().map(|serial_no| async move {
        let result = chemical::delete_chemical(db, serial_no).await;
        OperationOutcome::from_result(OperationKind::Delete, Some(serial_no), &result)
    });
    let updates = to_update.into_iter().map(|update| async move {
        let result = chemical::update_chemical(db, update.serial_no, update.draft).await;
        OperationOutcome::from_result(OperationKind::Update, Some(update.serial_no), &result)
    });

    let (deleted, updated) = futures::join!(join_all(deletes), join_all(updates));

    let mut operations = deleted;
    operations.extend(updated);

    for draft in to_insert {
        let requested = draft.serial_no;
        let result = chemical::insert_chemical(db, draft).await;
        let serial_no = result.as_ref().map_or(requested, |m| Some(m.serial_no));
        operations.push(OperationOutcome::from_result(
            OperationKind::Insert,
            serial_no,
            &result,
        ));
    }

    let report = ReconcileReport::new(po_number, operations);
    info!(status = ?report.status, operations = report.operations.len(), "Reconciliation finished");
    report
}

/// Loads the stored rows of a PO, diffs them against `rows` and applies the result.
///
/// `po_number` names the PO as it is currently stored; `po.po_number` may
/// carry a new number, which is then written to every row.
///
/// # Errors
/// Returns an error, before any row is written, if:
/// - `po_number` is blank
/// - a submitted row has no name
/// - loading the stored rows fails
#[instrument(skip(db, po, rows), fields(rows = rows.len()))]
pub async fn reconcile_po(
    db: &DatabaseConnection,
    po_number: &str,
    po: &PoFields,
    rows: Vec<ChemicalInput>,
) -> Result<ReconcileReport> {
    if po_number.trim().is_empty() {
        return Err(Error::Validation {
            message: "PO number cannot be empty".to_string(),
        });
    }

    let prior_serials: BTreeSet<i64> = chemical::get_chemicals_for_po(db, po_number)
        .await?
        .into_iter()
        .map(|row| row.serial_no)
        .collect();

    let plan = reconcile(po_number, &prior_serials, rows, po);
    plan.validate()?;
    if plan.is_empty() {
        info!("Nothing to reconcile");
        return Ok(ReconcileReport::new(plan.po_number, Vec::new()));
    }

    info!(
        operations = plan.len(),
        deletes = plan.to_delete.len(),
        updates = plan.to_update.len(),
        inserts = plan.to_insert.len(),
        "Reconciling purchase order"
    );
    Ok(apply_plan(db, plan).await)
}
