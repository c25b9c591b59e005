//! Chemical record store - create, read, update and delete rows of the `chemicals` table.
//!
//! Rows are keyed only by their serial number. A serial supplied by the caller
//! is stored as-is; otherwise the database assigns the next one. The derived
//! stock columns are always recomputed from `sku`, `quantity` and `consumed`
//! before a row is written.

use crate::{
    core::{
        form::{FormValue, deserialize_form_date, non_blank, number_or_zero},
        quantity::{self, StockLevels},
    },
    entities::{Chemical, chemical},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, DbBackend, QueryOrder, Set, SqlErr, Statement,
    TransactionTrait, prelude::*,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// One chemical row as submitted by the add/edit forms.
///
/// Numbers may arrive as text and any derived stock figures in the payload
/// are ignored. Field names match the JSON used by the frontend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChemicalInput {
    #[serde(default)]
    pub serial_no: Option<FormValue>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<FormValue>,
    #[serde(default)]
    pub quantity: Option<FormValue>,
    #[serde(default)]
    pub consumed: Option<FormValue>,
    #[serde(
        default,
        rename = "receivedon",
        alias = "received_on",
        deserialize_with = "deserialize_form_date"
    )]
    pub received_on: Option<NaiveDate>,
    #[serde(default, rename = "enduser", alias = "end_user")]
    pub end_user: Option<String>,
    #[serde(default, rename = "vendorname", alias = "vendor_name")]
    pub vendor_name: Option<String>,
    #[serde(default, rename = "ponumber", alias = "po_number")]
    pub po_number: Option<String>,
    #[serde(
        default,
        rename = "podate",
        alias = "po_date",
        deserialize_with = "deserialize_form_date"
    )]
    pub po_date: Option<NaiveDate>,
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
}

/// A normalized chemical row ready to be written.
///
/// Built from a [`ChemicalInput`]: numbers are parsed (unparseable as zero),
/// blank text becomes `None` and the serial number is normalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChemicalDraft {
    /// Caller-supplied serial, if any
    pub serial_no: Option<i64>,
    pub name: String,
    pub sku: f64,
    pub quantity: f64,
    pub consumed: f64,
    pub received_on: Option<NaiveDate>,
    pub end_user: Option<String>,
    pub vendor_name: Option<String>,
    pub po_number: Option<String>,
    pub po_date: Option<NaiveDate>,
    pub invoice_no: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_amount: Option<f64>,
    pub invoice_submitted_on: Option<NaiveDate>,
    pub remarks: Option<String>,
}

impl From<ChemicalInput> for ChemicalDraft {
    fn from(input: ChemicalInput) -> Self {
        Self {
            serial_no: input.serial_no.as_ref().and_then(FormValue::to_serial),
            name: input.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            sku: number_or_zero(input.sku.as_ref()),
            quantity: number_or_zero(input.quantity.as_ref()),
            consumed: number_or_zero(input.consumed.as_ref()),
            received_on: input.received_on,
            end_user: non_blank(input.end_user),
            vendor_name: non_blank(input.vendor_name),
            po_number: non_blank(input.po_number),
            po_date: input.po_date,
            invoice_no: non_blank(input.invoice_no),
            invoice_date: input.invoice_date,
            invoice_amount: input.invoice_amount.as_ref().and_then(FormValue::to_number),
            invoice_submitted_on: input.invoice_submitted_on,
            remarks: non_blank(input.remarks),
        }
    }
}

impl From<&chemical::Model> for ChemicalDraft {
    fn from(model: &chemical::Model) -> Self {
        Self {
            serial_no: Some(model.serial_no),
            name: model.name.clone(),
            sku: model.sku,
            quantity: model.quantity,
            consumed: model.consumed,
            received_on: model.received_on,
            end_user: model.end_user.clone(),
            vendor_name: model.vendor_name.clone(),
            po_number: model.po_number.clone(),
            po_date: model.po_date,
            invoice_no: model.invoice_no.clone(),
            invoice_date: model.invoice_date,
            invoice_amount: model.invoice_amount,
            invoice_submitted_on: model.invoice_submitted_on,
            remarks: model.remarks.clone(),
        }
    }
}

impl ChemicalDraft {
    /// Derived stock figures for this row.
    #[must_use]
    pub fn stock(&self) -> StockLevels {
        quantity::compute(self.sku, self.quantity, self.consumed)
    }

    /// Checks the fields a row cannot be stored without.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the name is blank or the amounts are
    /// so large that the total quantity overflows.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Chemical name cannot be empty".to_string(),
            });
        }
        if !self.stock().total_quantity.is_finite() {
            return Err(Error::Validation {
                message: format!(
                    "Total quantity of '{}' is out of range (sku {} x quantity {})",
                    self.name, self.sku, self.quantity
                ),
            });
        }
        Ok(())
    }

    /// Copies every column except the serial number onto `model`,
    /// recomputing the derived stock columns.
    fn assign_to(self, model: &mut chemical::ActiveModel) {
        let stock = self.stock();
        model.name = Set(self.name);
        model.sku = Set(self.sku);
        model.quantity = Set(self.quantity);
        model.total_quantity = Set(stock.total_quantity);
        model.consumed = Set(self.consumed);
        model.actual_stock = Set(stock.actual_stock);
        model.received_on = Set(self.received_on);
        model.end_user = Set(self.end_user);
        model.vendor_name = Set(self.vendor_name);
        model.po_number = Set(self.po_number);
        model.po_date = Set(self.po_date);
        model.invoice_no = Set(self.invoice_no);
        model.invoice_date = Set(self.invoice_date);
        model.invoice_amount = Set(self.invoice_amount);
        model.invoice_submitted_on = Set(self.invoice_submitted_on);
        model.remarks = Set(self.remarks);
    }
}

/// Retrieves every chemical, ordered by serial number ascending.
pub async fn list_all_chemicals(db: &DatabaseConnection) -> Result<Vec<chemical::Model>> {
    Chemical::find()
        .order_by_asc(chemical::Column::SerialNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a chemical by its serial number.
pub async fn get_chemical_by_serial(
    db: &DatabaseConnection,
    serial_no: i64,
) -> Result<Option<chemical::Model>> {
    Chemical::find_by_id(serial_no)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every row of one purchase order, ordered by serial number.
pub async fn get_chemicals_for_po(
    db: &DatabaseConnection,
    po_number: &str,
) -> Result<Vec<chemical::Model>> {
    Chemical::find()
        .filter(chemical::Column::PoNumber.eq(po_number))
        .order_by_asc(chemical::Column::SerialNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts one chemical row and returns it with its serial number.
///
/// # Errors
/// Returns an error if:
/// - The name is blank
/// - The supplied serial number already exists
/// - The database insert fails
#[instrument(skip(db, draft), fields(serial_no = ?draft.serial_no))]
pub async fn insert_chemical<C>(db: &C, draft: ChemicalDraft) -> Result<chemical::Model>
where
    C: ConnectionTrait,
{
    draft.validate()?;

    let requested_serial = draft.serial_no;
    if let Some(serial_no) = requested_serial {
        if Chemical::find_by_id(serial_no).one(db).await?.is_some() {
            return Err(Error::DuplicateSerial { serial_no });
        }
    }

    let mut model = chemical::ActiveModel {
        serial_no: requested_serial.map_or(NotSet, Set),
        ..Default::default()
    };
    draft.assign_to(&mut model);

    let inserted = model
        .insert(db)
        .await
        .map_err(|e| map_insert_error(e, requested_serial))?;
    if requested_serial.is_some() {
        if let Some(sync) = serial_sequence_sync(db.get_database_backend()) {
            db.execute(sync).await?;
        }
    }
    debug!(serial_no = inserted.serial_no, "Inserted chemical");
    Ok(inserted)
}

/// Inserts a batch of chemical rows in one database transaction.
///
/// Either every row is stored or none is. Returns the serial numbers in
/// submission order.
///
/// # Errors
/// Returns an error if the batch is empty, any row is invalid or uses a
/// taken serial number, or the database fails.
#[instrument(skip(db, drafts), fields(count = drafts.len()))]
pub async fn insert_chemicals(
    db: &DatabaseConnection,
    drafts: Vec<ChemicalDraft>,
) -> Result<Vec<i64>> {
    if drafts.is_empty() {
        return Err(Error::Validation {
            message: "chemicals array required".to_string(),
        });
    }
    for draft in &drafts {
        draft.validate()?;
    }

    let txn = db.begin().await?;
    let mut serials = Vec::with_capacity(drafts.len());
    for draft in drafts {
        serials.push(insert_chemical(&txn, draft).await?.serial_no);
    }
    txn.commit().await?;

    info!(?serials, "Inserted chemical batch");
    Ok(serials)
}

/// Replaces every column of an existing row; the serial number never changes.
///
/// # Errors
/// Returns an error if:
/// - The name is blank
/// - No row has this serial number
/// - The database update fails
#[instrument(skip(db, draft))]
pub async fn update_chemical(
    db: &DatabaseConnection,
    serial_no: i64,
    draft: ChemicalDraft,
) -> Result<chemical::Model> {
    draft.validate()?;

    let mut chemical: chemical::ActiveModel = Chemical::find_by_id(serial_no)
        .one(db)
        .await?
        .ok_or(Error::ChemicalNotFound { serial_no })?
        .into();

    draft.assign_to(&mut chemical);

    chemical.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => Error::ChemicalNotFound { serial_no },
        other => other.into(),
    })
}

/// Deletes a row by serial number.
///
/// Deleting a serial that does not exist is not an error; the return value
/// tells whether a row was actually removed.
#[instrument(skip(db))]
pub async fn delete_chemical(db: &DatabaseConnection, serial_no: i64) -> Result<bool> {
    let result = Chemical::delete_by_id(serial_no).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Statement moving the serial sequence past the highest stored serial.
///
/// Postgres does not advance its sequence for explicitly supplied keys, so
/// the next assigned serial would collide; `SQLite` always assigns past the
/// current maximum and needs nothing.
fn serial_sequence_sync(backend: DbBackend) -> Option<Statement> {
    matches!(backend, DbBackend::Postgres).then(|| {
        Statement::from_string(
            backend,
            "SELECT setval(pg_get_serial_sequence('chemicals', 'serial_no'), \
             (SELECT MAX(serial_no) FROM chemicals))",
        )
    })
}

fn map_insert_error(err: DbErr, requested_serial: Option<i64>) -> Error {
    match (err.sql_err(), requested_serial) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(serial_no)) => {
            Error::DuplicateSerial { serial_no }
        }
        _ => err.into(),
    }
}
