//! Chemical entity - One line item received against a purchase order.
//!
//! Each row carries its own stock figures plus the purchase-order fields
//! (vendor, dates, invoice data) copied onto every row of the same PO.
//! Column and JSON names are the ones the web frontend reads and writes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chemical database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chemicals")]
pub struct Model {
    /// Unique serial number, the only key used for updates and deletes
    #[sea_orm(primary_key)]
    pub serial_no: i64,
    /// Chemical name
    pub name: String,
    /// Unit size of a single purchased unit (grams, ml, count)
    pub sku: f64,
    /// Number of units received
    pub quantity: f64,
    /// `sku * quantity`
    pub total_quantity: f64,
    /// Amount already used
    pub consumed: f64,
    /// `max(0, total_quantity - consumed)`
    pub actual_stock: f64,
    #[sea_orm(column_name = "receivedon")]
    #[serde(rename = "receivedon")]
    pub received_on: Option<Date>,
    #[sea_orm(column_name = "enduser")]
    #[serde(rename = "enduser")]
    pub end_user: Option<String>,
    #[sea_orm(column_name = "vendorname")]
    #[serde(rename = "vendorname")]
    pub vendor_name: Option<String>,
    /// Purchase order this row was received against; rows sharing it form one batch
    #[sea_orm(column_name = "ponumber", indexed)]
    #[serde(rename = "ponumber")]
    pub po_number: Option<String>,
    #[sea_orm(column_name = "podate")]
    #[serde(rename = "podate")]
    pub po_date: Option<Date>,
    #[sea_orm(column_name = "invoiceno")]
    #[serde(rename = "invoiceno")]
    pub invoice_no: Option<String>,
    #[sea_orm(column_name = "invoicedate")]
    #[serde(rename = "invoicedate")]
    pub invoice_date: Option<Date>,
    #[sea_orm(column_name = "invoiceamount")]
    #[serde(rename = "invoiceamount")]
    pub invoice_amount: Option<f64>,
    pub invoice_submitted_on: Option<Date>,
    pub remarks: Option<String>,
}

/// Chemicals have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
