//! Purchase-order endpoints used by the multi-row edit form.

use crate::{
    api::{
        ApiState,
        extract::{AppJson, AppPath},
    },
    core::{
        chemical::{self, ChemicalInput},
        reconcile::{self, BatchStatus, PoFields, ReconcileReport},
    },
    entities::chemical as chemical_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// A stored purchase order: its PO-level fields and all of its rows.
#[derive(Debug, Serialize)]
pub struct PurchaseOrderResponse {
    /// PO-level values, taken from the first row
    pub po: PoFields,
    pub rows: Vec<chemical_entity::Model>,
}

/// Body of `PUT /purchase-orders/:po_number`.
#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseOrderRequest {
    #[serde(default)]
    pub po: PoFields,
    #[serde(default)]
    pub rows: Vec<ChemicalInput>,
}

/// `GET /purchase-orders/:po_number`
pub async fn get_purchase_order(
    State(state): State<ApiState>,
    AppPath(po_number): AppPath<String>,
) -> Result<Json<PurchaseOrderResponse>> {
    let rows = chemical::get_chemicals_for_po(&state.database, &po_number).await?;
    if rows.is_empty() {
        return Err(Error::PurchaseOrderNotFound { po_number });
    }
    Ok(Json(PurchaseOrderResponse {
        po: PoFields::from_rows(&rows),
        rows,
    }))
}

/// `PUT /purchase-orders/:po_number` - reconciles the stored rows with the submitted ones.
///
/// Answers 200 when every operation succeeded, 207 when only some did and
/// 500 when none did; the body always carries the per-operation report.
pub async fn update_purchase_order(
    State(state): State<ApiState>,
    AppPath(po_number): AppPath<String>,
    AppJson(request): AppJson<UpdatePurchaseOrderRequest>,
) -> Result<(StatusCode, Json<ReconcileReport>)> {
    if request.rows.is_empty()
        && chemical::get_chemicals_for_po(&state.database, &po_number)
            .await?
            .is_empty()
    {
        return Err(Error::PurchaseOrderNotFound { po_number });
    }

    let report =
        reconcile::reconcile_po(&state.database, &po_number, &request.po, request.rows).await?;
    let status = match report.status {
        BatchStatus::FullyApplied => StatusCode::OK,
        BatchStatus::PartiallyApplied => StatusCode::MULTI_STATUS,
        BatchStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(report)))
}
