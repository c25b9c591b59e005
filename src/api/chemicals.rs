//! Chemical endpoints - list with filters, read, batch create, update and delete.

use crate::{
    api::{
        ApiState, MessageResponse,
        extract::{AppJson, AppPath, AppQuery},
    },
    core::{
        chemical::{self, ChemicalDraft, ChemicalInput},
        filter::{self, DateRange, FilterOptions, FilterSpec},
        form::deserialize_form_date,
    },
    entities::chemical as chemical_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Query string accepted by `GET /chemicals`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text search
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub end_user: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub received_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub received_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub po_date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub po_date_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub invoice_submitted_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_form_date")]
    pub invoice_submitted_to: Option<NaiveDate>,
}

impl From<ListQuery> for FilterSpec {
    fn from(query: ListQuery) -> Self {
        Self {
            text: query.text,
            end_user: query.end_user,
            vendor_name: query.vendor_name,
            po_number: query.po_number,
            received: DateRange::new(query.received_from, query.received_to),
            po_date: DateRange::new(query.po_date_from, query.po_date_to),
            invoice_submitted: DateRange::new(
                query.invoice_submitted_from,
                query.invoice_submitted_to,
            ),
        }
    }
}

/// Body of `POST /chemicals`.
#[derive(Debug, Deserialize)]
pub struct CreateChemicalsRequest {
    /// Rows to store; missing or `null` is treated as an empty batch
    #[serde(default)]
    pub chemicals: Option<Vec<ChemicalInput>>,
}

/// Response of `POST /chemicals`.
#[derive(Debug, Serialize)]
pub struct CreateChemicalsResponse {
    pub message: String,
    /// Serial numbers of the stored rows, in submission order
    pub serials: Vec<i64>,
}

/// `GET /chemicals` - every row, or the rows matching the query filters.
pub async fn list_chemicals(
    State(state): State<ApiState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<chemical_entity::Model>>> {
    let records = chemical::list_all_chemicals(&state.database).await?;
    let spec = FilterSpec::from(query);
    if spec.is_empty() {
        return Ok(Json(records));
    }
    Ok(Json(filter::filter_chemicals(&records, &spec)))
}

/// `GET /chemicals/:serial_no`
pub async fn get_chemical(
    State(state): State<ApiState>,
    AppPath(serial_no): AppPath<i64>,
) -> Result<Json<chemical_entity::Model>> {
    chemical::get_chemical_by_serial(&state.database, serial_no)
        .await?
        .map(Json)
        .ok_or(Error::ChemicalNotFound { serial_no })
}

/// `POST /chemicals` - stores a batch of rows in one transaction.
pub async fn create_chemicals(
    State(state): State<ApiState>,
    AppJson(request): AppJson<CreateChemicalsRequest>,
) -> Result<(StatusCode, Json<CreateChemicalsResponse>)> {
    let drafts = request
        .chemicals
        .unwrap_or_default()
        .into_iter()
        .map(ChemicalDraft::from)
        .collect();
    let serials = chemical::insert_chemicals(&state.database, drafts).await?;
    info!(count = serials.len(), "Chemicals added");

    Ok((
        StatusCode::CREATED,
        Json(CreateChemicalsResponse {
            message: "Chemicals added successfully".to_string(),
            serials,
        }),
    ))
}

/// `PUT /chemicals/:serial_no` - replaces a row; any serial in the body is ignored.
pub async fn update_chemical(
    State(state): State<ApiState>,
    AppPath(serial_no): AppPath<i64>,
    AppJson(input): AppJson<ChemicalInput>,
) -> Result<Json<chemical_entity::Model>> {
    let draft = ChemicalDraft::from(input);
    let updated = chemical::update_chemical(&state.database, serial_no, draft).await?;
    Ok(Json(updated))
}

/// `DELETE /chemicals/:serial_no` - succeeds whether or not the row existed.
pub async fn delete_chemical(
    State(state): State<ApiState>,
    AppPath(serial_no): AppPath<i64>,
) -> Result<Json<MessageResponse>> {
    let removed = chemical::delete_chemical(&state.database, serial_no).await?;
    let message = if removed {
        "Chemical deleted successfully"
    } else {
        "Chemical already absent"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// `GET /filter-options` - dropdown values for the listing page.
pub async fn filter_options(State(state): State<ApiState>) -> Result<Json<FilterOptions>> {
    let records = chemical::list_all_chemicals(&state.database).await?;
    Ok(Json(filter::filter_options(&records)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_get_chemicals() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/chemicals",
            Some(json!({
                "chemicals": [
                    {"name": "Acetone", "sku": "500", "quantity": 3, "consumed": "700",
                     "total_quantity": 99, "actual_stock": 99, "ponumber": "PO-1"},
                    {"name": "Ethanol", "sku": "", "quantity": "abc", "consumed": 0}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let serials = body["serials"].as_array().unwrap().clone();
        assert_eq!(serials.len(), 2);

        let uri = format!("/chemicals/{}", serials[0]);
        let (status, body) = send_json(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Acetone");
        assert_eq!(body["total_quantity"].as_f64().unwrap(), 1500.0);
        assert_eq!(body["actual_stock"].as_f64().unwrap(), 800.0);
        assert_eq!(body["ponumber"], "PO-1");

        let uri = format!("/chemicals/{}", serials[1]);
        let (_, body) = send_json(&app, Method::GET, &uri, None).await;
        assert_eq!(body["total_quantity"].as_f64().unwrap(), 0.0);
        assert_eq!(body["actual_stock"].as_f64().unwrap(), 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_empty_batch() -> Result<()> {
        let (app, db) = test_app().await?;

        let (status, body) =
            send_json(&app, Method::POST, "/chemicals", Some(json!({"chemicals": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");

        let (status, _) = send_json(&app, Method::POST, "/chemicals", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send_json(&app, Method::POST, "/chemicals", Some(json!({"chemicals": null}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid input: chemicals array required");

        assert!(crate::core::chemical::list_all_chemicals(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_coerces_non_numeric_json_to_zero() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/chemicals",
            Some(json!({"chemicals": [
                {"name": "Bool", "sku": true, "quantity": 2, "consumed": [1]}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/chemicals/{}", body["serials"][0]);
        let (_, row) = send_json(&app, Method::GET, &uri, None).await;
        assert_eq!(row["sku"].as_f64().unwrap(), 0.0);
        assert_eq!(row["consumed"].as_f64().unwrap(), 0.0);
        assert_eq!(row["total_quantity"].as_f64().unwrap(), 0.0);
        assert_eq!(row["actual_stock"].as_f64().unwrap(), 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_overflowing_quantities() -> Result<()> {
        let (app, db) = test_app().await?;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/chemicals",
            Some(json!({"chemicals": [{"name": "Huge", "sku": 1e308, "quantity": 10}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("out of range"));
        assert!(crate::core::chemical::list_all_chemicals(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_requests_get_json_error_body() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send_json(&app, Method::GET, "/chemicals/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");
        assert!(body["timestamp"].is_string());

        let (status, body) = send_json(
            &app,
            Method::GET,
            "/chemicals?received_from=yesterday",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/chemicals",
            Some(json!({"chemicals": "not a list"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_taken_serial_conflicts() -> Result<()> {
        let (app, db) = test_app().await?;
        let existing = create_test_chemical(&db, "Acetone", None).await?;

        let (status, _) = send_json(
            &app,
            Method::POST,
            "/chemicals",
            Some(json!({"chemicals": [
                {"name": "Fresh"},
                {"serial_no": existing.serial_no, "name": "Clash"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let all = crate::core::chemical::list_all_chemicals(&db).await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_chemical_is_not_found() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send_json(&app, Method::GET, "/chemicals/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("999"));
        assert!(body["timestamp"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_recomputes_derived_fields() -> Result<()> {
        let (app, db) = test_app().await?;
        let chemical = create_test_chemical(&db, "Acetone", Some("PO-1")).await?;
        let uri = format!("/chemicals/{}", chemical.serial_no);

        let (status, body) = send_json(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"serial_no": 4242, "name": "Acetone", "sku": 100, "quantity": "4",
                        "consumed": 500, "total_quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serial_no"].as_i64().unwrap(), chemical.serial_no);
        assert_eq!(body["total_quantity"].as_f64().unwrap(), 400.0);
        assert_eq!(body["actual_stock"].as_f64().unwrap(), 0.0);

        let (status, _) =
            send_json(&app, Method::PUT, "/chemicals/4242", Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> Result<()> {
        let (app, db) = test_app().await?;
        let chemical = create_test_chemical(&db, "Acetone", None).await?;
        let uri = format!("/chemicals/{}", chemical.serial_no);

        let (first, _) = send_json(&app, Method::DELETE, &uri, None).await;
        let (second, _) = send_json(&app, Method::DELETE, &uri, None).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);

        let (status, _) = send_json(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_applies_query_filters() -> Result<()> {
        let (app, db) = test_app().await?;
        create_test_chemical(&db, "Acetone", Some("PO-1")).await?;
        create_test_chemical(&db, "Methanol", Some("PO-2")).await?;
        create_test_chemical(&db, "Ethanol", Some("PO-1")).await?;

        let (status, body) = send_json(&app, Method::GET, "/chemicals", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send_json(&app, Method::GET, "/chemicals?po_number=PO-1", None).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Acetone", "Ethanol"]);

        let (_, body) = send_json(&app, Method::GET, "/chemicals?text=METH", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        // No stored row has a received date, so any active range excludes them all
        let (_, body) =
            send_json(&app, Method::GET, "/chemicals?received_from=2024-01-01", None).await;
        assert!(body.as_array().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_options_endpoint() -> Result<()> {
        let (app, db) = test_app().await?;
        create_test_chemical(&db, "Acetone", Some("PO-2")).await?;
        create_test_chemical(&db, "Ethanol", Some("PO-1")).await?;
        create_test_chemical(&db, "Water", None).await?;

        let (status, body) = send_json(&app, Method::GET, "/filter-options", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["po_numbers"], json!(["PO-1", "PO-2"]));
        assert_eq!(body["vendor_names"], json!(["Sigma"]));
        assert_eq!(body["end_users"], json!(["QC Lab"]));
        Ok(())
    }
}
