//! JSON API handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::request::{parse_body, parse_json_value, take_field};
use crate::http::server::AppState;
use crate::model::{
    AdjustmentData, ApiResponse, OperationData, PeriodData, PromotionData, ReportData, ShopInfo,
    WeeklyGrowth,
};
use crate::report::{download_document, print_document};
use crate::validation::{
    business_warnings, validate_adjustment_data, validate_operation_data,
    validate_promotion_data, validate_report, validate_shop_info, FieldError, ValidationErrors,
};
use crate::wizard::{DataSubmission, WizardSession};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/generate-report`
pub async fn generate_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut body = parse_json_value(&body)?;
    let acknowledged = body
        .get("acknowledgeWarnings")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let data: ReportData = take_field(&mut body, "reportData")?;

    validate_report(&data)?;
    let warnings = business_warnings(&data.operation_data, data.promotion_data.as_ref());
    if !warnings.is_empty() && !acknowledged {
        return Err(ApiError::Warnings(warnings));
    }

    tracing::info!(
        shop = %data.shop_info.shop_name,
        warnings = warnings.len(),
        "Generating report"
    );
    Ok(Json(state.generator.generate(&data).await))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateRequest {
    pub shop_info: Option<ShopInfo>,
    pub operation_data: Option<OperationData>,
    pub promotion_data: Option<PromotionData>,
    pub adjustment_data: Option<AdjustmentData>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
}

fn collect(errors: &mut Vec<FieldError>, prefix: &str, result: Result<(), ValidationErrors>) {
    if let Err(found) = result {
        errors.extend(found.with_prefix(prefix).0);
    }
}

/// `POST /api/validate`: check whichever sections are present.
pub async fn validate(body: Bytes) -> Result<Json<ValidateResponse>, ApiError> {
    let request: ValidateRequest = parse_body(&body)?;
    let mut errors = Vec::new();

    if let Some(info) = &request.shop_info {
        collect(&mut errors, "shopInfo", validate_shop_info(info));
    }
    if let Some(operation) = &request.operation_data {
        collect(&mut errors, "operationData", validate_operation_data(operation));
    }
    if let Some(promotion) = &request.promotion_data {
        collect(&mut errors, "promotionData", validate_promotion_data(promotion));
    }
    if let Some(adjustment) = &request.adjustment_data {
        collect(&mut errors, "adjustmentData", validate_adjustment_data(adjustment));
    }

    let warnings = request
        .operation_data
        .as_ref()
        .map(|operation| business_warnings(operation, request.promotion_data.as_ref()))
        .unwrap_or_default();

    Ok(Json(ValidateResponse {
        valid: errors.is_empty(),
        errors,
        warnings,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveRequest {
    pub this_week: PeriodData,
    pub growth: WeeklyGrowth,
    /// Previously entered last-week values; only the repurchase rate survives.
    #[serde(default)]
    pub last_week: Option<PeriodData>,
}

/// `POST /api/derive-last-week`
pub async fn derive_last_week(body: Bytes) -> Result<Json<OperationData>, ApiError> {
    let request: DeriveRequest = parse_body(&body)?;
    let mut operation = OperationData {
        this_week: request.this_week,
        last_week: request.last_week.unwrap_or_default(),
    };
    operation.derive_last_week(&request.growth);
    Ok(Json(operation))
}

/// Session plus its position in the progress indicator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: WizardSession,
    pub step_index: usize,
}

impl From<WizardSession> for SessionView {
    fn from(session: WizardSession) -> Self {
        let step_index = session.step_index();
        Self { session, step_index }
    }
}

fn session_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::SessionNotFound)
}

fn load_session(state: &AppState, id: &Uuid) -> Result<WizardSession, ApiError> {
    state.sessions.get(id).ok_or(ApiError::SessionNotFound)
}

fn with_session<T>(
    state: &AppState,
    id: &Uuid,
    f: impl FnOnce(&mut WizardSession) -> Result<T, crate::wizard::WizardError>,
) -> Result<T, ApiError> {
    state
        .sessions
        .update(id, f)
        .ok_or(ApiError::SessionNotFound)?
        .map_err(ApiError::from)
}

/// `POST /api/sessions`
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(state.sessions.create().into()))
}

/// `GET /api/sessions/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = session_id(&id)?;
    Ok(Json(load_session(&state, &id)?.into()))
}

/// `POST /api/sessions/{id}/shop-info`
pub async fn submit_shop_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SessionView>, ApiError> {
    let id = session_id(&id)?;
    let info: ShopInfo = parse_body(&body)?;
    with_session(&state, &id, |session| session.submit_shop_info(info))?;
    Ok(Json(load_session(&state, &id)?.into()))
}

/// `POST /api/sessions/{id}/data`: submit the data step and run generation.
///
/// Generation runs in a detached task outside the session lock. The task
/// always moves the session out of `Generating`, even when this request is
/// dropped. A failed generation is not an HTTP error: the session returns to
/// data entry with `lastError` set.
pub async fn submit_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SessionView>, ApiError> {
    let id = session_id(&id)?;
    let submission: DataSubmission = parse_body(&body)?;
    let data = with_session(&state, &id, |session| session.submit_data(submission))?;

    tracing::info!(session_id = %id, shop = %data.shop_info.shop_name, "Generating report");
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let response = task_state.generator.generate(&data).await;
        finish_generation(&task_state, &id, response)
    });

    match task.await {
        Ok(outcome) => outcome?,
        Err(e) => {
            tracing::error!(session_id = %id, error = %e, "Generation task failed");
            with_session(&state, &id, |session| session.fail(e.to_string()))?;
            return Err(ApiError::Internal(e.to_string()));
        }
    }

    Ok(Json(load_session(&state, &id)?.into()))
}

fn finish_generation(state: &AppState, id: &Uuid, response: ApiResponse) -> Result<(), ApiError> {
    match (response.success, response.data, response.error) {
        (true, Some(html), _) => with_session(state, id, |session| session.complete(html)),
        (_, _, error) => {
            let error = error.unwrap_or_else(|| "生成报告失败".to_string());
            with_session(state, id, |session| session.fail(error))
        }
    }
}

/// `POST /api/sessions/{id}/back`
pub async fn back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = session_id(&id)?;
    with_session(&state, &id, |session| session.back())?;
    Ok(Json(load_session(&state, &id)?.into()))
}

/// `POST /api/sessions/{id}/restart`
pub async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = session_id(&id)?;
    with_session(&state, &id, |session| session.restart())?;
    Ok(Json(load_session(&state, &id)?.into()))
}

/// `GET /api/sessions/{id}/download`
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = session_id(&id)?;
    let session = load_session(&state, &id)?;
    let html = session.report()?;

    let file = download_document(session.shop_name(), html);
    let disposition = file.content_disposition();
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// `GET /api/sessions/{id}/print`
pub async fn print(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = session_id(&id)?;
    let session = load_session(&state, &id)?;
    Ok(Html(print_document(session.report()?)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DraftQuery {
    pub prefix: String,
}

/// `GET /api/drafts?prefix=`
pub async fn list_drafts(
    State(state): State<AppState>,
    Query(query): Query<DraftQuery>,
) -> Json<Value> {
    Json(json!({ "keys": state.drafts.keys_with_prefix(&query.prefix) }))
}

/// `GET /api/drafts/{key}`
pub async fn get_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = state.drafts.get(&key).ok_or(ApiError::DraftNotFound)?;
    Ok(Json(json!({ "key": key, "value": value })))
}

/// `PUT /api/drafts/{key}`
pub async fn put_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let value: Value = parse_body(&body)?;
    let drafts = state.drafts.clone();
    let stored_key = key.clone();
    tokio::task::spawn_blocking(move || drafts.set(&stored_key, value))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(json!({ "success": true, "key": key })))
}

/// `DELETE /api/drafts/{key}`
pub async fn delete_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let drafts = state.drafts.clone();
    let removed = tokio::task::spawn_blocking(move || drafts.remove(&key))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::DraftNotFound),
    }
}
