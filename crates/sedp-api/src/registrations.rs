use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::info;

use sedp_core::export::{self, ExportField};
use sedp_core::query::{self, CategoryStats, PanchayathGroup, StatusCounts};
use sedp_core::{Decision, Error as CoreError, RegistrationFilter, Selector};
use sedp_types::api::{BulkDeleteRequest, ChangeCategoryRequest, DeleteResponse};
use sedp_types::{NewRegistration, Registration, RegistrationEdit};

use crate::error::{ApiError, run_blocking};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub categories: Vec<CategoryStats>,
}

/// Public applicant form submission.
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewRegistration>,
) -> Result<impl IntoResponse, ApiError> {
    let reg = run_blocking(move || state.registrations.append(req)).await?;
    Ok((StatusCode::CREATED, Json(reg)))
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RegistrationFilter>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let matching = run_blocking(move || {
        Ok(query::filter(&state.registrations.load(), &filter))
    })
    .await?;
    Ok(Json(matching))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Registration>, ApiError> {
    let reg = run_blocking(move || state.registrations.get(&id)).await?;
    Ok(Json(reg))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RegistrationEdit>,
) -> Result<Json<Registration>, ApiError> {
    let reg = run_blocking(move || state.registrations.edit(&id, req)).await?;
    Ok(Json(reg))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = run_blocking(move || match state.registrations.remove(&id)? {
        0 => Err(CoreError::not_found("registration", id)),
        n => Ok(n),
    })
    .await?;
    Ok(Json(DeleteResponse { removed }))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkDeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = run_blocking(move || state.registrations.remove_many(&req.ids)).await?;
    Ok(Json(DeleteResponse { removed }))
}

pub async fn approve(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<Registration>, ApiError> {
    decide(state, id, Decision::Approve).await
}

pub async fn reject(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<Registration>, ApiError> {
    decide(state, id, Decision::Reject).await
}

async fn decide(
    State(state): State<AppState>,
    Path(id): Path<String>,
    decision: Decision,
) -> Result<Json<Registration>, ApiError> {
    let reg = run_blocking(move || state.workflow.decide(&id, decision)).await?;
    Ok(Json(reg))
}

pub async fn change_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ChangeCategoryRequest>,
) -> Result<Json<Registration>, ApiError> {
    let reg = run_blocking(move || state.registrations.change_category(&id, req.category)).await?;
    Ok(Json(reg))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = run_blocking(move || {
        let all = state.registrations.load();
        Ok(StatsResponse {
            counts: query::count_by_status(&all),
            categories: query::count_by_category(&all),
        })
    })
    .await?;
    Ok(Json(stats))
}

pub async fn panchayath_breakdown(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RegistrationFilter>,
) -> Result<Json<Vec<PanchayathGroup>>, ApiError> {
    let groups = run_blocking(move || {
        let matching = query::filter(&state.registrations.load(), &filter);
        Ok(query::group_by_panchayath(&matching))
    })
    .await?;
    Ok(Json(groups))
}

pub async fn export_csv(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RegistrationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let filename = export::export_filename(&export_scope(&filter), "csv");
    let body = run_blocking(move || {
        let matching = query::filter(&state.registrations.load(), &filter);
        Ok(export::to_delimited_text(&matching, &ExportField::STANDARD))
    })
    .await?;

    info!("Exported {}", filename);
    Ok(attachment("text/csv; charset=utf-8", filename, body))
}

pub async fn export_report(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RegistrationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let filename = export::export_filename(&export_scope(&filter), "txt");
    let body = run_blocking(move || {
        let matching = query::filter(&state.registrations.load(), &filter);
        Ok(export::to_report(&matching, state.clock.as_ref()))
    })
    .await?;

    info!("Exported {}", filename);
    Ok(attachment("text/plain; charset=utf-8", filename, body))
}

/// Name the download after the narrowest active filter.
fn export_scope(filter: &RegistrationFilter) -> String {
    match (&filter.category, &filter.panchayath) {
        (Selector::Only(category), _) => category.label().to_string(),
        (Selector::All, Selector::Only(panchayath)) => panchayath.trim().to_string(),
        (Selector::All, Selector::All) => "all".to_string(),
    }
}

fn attachment(content_type: &'static str, filename: String, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}
