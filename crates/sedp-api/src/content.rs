//! Catalogue data shown on the public pages and maintained from the admin
//! panel: fees, panchayaths, announcements, gallery photos and
//! notifications.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::de::DeserializeOwned;

use sedp_core::{ContentRecord, Error as CoreError, Registry};
use sedp_types::api::{CategoryInfo, DeleteResponse};
use sedp_types::{
    Announcement, Category, CategoryFee, FeeInput, GalleryPhoto, Panchayath, PushNotification,
};

use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::state::{AppState, AppStateInner};

/// A content type exposed through the generic admin CRUD handlers.
pub trait Managed: ContentRecord<Input: DeserializeOwned + Send + 'static> {
    fn registry(state: &AppStateInner) -> &Registry<Self>;
}

impl Managed for CategoryFee {
    fn registry(state: &AppStateInner) -> &Registry<Self> {
        &state.fees
    }
}

impl Managed for Panchayath {
    fn registry(state: &AppStateInner) -> &Registry<Self> {
        &state.panchayaths
    }
}

impl Managed for Announcement {
    fn registry(state: &AppStateInner) -> &Registry<Self> {
        &state.announcements
    }
}

impl Managed for GalleryPhoto {
    fn registry(state: &AppStateInner) -> &Registry<Self> {
        &state.gallery
    }
}

impl Managed for PushNotification {
    fn registry(state: &AppStateInner) -> &Registry<Self> {
        &state.notifications
    }
}

// -- Generic admin CRUD --

pub async fn list_records<T: Managed>(
    State(state): State<AppState>,
) -> Result<Json<Vec<T>>, ApiError> {
    let list = run_blocking(move || Ok(T::registry(&state).load())).await?;
    Ok(Json(list))
}

pub async fn create_record<T: Managed>(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<T::Input>,
) -> Result<impl IntoResponse, ApiError> {
    let record = run_blocking(move || T::registry(&state).create(input)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record<T: Managed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<T::Input>,
) -> Result<Json<T>, ApiError> {
    let record = run_blocking(move || T::registry(&state).update(&id, input)).await?;
    Ok(Json(record))
}

pub async fn delete_record<T: Managed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = run_blocking(move || match T::registry(&state).remove(&id)? {
        0 => Err(CoreError::not_found(T::KIND, id)),
        n => Ok(n),
    })
    .await?;
    Ok(Json(DeleteResponse { removed }))
}

// -- Fees --

/// Replace the whole fee schedule.
pub async fn save_fees(
    State(state): State<AppState>,
    ApiJson(fees): ApiJson<Vec<CategoryFee>>,
) -> Result<Json<Vec<CategoryFee>>, ApiError> {
    let saved = run_blocking(move || {
        state.fees.save(&fees)?;
        Ok(state.fees.load())
    })
    .await?;
    Ok(Json(saved))
}

pub async fn update_fee(
    State(state): State<AppState>,
    Path(category): Path<String>,
    ApiJson(input): ApiJson<FeeInput>,
) -> Result<Json<CategoryFee>, ApiError> {
    let category: Category = category
        .parse()
        .map_err(|e| CoreError::validation(format!("{}", e)))?;

    let fee = run_blocking(move || state.fees.upsert(input.into_fee(category))).await?;
    Ok(Json(fee))
}

// -- Public catalogue --

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryInfo>>, ApiError> {
    let fees = run_blocking(move || Ok(state.fees.load())).await?;

    let info = Category::ALL
        .into_iter()
        .map(|category| {
            let fee = fees.iter().find(|f| f.category == category).cloned();
            CategoryInfo {
                value: category,
                label: category.label(),
                universal: category.is_universal(),
                payable_fee: fee.as_ref().map(CategoryFee::effective_fee),
                fee,
            }
        })
        .collect();
    Ok(Json(info))
}

/// Active announcements that have not expired yet.
pub async fn visible_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let visible = run_blocking(move || {
        let now = state.clock.now();
        Ok(state
            .announcements
            .load()
            .into_iter()
            .filter(|a| a.is_visible_at(now))
            .collect())
    })
    .await?;
    Ok(Json(visible))
}

pub async fn active_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<PushNotification>>, ApiError> {
    let active = run_blocking(move || {
        Ok(state
            .notifications
            .load()
            .into_iter()
            .filter(|n| n.is_active)
            .collect())
    })
    .await?;
    Ok(Json(active))
}
