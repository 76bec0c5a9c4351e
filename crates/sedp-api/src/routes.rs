use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sedp_types::{Announcement, CategoryFee, GalleryPhoto, Panchayath, PushNotification};

use crate::auth;
use crate::content::{self, Managed};
use crate::middleware::require_auth;
use crate::registrations;
use crate::state::AppState;

/// The full HTTP surface: public pages, admin login and the JWT-guarded
/// admin panel.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/registrations", post(registrations::submit))
        .route("/categories", get(content::categories))
        .route("/fees", get(content::list_records::<CategoryFee>))
        .route("/panchayaths", get(content::list_records::<Panchayath>))
        .route("/announcements", get(content::visible_announcements))
        .route("/gallery", get(content::list_records::<GalleryPhoto>))
        .route("/notifications", get(content::active_notifications))
        .route("/admin/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/admin/registrations", get(registrations::list))
        .route("/admin/registrations/bulk-delete", post(registrations::bulk_delete))
        .route(
            "/admin/registrations/{id}",
            get(registrations::get_one)
                .put(registrations::edit)
                .delete(registrations::delete_one),
        )
        .route("/admin/registrations/{id}/approve", post(registrations::approve))
        .route("/admin/registrations/{id}/reject", post(registrations::reject))
        .route("/admin/registrations/{id}/category", put(registrations::change_category))
        .route("/admin/stats", get(registrations::stats))
        .route("/admin/stats/panchayaths", get(registrations::panchayath_breakdown))
        .route("/admin/export/csv", get(registrations::export_csv))
        .route("/admin/export/report", get(registrations::export_report))
        .route(
            "/admin/fees",
            get(content::list_records::<CategoryFee>).put(content::save_fees),
        )
        .route("/admin/fees/{category}", put(content::update_fee))
        .merge(crud::<Panchayath>("/admin/panchayaths"))
        .merge(crud::<Announcement>("/admin/announcements"))
        .merge(crud::<GalleryPhoto>("/admin/gallery"))
        .merge(crud::<PushNotification>("/admin/notifications"))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn crud<T: Managed>(base: &str) -> Router<AppState> {
    Router::new()
        .route(
            base,
            get(content::list_records::<T>).post(content::create_record::<T>),
        )
        .route(
            &format!("{base}/{{id}}"),
            put(content::update_record::<T>).delete(content::delete_record::<T>),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
