use serde::{Deserialize, Serialize};

use crate::models::{Category, CategoryFee};

// -- JWT Claims --

/// Claims carried by an admin session token. Issued by the login handler and
/// checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}

// -- Registrations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeCategoryRequest {
    pub category: Category,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: usize,
}

// -- Catalogue --

/// A category as offered on the public form, with its current fee if one
/// has been configured.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub value: Category,
    pub label: &'static str,
    pub universal: bool,
    pub fee: Option<CategoryFee>,
    /// What the applicant pays today, offer included.
    pub payable_fee: Option<u32>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
