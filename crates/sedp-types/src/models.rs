use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Categories --

/// Program tracks an applicant can register for.
///
/// This is the one canonical list; every component (form, filters, stats,
/// fee schedule, exports) iterates `Category::ALL` rather than keeping its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    PennyekartFree,
    PennyekartPaid,
    Farmelife,
    Foodelife,
    Organelife,
    Entrelife,
    /// Universal track covering every other category.
    JobCard,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::PennyekartFree,
        Category::PennyekartPaid,
        Category::Farmelife,
        Category::Foodelife,
        Category::Organelife,
        Category::Entrelife,
        Category::JobCard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PennyekartFree => "pennyekart-free",
            Self::PennyekartPaid => "pennyekart-paid",
            Self::Farmelife => "farmelife",
            Self::Foodelife => "foodelife",
            Self::Organelife => "organelife",
            Self::Entrelife => "entrelife",
            Self::JobCard => "job-card",
        }
    }

    /// Human-facing name shown on forms, stats and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::PennyekartFree => "Pennyekart Free Registration",
            Self::PennyekartPaid => "Pennyekart Paid Registration",
            Self::Farmelife => "FarmeLife",
            Self::Foodelife => "FoodeLife",
            Self::Organelife => "OrganeLife",
            Self::Entrelife => "EntreLife",
            Self::JobCard => "Job Card (All Categories)",
        }
    }

    pub fn is_universal(self) -> bool {
        matches!(self, Self::JobCard)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// -- Registrations --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A submitted application. `approved_at` and `unique_id` stay `None` while
/// the record is pending; `unique_id` is only ever set on approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub full_name: String,
    pub mobile_number: String,
    pub whatsapp_number: String,
    pub address: String,
    pub panchayath_details: String,
    pub category: Category,
    pub status: Status,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unique_id: Option<String>,
}

/// Applicant form input. The category is kept as raw text so an unknown
/// value is reported as a validation failure instead of a parse failure.
/// Missing fields decode as blank and fail the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRegistration {
    pub full_name: String,
    pub mobile_number: String,
    pub whatsapp_number: String,
    pub address: String,
    pub panchayath_details: String,
    pub category: String,
}

/// Admin edit dialog payload: applicant details only, never status fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEdit {
    pub full_name: String,
    pub mobile_number: String,
    pub whatsapp_number: String,
    pub address: String,
    pub panchayath_details: String,
    pub category: Category,
}

// -- Fee schedule --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFee {
    pub category: Category,
    pub actual_fee: u32,
    pub offer_fee: u32,
    pub has_offer: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl CategoryFee {
    /// The offer only applies when it is switched on and actually cheaper.
    pub fn offer_applies(&self) -> bool {
        self.has_offer && self.offer_fee < self.actual_fee
    }

    /// Price the applicant pays.
    pub fn effective_fee(&self) -> u32 {
        if self.offer_applies() {
            self.offer_fee
        } else {
            self.actual_fee
        }
    }
}

// -- Content --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panchayath {
    pub id: String,
    pub english_name: String,
    #[serde(default)]
    pub malayalam_name: Option<String>,
    pub district: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|exp| exp > now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_gallery_category")]
    pub category: String,
    pub uploaded_at: DateTime<Utc>,
}

pub fn default_gallery_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// -- Admin input for content records --

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanchayathInput {
    pub english_name: String,
    #[serde(default)]
    pub malayalam_name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementInput {
    pub title: String,
    pub content: String,
    #[serde(default = "yes")]
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhotoInput {
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub title: String,
    pub message: String,
    #[serde(default = "yes")]
    pub is_active: bool,
}

/// New prices for one category; the category comes from the request path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeInput {
    pub actual_fee: u32,
    pub offer_fee: u32,
    pub has_offer: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl FeeInput {
    pub fn into_fee(self, category: Category) -> CategoryFee {
        CategoryFee {
            category,
            actual_fee: self.actual_fee,
            offer_fee: self.offer_fee,
            has_offer: self.has_offer,
            image: self.image.filter(|i| !i.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names_round_trip() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("all".parse::<Category>().is_err());
    }

    #[test]
    fn only_job_card_is_universal() {
        let universal: Vec<_> = Category::ALL.into_iter().filter(|c| c.is_universal()).collect();
        assert_eq!(universal, vec![Category::JobCard]);
    }

    #[test]
    fn offer_requires_flag_and_discount() {
        let mut fee = CategoryFee {
            category: Category::Farmelife,
            actual_fee: 1000,
            offer_fee: 400,
            has_offer: true,
            image: None,
        };
        assert_eq!(fee.effective_fee(), 400);

        fee.has_offer = false;
        assert_eq!(fee.effective_fee(), 1000);

        fee.has_offer = true;
        fee.offer_fee = 1200;
        assert!(!fee.offer_applies());
        assert_eq!(fee.effective_fee(), 1000);
    }

    #[test]
    fn registration_uses_camel_case_fields() {
        let json = r#"{
            "id": "1",
            "fullName": "Anu",
            "mobileNumber": "9876543210",
            "whatsappNumber": "9876543210",
            "address": "Main Road",
            "panchayathDetails": "Tanur",
            "category": "farmelife",
            "status": "pending",
            "submittedAt": "2024-05-01T10:00:00Z",
            "approvedAt": null,
            "uniqueId": null
        }"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.category, Category::Farmelife);
        assert_eq!(reg.status, Status::Pending);
        assert!(reg.unique_id.is_none());
    }

    #[test]
    fn expired_announcement_is_hidden() {
        let now = Utc::now();
        let mut a = Announcement {
            id: "a1".into(),
            title: "Camp".into(),
            content: "Registration camp on Friday".into(),
            is_active: true,
            created_at: now,
            expires_at: Some(now - chrono::Duration::hours(1)),
        };
        assert!(!a.is_visible_at(now));
        a.expires_at = None;
        assert!(a.is_visible_at(now));
    }
}
