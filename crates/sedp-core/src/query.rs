//! Pure filtering and aggregation over an in-memory registration list.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use sedp_types::{Category, Registration, Status};

/// One filter dimension: either no restriction (`"all"`) or an exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<'de, T> Deserialize<'de> for Selector<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationFilter {
    /// Case-insensitive substring over name, mobile, WhatsApp and panchayath.
    pub search: String,
    pub category: Selector<Category>,
    pub status: Selector<Status>,
    /// Exact panchayath, compared after trimming.
    pub panchayath: Selector<String>,
}

impl RegistrationFilter {
    pub fn matches(&self, reg: &Registration) -> bool {
        self.matches_search(reg)
            && self.category.accepts(&reg.category)
            && self.status.accepts(&reg.status)
            && match &self.panchayath {
                Selector::All => true,
                Selector::Only(p) => p.trim() == reg.panchayath_details.trim(),
            }
    }

    fn matches_search(&self, reg: &Registration) -> bool {
        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            &reg.full_name,
            &reg.mobile_number,
            &reg.whatsapp_number,
            &reg.panchayath_details,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Records matching every active predicate, in their original order.
pub fn filter(records: &[Registration], filter: &RegistrationFilter) -> Vec<Registration> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// `part` as a percentage of `whole`; an empty whole is 0%.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn add(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Pending => self.pending += 1,
            Status::Approved => self.approved += 1,
            Status::Rejected => self.rejected += 1,
        }
    }

    /// Share of this total taken by `count`, in percent.
    pub fn share(&self, count: usize) -> f64 {
        percentage(count, self.total)
    }
}

pub fn count_by_status(records: &[Registration]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for r in records {
        counts.add(r.status);
    }
    counts
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Category,
    pub label: &'static str,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// Percent of all registrations in this category.
    pub share: f64,
}

/// Per-category counts for every known category, including empty ones.
pub fn count_by_category(records: &[Registration]) -> Vec<CategoryStats> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let mut counts = StatusCounts::default();
            for r in records.iter().filter(|r| r.category == category) {
                counts.add(r.status);
            }
            CategoryStats {
                category,
                label: category.label(),
                counts,
                share: percentage(counts.total, records.len()),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PanchayathGroup {
    pub panchayath: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub members: Vec<Registration>,
}

/// Group by trimmed `panchayath_details`, largest group first.
///
/// Keys are case-sensitive, so "Tanur" and "tanur" are separate groups.
/// Equal-sized groups keep the order in which they were first seen.
pub fn group_by_panchayath(records: &[Registration]) -> Vec<PanchayathGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<PanchayathGroup> = Vec::new();

    for r in records {
        let key = r.panchayath_details.trim();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(PanchayathGroup {
                panchayath: key.to_string(),
                counts: StatusCounts::default(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].counts.add(r.status);
        groups[slot].members.push(r.clone());
    }

    groups.sort_by(|a, b| b.counts.total.cmp(&a.counts.total));
    groups
}
