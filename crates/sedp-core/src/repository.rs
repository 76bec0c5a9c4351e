use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use regex::Regex;
use tracing::{error, info};
use uuid::Uuid;

use sedp_db::{Slot, SlotStore};
use sedp_types::{Category, NewRegistration, Registration, RegistrationEdit, Status};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::slots::{read_list, write_list};
use crate::workflow::unique_id;

/// Local 10-digit mobile number; Indian numbers start with 6-9.
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());
static WHATSAPP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());

/// Load/save/append/update/delete over the registration collection.
///
/// Every mutation is a read-modify-persist cycle over the whole slot. Cycles
/// are serialized within this process; writers in other processes are not
/// coordinated with, and the last full write wins.
pub struct RegistrationRepository {
    store: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl RegistrationRepository {
    pub fn new(store: Arc<dyn SlotStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// All persisted registrations in submission order. Never fails: an
    /// unreadable store is logged and reads as empty.
    pub fn load(&self) -> Vec<Registration> {
        read_list::<Registration>(self.store.as_ref(), Slot::Registrations)
            .map(|list| list.records)
            .unwrap_or_else(|e| {
                error!("Failed to read registrations: {}", e);
                Vec::new()
            })
    }

    pub fn get(&self, id: &str) -> Result<Registration> {
        self.load()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found("registration", id))
    }

    /// Validate and store a new applicant submission as `pending`.
    pub fn append(&self, candidate: NewRegistration) -> Result<Registration> {
        let category = candidate
            .category
            .trim()
            .parse::<Category>()
            .map_err(|_| Error::validation("Please select a valid category"))?;

        let fields = ApplicantFields {
            full_name: candidate.full_name.trim().to_string(),
            mobile_number: candidate.mobile_number.trim().to_string(),
            whatsapp_number: candidate.whatsapp_number.trim().to_string(),
            address: candidate.address.trim().to_string(),
            panchayath_details: candidate.panchayath_details.trim().to_string(),
        };
        fields.validate()?;

        let _guard = self.lock();
        let mut all = read_list::<Registration>(self.store.as_ref(), Slot::Registrations)?;

        if all.records.iter().any(|r| r.mobile_number == fields.mobile_number) {
            return Err(Error::DuplicateRegistration {
                mobile: fields.mobile_number,
            });
        }

        let registration = Registration {
            id: Uuid::now_v7().to_string(),
            full_name: fields.full_name,
            mobile_number: fields.mobile_number,
            whatsapp_number: fields.whatsapp_number,
            address: fields.address,
            panchayath_details: fields.panchayath_details,
            category,
            status: Status::Pending,
            submitted_at: self.clock.now(),
            approved_at: None,
            unique_id: None,
        };

        all.records.push(registration.clone());
        write_list(self.store.as_ref(), Slot::Registrations, &all)?;

        info!(
            "Registration {} submitted for {}",
            registration.id, registration.category
        );
        Ok(registration)
    }

    /// Overwrite the applicant details and category of the stored record with
    /// those of `updated`. No concurrency check.
    ///
    /// Identity (`id`, `submitted_at`) and review state (`status`,
    /// `approved_at`) always come from the stored record, since status only
    /// changes through the approval workflow. Applies the same checks as
    /// [`edit`](Self::edit).
    pub fn replace(&self, id: &str, updated: Registration) -> Result<Registration> {
        self.edit(
            id,
            RegistrationEdit {
                full_name: updated.full_name,
                mobile_number: updated.mobile_number,
                whatsapp_number: updated.whatsapp_number,
                address: updated.address,
                panchayath_details: updated.panchayath_details,
                category: updated.category,
            },
        )
    }

    /// Admin edit of applicant details. Status fields are untouched and the
    /// mobile number is not re-checked for uniqueness. An approved record
    /// gets its unique ID re-derived from the new mobile number and name.
    pub fn edit(&self, id: &str, edit: RegistrationEdit) -> Result<Registration> {
        let fields = ApplicantFields {
            full_name: edit.full_name.trim().to_string(),
            mobile_number: edit.mobile_number.trim().to_string(),
            whatsapp_number: edit.whatsapp_number.trim().to_string(),
            address: edit.address.trim().to_string(),
            panchayath_details: edit.panchayath_details.trim().to_string(),
        };
        fields.validate()?;

        self.update_with(id, move |current| {
            current.full_name = fields.full_name;
            current.mobile_number = fields.mobile_number;
            current.whatsapp_number = fields.whatsapp_number;
            current.address = fields.address;
            current.panchayath_details = fields.panchayath_details;
            current.category = edit.category;
            if current.status == Status::Approved {
                current.unique_id = Some(unique_id(&current.mobile_number, &current.full_name));
            }
            Ok(())
        })
    }

    /// Move a registration to another category without resetting its status.
    pub fn change_category(&self, id: &str, category: Category) -> Result<Registration> {
        let updated = self.update_with(id, |current| {
            current.category = category;
            Ok(())
        })?;
        info!("Registration {} moved to {}", id, category);
        Ok(updated)
    }

    /// Apply `f` to the record with `id` and persist the collection. If `f`
    /// fails nothing is written.
    pub fn update_with<F>(&self, id: &str, f: F) -> Result<Registration>
    where
        F: FnOnce(&mut Registration) -> Result<()>,
    {
        let _guard = self.lock();
        let mut all = read_list::<Registration>(self.store.as_ref(), Slot::Registrations)?;

        let current = all
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found("registration", id))?;
        f(current)?;
        let updated = current.clone();

        write_list(self.store.as_ref(), Slot::Registrations, &all)?;
        Ok(updated)
    }

    /// Delete one registration. Returns how many records were removed.
    pub fn remove(&self, id: &str) -> Result<usize> {
        self.remove_many(&[id.to_string()])
    }

    /// Delete every registration whose id is in `ids`. Unknown ids are ignored.
    pub fn remove_many(&self, ids: &[String]) -> Result<usize> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let _guard = self.lock();
        let mut all = read_list::<Registration>(self.store.as_ref(), Slot::Registrations)?;
        let before = all.records.len();
        all.records.retain(|r| !doomed.contains(r.id.as_str()));
        let removed = before - all.records.len();

        if removed > 0 {
            write_list(self.store.as_ref(), Slot::Registrations, &all)?;
            info!("Deleted {} registration(s)", removed);
        }
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no bad state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct ApplicantFields {
    full_name: String,
    mobile_number: String,
    whatsapp_number: String,
    address: String,
    panchayath_details: String,
}

impl ApplicantFields {
    fn validate(&self) -> Result<()> {
        let required = [
            (&self.full_name, "full name"),
            (&self.mobile_number, "mobile number"),
            (&self.whatsapp_number, "WhatsApp number"),
            (&self.address, "address"),
            (&self.panchayath_details, "panchayath"),
        ];
        if let Some((_, name)) = required.iter().find(|(v, _)| v.is_empty()) {
            return Err(Error::validation(format!("Please fill in the {name}")));
        }

        if !MOBILE_RE.is_match(&self.mobile_number) {
            return Err(Error::validation("Please enter a valid 10-digit mobile number"));
        }
        if !WHATSAPP_RE.is_match(&self.whatsapp_number) {
            return Err(Error::validation("Please enter a valid 10-digit WhatsApp number"));
        }
        Ok(())
    }
}
