use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use sedp_types::{Registration, Status};

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::repository::RegistrationRepository;

/// Admin decision on a pending registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(self) -> Status {
        match self {
            Self::Approve => Status::Approved,
            Self::Reject => Status::Rejected,
        }
    }
}

/// Applicant reference issued on approval: `ESP`, the mobile number, then the
/// upper-cased first letter of the name (`X` if the name has no letters).
///
/// Mobile numbers are unique per registration, so the ID is too.
pub fn unique_id(mobile_number: &str, full_name: &str) -> String {
    let initial = full_name
        .chars()
        .find(|c| c.is_alphabetic())
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "X".to_string());
    format!("ESP{mobile_number}{initial}")
}

/// Move a pending registration to the decision's target status.
///
/// Only `pending` records can be decided; anything else is an
/// `InvalidTransition` and the record is left as it was.
pub fn apply_decision(
    registration: &mut Registration,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<()> {
    if registration.status != Status::Pending {
        return Err(Error::InvalidTransition {
            from: registration.status,
            to: decision.target(),
        });
    }

    registration.status = decision.target();
    registration.approved_at = Some(now);
    registration.unique_id = match decision {
        Decision::Approve => Some(unique_id(
            &registration.mobile_number,
            &registration.full_name,
        )),
        Decision::Reject => None,
    };
    Ok(())
}

pub struct ApprovalWorkflow {
    repo: Arc<RegistrationRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalWorkflow {
    pub fn new(repo: Arc<RegistrationRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    pub fn approve(&self, id: &str) -> Result<Registration> {
        self.decide(id, Decision::Approve)
    }

    pub fn reject(&self, id: &str) -> Result<Registration> {
        self.decide(id, Decision::Reject)
    }

    /// Persist the decision, then notify. The notifier only runs after the
    /// new status has been written.
    pub fn decide(&self, id: &str, decision: Decision) -> Result<Registration> {
        let now = self.repo.clock().now();
        let updated = self
            .repo
            .update_with(id, |reg| apply_decision(reg, decision, now))?;

        info!(
            "Registration {} {}{}",
            updated.id,
            updated.status,
            updated
                .unique_id
                .as_deref()
                .map(|u| format!(" as {u}"))
                .unwrap_or_default()
        );

        self.notifier.notify(&updated, updated.category.label());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use sedp_db::MemoryStore;
    use sedp_types::{Category, NewRegistration};

    use crate::clock::FixedClock;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, Status, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, registration: &Registration, category_label: &str) {
            self.sent.lock().unwrap().push((
                registration.id.clone(),
                registration.status,
                category_label.to_string(),
            ));
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap()
    }

    fn setup() -> (Arc<RegistrationRepository>, Arc<RecordingNotifier>, ApprovalWorkflow) {
        let store = Arc::new(MemoryStore::new());
        let repo = Arc::new(RegistrationRepository::new(store, Arc::new(FixedClock(now()))));
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = ApprovalWorkflow::new(repo.clone(), notifier.clone());
        (repo, notifier, workflow)
    }

    fn submit(repo: &RegistrationRepository, name: &str, mobile: &str) -> Registration {
        repo.append(NewRegistration {
            full_name: name.into(),
            mobile_number: mobile.into(),
            whatsapp_number: mobile.into(),
            address: "Kizhakkumpuram".into(),
            panchayath_details: "Tanur".into(),
            category: "farmelife".into(),
        })
        .unwrap()
    }

    #[test]
    fn unique_id_is_deterministic() {
        assert_eq!(unique_id("9876543210", "anu joseph"), "ESP9876543210A");
        assert_eq!(unique_id("9876543210", "anu joseph"), unique_id("9876543210", "anu joseph"));
        assert_eq!(unique_id("9876543210", "  42 Binu"), "ESP9876543210B");
        assert_eq!(unique_id("9876543210", ""), "ESP9876543210X");
    }

    #[test]
    fn submit_approve_then_duplicate_scenario() {
        let (repo, notifier, workflow) = setup();
        let reg = submit(&repo, "Anu", "9876543210");
        assert_eq!(reg.status, Status::Pending);

        let approved = workflow.approve(&reg.id).unwrap();
        assert_eq!(approved.status, Status::Approved);
        assert_eq!(approved.approved_at, Some(now()));
        assert_eq!(approved.unique_id.as_deref(), Some("ESP9876543210A"));

        let dup = repo.append(NewRegistration {
            full_name: "Someone Else".into(),
            mobile_number: "9876543210".into(),
            whatsapp_number: "9123456789".into(),
            address: "Elsewhere".into(),
            panchayath_details: "Edappal".into(),
            category: "entrelife".into(),
        });
        assert!(matches!(dup.unwrap_err(), Error::DuplicateRegistration { .. }));
        assert_eq!(repo.load().len(), 1);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![(reg.id.clone(), Status::Approved, Category::Farmelife.label().to_string())]
        );
    }

    #[test]
    fn reject_sets_timestamp_but_no_unique_id() {
        let (repo, _, workflow) = setup();
        let reg = submit(&repo, "Binu", "9123456780");

        let rejected = workflow.reject(&reg.id).unwrap();
        assert_eq!(rejected.status, Status::Rejected);
        assert_eq!(rejected.approved_at, Some(now()));
        assert!(rejected.unique_id.is_none());
    }

    #[test]
    fn decided_records_cannot_move_again() {
        let (repo, notifier, workflow) = setup();
        let a = submit(&repo, "Anu", "9000000001");
        let b = submit(&repo, "Binu", "9000000002");
        workflow.approve(&a.id).unwrap();
        workflow.reject(&b.id).unwrap();

        for (id, decision) in [
            (&a.id, Decision::Approve),
            (&a.id, Decision::Reject),
            (&b.id, Decision::Approve),
            (&b.id, Decision::Reject),
        ] {
            let err = workflow.decide(id, decision).unwrap_err();
            assert!(matches!(err, Error::InvalidTransition { .. }));
        }

        assert_eq!(repo.get(&a.id).unwrap().status, Status::Approved);
        assert_eq!(repo.get(&b.id).unwrap().status, Status::Rejected);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn status_fields_are_set_iff_decided() {
        let (repo, _, workflow) = setup();
        let ids: Vec<_> = ["9000000001", "9000000002", "9000000003"]
            .iter()
            .enumerate()
            .map(|(i, m)| submit(&repo, &format!("P{i}"), m).id)
            .collect();
        workflow.approve(&ids[0]).unwrap();
        workflow.reject(&ids[1]).unwrap();

        for reg in repo.load() {
            assert_eq!(reg.approved_at.is_none(), reg.status == Status::Pending);
            assert_eq!(reg.unique_id.is_some(), reg.status == Status::Approved);
        }
    }

    #[test]
    fn unknown_registration_is_not_found_and_not_notified() {
        let (_, notifier, workflow) = setup();
        assert!(matches!(workflow.approve("nope").unwrap_err(), Error::NotFound { .. }));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
