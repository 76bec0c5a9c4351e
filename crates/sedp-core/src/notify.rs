use sedp_types::{Registration, Status};
use tracing::info;

/// Outbound port fired after a registration changes status. Delivery is the
/// implementor's business; the workflow never waits on it or sees failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, registration: &Registration, category_label: &str);
}

/// Text of the WhatsApp message sent to the applicant.
pub fn decision_message(registration: &Registration, category_label: &str) -> String {
    match (&registration.status, &registration.unique_id) {
        (Status::Approved, Some(unique_id)) => format!(
            "Hello {}, your registration for {} has been approved! Your unique ID is: {}",
            registration.full_name, category_label, unique_id
        ),
        (Status::Approved, None) => format!(
            "Hello {}, your registration for {} has been approved!",
            registration.full_name, category_label
        ),
        (Status::Rejected, _) => format!(
            "Hello {}, your registration for {} has been rejected.",
            registration.full_name, category_label
        ),
        (Status::Pending, _) => format!(
            "Hello {}, your registration for {} is under review.",
            registration.full_name, category_label
        ),
    }
}

/// Logs the message instead of sending it.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, registration: &Registration, category_label: &str) {
        info!(
            "WhatsApp notification to {}: {}",
            registration.whatsapp_number,
            decision_message(registration, category_label)
        );
    }
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _registration: &Registration, _category_label: &str) {}
}
