use std::sync::Arc;

use sedp_core::{
    ApprovalWorkflow, Authenticator, Clock, Notifier, RegistrationRepository, Registry,
};
use sedp_db::SlotStore;
use sedp_types::{Announcement, CategoryFee, GalleryPhoto, Panchayath, PushNotification};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub registrations: Arc<RegistrationRepository>,
    pub workflow: ApprovalWorkflow,
    pub fees: Registry<CategoryFee>,
    pub panchayaths: Registry<Panchayath>,
    pub announcements: Registry<Announcement>,
    pub gallery: Registry<GalleryPhoto>,
    pub notifications: Registry<PushNotification>,
    pub authenticator: Arc<dyn Authenticator>,
    pub clock: Arc<dyn Clock>,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(
        store: Arc<dyn SlotStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        authenticator: Arc<dyn Authenticator>,
        jwt_secret: String,
    ) -> AppState {
        let registrations = Arc::new(RegistrationRepository::new(store.clone(), clock.clone()));
        let workflow = ApprovalWorkflow::new(registrations.clone(), notifier);

        Arc::new(Self {
            registrations,
            workflow,
            fees: Registry::seeded(store.clone(), clock.clone()),
            panchayaths: Registry::seeded(store.clone(), clock.clone()),
            announcements: Registry::new(store.clone(), clock.clone()),
            gallery: Registry::new(store.clone(), clock.clone()),
            notifications: Registry::new(store, clock.clone()),
            authenticator,
            clock,
            jwt_secret,
        })
    }
}
