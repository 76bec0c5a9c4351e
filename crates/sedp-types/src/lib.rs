pub mod api;
pub mod models;

pub use models::{
    Announcement, AnnouncementInput, Category, CategoryFee, FeeInput, GalleryPhoto,
    GalleryPhotoInput, NewRegistration, NotificationInput, Panchayath, PanchayathInput,
    PushNotification, Registration, RegistrationEdit, Status,
};
