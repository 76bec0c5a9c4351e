//! Generic CRUD over the side collections: fee schedule, panchayaths,
//! announcements, gallery photos and push notifications.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};
use uuid::Uuid;

use sedp_db::{Slot, SlotStore};
use sedp_types::models::default_gallery_category;
use sedp_types::{
    Announcement, AnnouncementInput, Category, CategoryFee, GalleryPhoto,
    GalleryPhotoInput, NotificationInput, Panchayath, PanchayathInput, PushNotification,
};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::slots::{SlotList, read_list, write_list, write_records};

pub const DEFAULT_DISTRICT: &str = "Malappuram";

/// Localities offered on the registration form until an admin edits the list.
pub const DEFAULT_PANCHAYATHS: &[&str] = &[
    "Abdu Rahman Nagar", "Alamcode", "Anakkayam", "Areecode", "Cheekkode", "Chelakkara",
    "Chemmad", "Cherpulassery", "Chokkad", "Edakkara", "Edappal", "Edavanna", "Elamkulam",
    "Irumbuzhi", "Kadampuzha", "Kalikavu", "Kannamangalam", "Karuvarakundu", "Keezhattur",
    "Kizhuparamba", "Kodur", "Kondotty", "Koottilangadi", "Kuruva", "Kuttippuram",
    "Makkaraparamba", "Malappuram", "Manjeri", "Marakkara", "Melattur", "Morayur",
    "Mudur", "Munduparamba", "Nanmukku", "Nilambur", "Othukungal", "Pandikkad",
    "Perinthalmanna", "Perumpadappu", "Ponmundam", "Pulikkal", "Purathur", "Tanalur",
    "Tanur", "Thiruvali", "Tirurangadi", "Triprangode", "Vazhakkad", "Vazhayur",
    "Vengara", "Wandoor",
];

/// A record kept in its own slot and managed by a [`Registry`].
pub trait ContentRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Admin payload used to create or update a record.
    type Input;

    const SLOT: Slot;
    const KIND: &'static str;
    /// New records go to the front of the list (newest first).
    const PREPEND: bool = true;

    fn key(&self) -> &str;

    fn create(input: Self::Input, id: String, now: DateTime<Utc>) -> Self;

    /// Overwrite the editable fields, keeping identity and creation time.
    fn apply(&mut self, input: Self::Input);

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Seed list for a slot that has never been written. Pure given `now`.
pub fn defaults_for<T: ContentRecord>(now: DateTime<Utc>) -> Vec<T>
where
    T: Seeded,
{
    T::seed(now)
}

/// Content types with a non-empty default list.
pub trait Seeded: Sized {
    fn seed(now: DateTime<Utc>) -> Vec<Self>;
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("{what} is required")))
    } else {
        Ok(())
    }
}

// -- Fee schedule --

impl ContentRecord for CategoryFee {
    type Input = CategoryFee;

    const SLOT: Slot = Slot::CategoryFees;
    const KIND: &'static str = "category fee";
    const PREPEND: bool = false;

    fn key(&self) -> &str {
        self.category.as_str()
    }

    fn create(input: Self::Input, _id: String, _now: DateTime<Utc>) -> Self {
        input
    }

    fn apply(&mut self, input: Self::Input) {
        *self = CategoryFee {
            category: self.category,
            ..input
        };
    }
}

impl Seeded for CategoryFee {
    /// The free track costs nothing, the universal job card 2000 (800 on
    /// offer), every other track 1000 (400 on offer).
    fn seed(_now: DateTime<Utc>) -> Vec<Self> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let (actual_fee, offer_fee) = match category {
                    Category::PennyekartFree => (0, 0),
                    Category::JobCard => (2000, 800),
                    _ => (1000, 400),
                };
                CategoryFee {
                    category,
                    actual_fee,
                    offer_fee,
                    has_offer: category != Category::PennyekartFree,
                    image: None,
                }
            })
            .collect()
    }
}

// -- Panchayaths --

impl ContentRecord for Panchayath {
    type Input = PanchayathInput;

    const SLOT: Slot = Slot::Panchayaths;
    const KIND: &'static str = "panchayath";
    const PREPEND: bool = false;

    fn key(&self) -> &str {
        &self.id
    }

    fn create(input: Self::Input, id: String, now: DateTime<Utc>) -> Self {
        Panchayath {
            id,
            english_name: input.english_name.trim().to_string(),
            malayalam_name: input.malayalam_name,
            district: input.district.unwrap_or_else(|| DEFAULT_DISTRICT.to_string()),
            created_at: now,
        }
    }

    fn apply(&mut self, input: Self::Input) {
        self.english_name = input.english_name.trim().to_string();
        self.malayalam_name = input.malayalam_name;
        if let Some(district) = input.district {
            self.district = district;
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.english_name, "English name")
    }
}

impl Seeded for Panchayath {
    fn seed(now: DateTime<Utc>) -> Vec<Self> {
        DEFAULT_PANCHAYATHS
            .iter()
            .enumerate()
            .map(|(i, name)| Panchayath {
                id: format!("default-{:02}", i + 1),
                english_name: name.to_string(),
                malayalam_name: None,
                district: DEFAULT_DISTRICT.to_string(),
                created_at: now,
            })
            .collect()
    }
}

// -- Announcements --

impl ContentRecord for Announcement {
    type Input = AnnouncementInput;

    const SLOT: Slot = Slot::Announcements;
    const KIND: &'static str = "announcement";

    fn key(&self) -> &str {
        &self.id
    }

    fn create(input: Self::Input, id: String, now: DateTime<Utc>) -> Self {
        Announcement {
            id,
            title: input.title,
            content: input.content,
            is_active: input.is_active,
            created_at: now,
            expires_at: input.expires_at,
        }
    }

    fn apply(&mut self, input: Self::Input) {
        self.title = input.title;
        self.content = input.content;
        self.is_active = input.is_active;
        self.expires_at = input.expires_at;
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")?;
        require(&self.content, "Content")
    }
}

// -- Gallery --

impl ContentRecord for GalleryPhoto {
    type Input = GalleryPhotoInput;

    const SLOT: Slot = Slot::Gallery;
    const KIND: &'static str = "photo";

    fn key(&self) -> &str {
        &self.id
    }

    fn create(input: Self::Input, id: String, now: DateTime<Utc>) -> Self {
        GalleryPhoto {
            id,
            title: input.title,
            image_url: input.image_url,
            description: input.description,
            category: input.category.unwrap_or_else(default_gallery_category),
            uploaded_at: now,
        }
    }

    fn apply(&mut self, input: Self::Input) {
        self.title = input.title;
        self.image_url = input.image_url;
        self.description = input.description;
        self.category = input.category.unwrap_or_else(default_gallery_category);
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")?;
        require(&self.image_url, "Image URL")
    }
}

// -- Push notifications --

impl ContentRecord for PushNotification {
    type Input = NotificationInput;

    const SLOT: Slot = Slot::Notifications;
    const KIND: &'static str = "notification";

    fn key(&self) -> &str {
        &self.id
    }

    fn create(input: Self::Input, id: String, now: DateTime<Utc>) -> Self {
        PushNotification {
            id,
            title: input.title,
            message: input.message,
            is_active: input.is_active,
            created_at: now,
        }
    }

    fn apply(&mut self, input: Self::Input) {
        self.title = input.title;
        self.message = input.message;
        self.is_active = input.is_active;
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")?;
        require(&self.message, "Message")
    }
}

// -- Registry --

/// CRUD over one content slot. Mutations are whole-slot read-modify-persist
/// cycles, serialized within the process like the registration repository.
pub struct Registry<T> {
    store: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
    seed: fn(DateTime<Utc>) -> Vec<T>,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ContentRecord> Registry<T> {
    /// Registry whose empty slot stays empty.
    pub fn new(store: Arc<dyn SlotStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_seed(store, clock, |_| Vec::new())
    }

    fn with_seed(
        store: Arc<dyn SlotStore>,
        clock: Arc<dyn Clock>,
        seed: fn(DateTime<Utc>) -> Vec<T>,
    ) -> Self {
        Self {
            store,
            clock,
            seed,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Current list. An empty slot is seeded with the defaults, which are
    /// persisted on the spot. Never fails; store errors are logged.
    pub fn load(&self) -> Vec<T> {
        let _guard = self.lock();
        self.read_seeded().map(|list| list.records).unwrap_or_else(|e| {
            error!("Failed to read {}: {}", T::SLOT, e);
            Vec::new()
        })
    }

    pub fn get(&self, key: &str) -> Result<T> {
        self.load()
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| Error::not_found(T::KIND, key))
    }

    /// Replace the whole list.
    pub fn save(&self, list: &[T]) -> Result<()> {
        let mut keys = HashSet::new();
        for record in list {
            record.validate()?;
            if !keys.insert(record.key()) {
                return Err(Error::validation(format!(
                    "duplicate {} '{}'",
                    T::KIND,
                    record.key()
                )));
            }
        }

        let _guard = self.lock();
        write_records(self.store.as_ref(), T::SLOT, list)?;
        info!("Saved {} {} record(s)", list.len(), T::KIND);
        Ok(())
    }

    pub fn create(&self, input: T::Input) -> Result<T> {
        let record = T::create(input, Uuid::now_v7().to_string(), self.clock.now());
        self.upsert(record)
    }

    pub fn update(&self, key: &str, input: T::Input) -> Result<T> {
        self.modify(key, |record| record.apply(input))
    }

    /// Replace the record with the same key, or add it if there is none.
    pub fn upsert(&self, record: T) -> Result<T> {
        record.validate()?;

        let _guard = self.lock();
        let mut list = self.read_seeded()?;
        match list.records.iter_mut().find(|r| r.key() == record.key()) {
            Some(existing) => *existing = record.clone(),
            None if T::PREPEND => list.records.insert(0, record.clone()),
            None => list.records.push(record.clone()),
        }
        write_list(self.store.as_ref(), T::SLOT, &list)?;
        Ok(record)
    }

    /// Delete the record with `key`. Removing the last record leaves the slot
    /// empty, so a seeded registry restores its defaults on the next read.
    pub fn remove(&self, key: &str) -> Result<usize> {
        let _guard = self.lock();
        let mut list = self.read_seeded()?;
        let before = list.records.len();
        list.records.retain(|r| r.key() != key);
        let removed = before - list.records.len();
        if removed > 0 {
            write_list(self.store.as_ref(), T::SLOT, &list)?;
            info!("Deleted {} '{}'", T::KIND, key);
        }
        Ok(removed)
    }

    fn modify<F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let _guard = self.lock();
        let mut list = self.read_seeded()?;
        let record = list
            .records
            .iter_mut()
            .find(|r| r.key() == key)
            .ok_or_else(|| Error::not_found(T::KIND, key))?;
        f(record);
        record.validate()?;
        let updated = record.clone();
        write_list(self.store.as_ref(), T::SLOT, &list)?;
        Ok(updated)
    }

    /// Caller holds the write lock.
    fn read_seeded(&self) -> Result<SlotList<T>> {
        let list = read_list::<T>(self.store.as_ref(), T::SLOT)?;
        if !list.is_blank() {
            return Ok(list);
        }

        let defaults = (self.seed)(self.clock.now());
        if !defaults.is_empty() {
            write_records(self.store.as_ref(), T::SLOT, &defaults)?;
            info!("Seeded {} with {} default(s)", T::SLOT, defaults.len());
        }
        Ok(SlotList::from_records(defaults))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: ContentRecord + Seeded> Registry<T> {
    /// Registry that seeds an empty slot from `T::seed`.
    pub fn seeded(store: Arc<dyn SlotStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_seed(store, clock, T::seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use sedp_db::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap()
    }

    fn parts() -> (Arc<MemoryStore>, Arc<FixedClock>) {
        (Arc::new(MemoryStore::new()), Arc::new(FixedClock(now())))
    }

    #[test]
    fn default_fees_follow_schedule() {
        let fees: Vec<CategoryFee> = defaults_for(now());
        assert_eq!(fees.len(), Category::ALL.len());

        let free = fees.iter().find(|f| f.category == Category::PennyekartFree).unwrap();
        assert_eq!((free.actual_fee, free.offer_fee, free.has_offer), (0, 0, false));

        let job = fees.iter().find(|f| f.category == Category::JobCard).unwrap();
        assert_eq!((job.actual_fee, job.offer_fee, job.has_offer), (2000, 800, true));

        let farm = fees.iter().find(|f| f.category == Category::Farmelife).unwrap();
        assert_eq!(farm.effective_fee(), 400);
    }

    #[test]
    fn seeded_registry_persists_defaults_once() {
        let (store, clock) = parts();
        let fees = Registry::<CategoryFee>::seeded(store.clone(), clock);

        let loaded = fees.load();
        assert_eq!(loaded.len(), Category::ALL.len());
        assert!(store.get(Slot::CategoryFees).unwrap().is_some());

        let changed = fees
            .update(
                "farmelife",
                CategoryFee {
                    category: Category::JobCard,
                    actual_fee: 1500,
                    offer_fee: 500,
                    has_offer: true,
                    image: Some("https://example.org/farm.jpg".into()),
                },
            )
            .unwrap();
        assert_eq!(changed.category, Category::Farmelife);
        assert_eq!(fees.get("farmelife").unwrap().actual_fee, 1500);
        assert_eq!(fees.load().len(), Category::ALL.len());
    }

    #[test]
    fn unseeded_registry_stays_empty() {
        let (store, clock) = parts();
        let gallery = Registry::<GalleryPhoto>::new(store.clone(), clock);
        assert!(gallery.load().is_empty());
        assert!(store.get(Slot::Gallery).unwrap().is_none());
    }

    #[test]
    fn default_panchayaths_seed_with_stable_ids() {
        let (store, clock) = parts();
        let registry = Registry::<Panchayath>::seeded(store, clock);
        let list = registry.load();
        assert_eq!(list.len(), DEFAULT_PANCHAYATHS.len());
        assert_eq!(list[0].id, "default-01");
        assert!(list.iter().any(|p| p.english_name == "Tanur"));
        assert_eq!(registry.load(), list);
    }

    #[test]
    fn gallery_adds_newest_first_and_validates() {
        let (store, clock) = parts();
        let gallery = Registry::<GalleryPhoto>::new(store, clock);

        let first = gallery
            .create(GalleryPhotoInput {
                title: "Inauguration".into(),
                image_url: "https://example.org/1.jpg".into(),
                description: None,
                category: None,
            })
            .unwrap();
        let second = gallery
            .create(GalleryPhotoInput {
                title: "Training".into(),
                image_url: "https://example.org/2.jpg".into(),
                description: Some("Batch 2".into()),
                category: Some("training".into()),
            })
            .unwrap();
        assert_eq!(first.category, "general");
        assert_eq!(first.uploaded_at, now());

        let ids: Vec<_> = gallery.load().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let err = gallery
            .create(GalleryPhotoInput {
                title: "No image".into(),
                image_url: " ".into(),
                description: None,
                category: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(gallery.load().len(), 2);
    }

    #[test]
    fn update_keeps_identity_and_rejects_blank_fields() {
        let (store, clock) = parts();
        let notes = Registry::<PushNotification>::new(store, clock);
        let created = notes
            .create(NotificationInput {
                title: "Camp".into(),
                message: "Camp on Friday".into(),
                is_active: true,
            })
            .unwrap();

        let updated = notes
            .update(
                &created.id,
                NotificationInput {
                    title: "Camp moved".into(),
                    message: "Camp on Saturday".into(),
                    is_active: false,
                },
            )
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(!updated.is_active);

        let err = notes
            .update(
                &created.id,
                NotificationInput {
                    title: "".into(),
                    message: "x".into(),
                    is_active: true,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(notes.get(&created.id).unwrap().title, "Camp moved");
    }

    #[test]
    fn remove_and_missing_keys() {
        let (store, clock) = parts();
        let announcements = Registry::<Announcement>::new(store, clock);
        let a = announcements
            .create(AnnouncementInput {
                title: "Results".into(),
                content: "Approved list published".into(),
                is_active: true,
                expires_at: None,
            })
            .unwrap();

        assert_eq!(announcements.remove(&a.id).unwrap(), 1);
        assert_eq!(announcements.remove(&a.id).unwrap(), 0);
        assert!(matches!(
            announcements.get(&a.id).unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[test]
    fn removing_every_panchayath_restores_defaults() {
        let (store, clock) = parts();
        let registry = Registry::<Panchayath>::seeded(store.clone(), clock);
        for p in registry.load() {
            assert_eq!(registry.remove(&p.id).unwrap(), 1);
        }
        assert_eq!(store.get(Slot::Panchayaths).unwrap().as_deref(), Some("[]"));

        let reloaded = registry.load();
        assert_eq!(reloaded.len(), DEFAULT_PANCHAYATHS.len());
        assert!(reloaded.iter().all(|p| p.district == DEFAULT_DISTRICT));
    }

    #[test]
    fn unreadable_entries_do_not_trigger_reseeding() {
        let (store, clock) = parts();
        store
            .set(Slot::Panchayaths, r#"[{"id":"broken","englishName":42}]"#)
            .unwrap();
        let registry = Registry::<Panchayath>::seeded(store.clone(), clock);

        assert!(registry.load().is_empty());
        registry
            .create(PanchayathInput {
                english_name: "Tanur".into(),
                malayalam_name: None,
                district: None,
            })
            .unwrap();

        let raw = store.get(Slot::Panchayaths).unwrap().unwrap();
        assert!(raw.contains("\"broken\""));
        assert_eq!(registry.load().len(), 1);
    }

    #[test]
    fn save_rejects_duplicate_keys() {
        let (store, clock) = parts();
        let fees = Registry::<CategoryFee>::seeded(store, clock);
        let mut list = fees.load();
        list.push(list[0].clone());
        assert!(matches!(fees.save(&list).unwrap_err(), Error::Validation(_)));
    }
}
