//! File-backed catalog of keyboards.
//!
//! The in-memory map is the working copy; every mutation rewrites the
//! whole backing file. A failed write is returned to the caller and the
//! in-memory change is kept.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::json_utils::{read_json, write_json};
use crate::model::Keyboard;

#[derive(Debug, Default)]
struct Catalog {
    keyboards: HashMap<u32, Keyboard>,
    /// Id handed to the next created keyboard. `None` once `u32::MAX` is taken.
    next_id: Option<u32>,
}

impl Catalog {
    fn from_records(records: Vec<Keyboard>) -> Self {
        let next_id = match records.iter().map(|k| k.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        let keyboards = records.into_iter().map(|k| (k.id, k)).collect();
        Self { keyboards, next_id }
    }

    fn allocate_id(&mut self) -> Result<u32> {
        let id = self.next_id.ok_or(Error::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    /// All keyboards ordered by id.
    fn sorted(&self) -> Vec<&Keyboard> {
        let mut keyboards: Vec<_> = self.keyboards.values().collect();
        keyboards.sort_by_key(|k| k.id);
        keyboards
    }

    fn filtered(&self, predicate: impl Fn(&Keyboard) -> bool) -> Vec<Keyboard> {
        self.sorted()
            .into_iter()
            .filter(|k| predicate(k))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    catalog: Mutex<Catalog>,
}

impl CatalogStore {
    /// Loads the catalog from `path`. A missing or malformed file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let catalog = Catalog::from_records(read_json(&path)?);
        info!(
            path = %path.display(),
            keyboards = catalog.keyboards.len(),
            next_id = ?catalog.next_id,
            "catalog loaded"
        );
        Ok(Self {
            path,
            catalog: Mutex::new(catalog),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let keyboards = catalog.sorted();
        if let Err(err) = write_json(&self.path, &keyboards) {
            warn!(path = %self.path.display(), error = %err, "catalog snapshot write failed");
            return Err(err);
        }
        debug!(path = %self.path.display(), keyboards = keyboards.len(), "catalog snapshot written");
        Ok(())
    }

    pub fn get_all(&self) -> Vec<Keyboard> {
        self.lock().filtered(|_| true)
    }

    /// Keyboards whose name contains `text` (case-sensitive).
    pub fn find(&self, text: &str) -> Vec<Keyboard> {
        self.lock().filtered(|k| k.name.contains(text))
    }

    pub fn get_by_id(&self, id: u32) -> Option<Keyboard> {
        self.lock().keyboards.get(&id).cloned()
    }

    /// Keyboards priced within `[from_price, to_price]`, both parsed from text.
    /// Bounds may be any integer, including negative ones.
    pub fn filter_by_price_range(&self, from_price: &str, to_price: &str) -> Result<Vec<Keyboard>> {
        let from = parse_price(from_price)?;
        let to = parse_price(to_price)?;
        Ok(self
            .lock()
            .filtered(|k| (from..=to).contains(&i64::from(k.price))))
    }

    /// Stores a copy of `candidate` under a freshly assigned id.
    ///
    /// The id is consumed even if the keyboard is then rejected.
    pub fn create(&self, candidate: &Keyboard) -> Result<Keyboard> {
        let mut catalog = self.lock();
        let keyboard = Keyboard {
            id: catalog.allocate_id()?,
            ..candidate.clone()
        };
        if catalog.keyboards.values().any(|k| *k == keyboard) {
            return Err(Error::KeyboardConflict);
        }
        catalog.keyboards.insert(keyboard.id, keyboard.clone());
        self.save(&catalog)?;
        Ok(keyboard)
    }

    /// Replaces the stored keyboard with the same id.
    pub fn update(&self, keyboard: Keyboard) -> Result<Keyboard> {
        let mut catalog = self.lock();
        if !catalog.keyboards.contains_key(&keyboard.id) {
            return Err(Error::KeyboardNotFound(keyboard.id));
        }
        catalog.keyboards.insert(keyboard.id, keyboard.clone());
        self.save(&catalog)?;
        Ok(keyboard)
    }

    /// Shifts the stock of `id` by `delta`. Returns the updated keyboard, or
    /// `None` without writing if `id` is not in the catalog.
    pub fn adjust_quantity(&self, id: u32, delta: i32) -> Result<Option<Keyboard>> {
        let mut catalog = self.lock();
        let Some(keyboard) = catalog.keyboards.get_mut(&id) else {
            return Ok(None);
        };
        keyboard.quantity += delta;
        let keyboard = keyboard.clone();
        self.save(&catalog)?;
        Ok(Some(keyboard))
    }

    /// Takes one unit of `id` out of stock if at least one is left. Returns
    /// the keyboard as it was before, or `None` when it is out of stock.
    pub fn reserve(&self, id: u32) -> Result<Option<Keyboard>> {
        let mut catalog = self.lock();
        let keyboard = catalog
            .keyboards
            .get_mut(&id)
            .ok_or(Error::KeyboardNotFound(id))?;
        if keyboard.quantity < 1 {
            return Ok(None);
        }
        let before = keyboard.clone();
        keyboard.quantity -= 1;
        self.save(&catalog)?;
        Ok(Some(before))
    }

    /// Removes a keyboard. Returns false, without writing, if it was absent.
    pub fn delete(&self, id: u32) -> Result<bool> {
        let mut catalog = self.lock();
        if catalog.keyboards.remove(&id).is_none() {
            return Ok(false);
        }
        self.save(&catalog)?;
        Ok(true)
    }
}

fn parse_price(input: &str) -> Result<i64> {
    input.parse().map_err(|source| Error::InvalidPrice {
        input: input.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Size, SwitchColor};
    use tempfile::TempDir;

    fn seed() -> Vec<Keyboard> {
        vec![
            Keyboard::new(99, "First", Size::Full, SwitchColor::Blue, 30, 20),
            Keyboard::new(100, "Second", Size::Sixty, SwitchColor::Red, 31, 21),
            Keyboard::new(101, "Third", Size::Full, SwitchColor::Brown, 32, 22),
            Keyboard::new(102, "Fourth", Size::Tkl, SwitchColor::Blue, 33, 23),
            Keyboard::new(103, "Fifth", Size::Full, SwitchColor::Red, 34, 24),
        ]
    }

    fn seeded_store() -> (TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        write_json(&path, &seed()).unwrap();
        let store = CatalogStore::open(&path).unwrap();
        (dir, store)
    }

    fn on_disk(store: &CatalogStore) -> Vec<Keyboard> {
        read_json(store.path()).unwrap()
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CatalogStore::open(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_next_id_follows_max_loaded_id() {
        let (_dir, store) = seeded_store();
        assert_eq!(store.lock().next_id, Some(104));
    }

    #[test]
    fn test_next_id_starts_at_zero_for_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, "[]").unwrap();
        let store = CatalogStore::open(&path).unwrap();

        let created = store
            .create(&Keyboard::new(42, "Zero", Size::Sixty, SwitchColor::Black, 1, 1))
            .unwrap();
        assert_eq!(created.id, 0);
    }

    #[test]
    fn test_get_all() {
        let (_dir, store) = seeded_store();
        assert_eq!(store.get_all(), seed());
    }

    #[test]
    fn test_find() {
        let (_dir, store) = seeded_store();
        let found = store.find("i");
        let seed = seed();
        assert_eq!(found, vec![seed[0].clone(), seed[2].clone(), seed[4].clone()]);
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let (_dir, store) = seeded_store();
        assert!(store.find("first").is_empty());
        assert_eq!(store.find("First").len(), 1);
    }

    #[test]
    fn test_get_by_id() {
        let (_dir, store) = seeded_store();
        assert_eq!(store.get_by_id(103), Some(seed()[4].clone()));
        assert_eq!(store.get_by_id(10000), None);
    }

    #[test]
    fn test_filter_by_price_range() {
        let (_dir, store) = seeded_store();
        let keyboards = store.filter_by_price_range("30", "32").unwrap();
        assert_eq!(keyboards.len(), 3);
        assert!(keyboards.iter().all(|k| (30..=32).contains(&k.price)));
    }

    #[test]
    fn test_filter_by_price_range_matches_get_all_subset() {
        let (_dir, store) = seeded_store();
        for (from, to) in [(0, 100), (31, 31), (33, 40), (35, 99)] {
            let expected: Vec<_> = store
                .get_all()
                .into_iter()
                .filter(|k| k.price >= from && k.price <= to)
                .collect();
            let actual = store
                .filter_by_price_range(&from.to_string(), &to.to_string())
                .unwrap();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_filter_by_price_range_inverted_is_empty() {
        let (_dir, store) = seeded_store();
        assert!(store.filter_by_price_range("34", "30").unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_price_range_malformed_input() {
        let (_dir, store) = seeded_store();
        assert!(matches!(
            store.filter_by_price_range("abc", "30"),
            Err(Error::InvalidPrice { .. })
        ));
        assert!(matches!(
            store.filter_by_price_range("30", "3.5"),
            Err(Error::InvalidPrice { .. })
        ));
        assert!(matches!(
            store.filter_by_price_range("", "30"),
            Err(Error::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_filter_by_price_range_negative_bounds() {
        let (_dir, store) = seeded_store();
        let keyboards = store.filter_by_price_range("-1", "30").unwrap();
        assert_eq!(keyboards, vec![seed()[0].clone()]);
        assert!(store.filter_by_price_range("-10", "-1").unwrap().is_empty());
    }

    #[test]
    fn test_create_assigns_next_id() {
        let (_dir, store) = seeded_store();
        let candidate = Keyboard::new(5, "First", Size::Full, SwitchColor::Blue, 30, 20);

        let created = store.create(&candidate).unwrap();
        assert_eq!(created.id, 104);
        assert_eq!(created.name, "First");
        assert_eq!(created.size, Size::Full);
        assert_eq!(created.switch_color, SwitchColor::Blue);
        assert_eq!(store.get_by_id(104), Some(created.clone()));
        assert!(on_disk(&store).contains(&created));
    }

    #[test]
    fn test_create_ids_strictly_increase() {
        let (_dir, store) = seeded_store();
        let candidate = Keyboard::new(0, "New", Size::Tkl, SwitchColor::Black, 20, 200);
        let mut last = 103;
        for _ in 0..5 {
            let created = store.create(&candidate).unwrap();
            assert!(created.id > last);
            assert_eq!(store.get_by_id(created.id), Some(created.clone()));
            last = created.id;
        }
    }

    #[test]
    fn test_create_conflict_consumes_id() {
        let (_dir, store) = seeded_store();
        // Force the counter back onto an existing record so the equality guard fires.
        store.lock().next_id = Some(99);
        let duplicate = Keyboard::new(0, "First", Size::Sixty, SwitchColor::Red, 30, 20);

        assert!(matches!(store.create(&duplicate), Err(Error::KeyboardConflict)));
        assert_eq!(store.lock().next_id, Some(100));
        assert_eq!(store.get_all().len(), 5);
    }

    #[test]
    fn test_open_with_largest_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        let last = Keyboard::new(u32::MAX, "Last", Size::Full, SwitchColor::Blue, 10, 1);
        write_json(&path, &[last.clone()]).unwrap();

        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.get_by_id(u32::MAX), Some(last));

        let candidate = Keyboard::new(0, "Next", Size::Tkl, SwitchColor::Red, 5, 1);
        assert!(matches!(store.create(&candidate), Err(Error::IdsExhausted)));
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn test_create_takes_largest_id_once() {
        let (_dir, store) = seeded_store();
        store.lock().next_id = Some(u32::MAX);
        let candidate = Keyboard::new(0, "Edge", Size::Tkl, SwitchColor::Red, 5, 1);

        assert_eq!(store.create(&candidate).unwrap().id, u32::MAX);
        assert!(matches!(store.create(&candidate), Err(Error::IdsExhausted)));
        assert_eq!(store.get_all().len(), 6);
    }

    #[test]
    fn test_adjust_quantity() {
        let (_dir, store) = seeded_store();
        let updated = store.adjust_quantity(99, -25).unwrap().unwrap();
        assert_eq!(updated.quantity, -5);
        assert_eq!(store.get_by_id(99).unwrap().quantity, -5);
        assert!(on_disk(&store).iter().any(|k| k.id == 99 && k.quantity == -5));

        std::fs::remove_file(store.path()).unwrap();
        assert_eq!(store.adjust_quantity(7, 1).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_reserve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        write_json(&path, &[Keyboard::new(1, "One", Size::Full, SwitchColor::Red, 10, 1)]).unwrap();
        let store = CatalogStore::open(&path).unwrap();

        let before = store.reserve(1).unwrap().unwrap();
        assert_eq!(before.quantity, 1);
        assert_eq!(store.get_by_id(1).unwrap().quantity, 0);
        assert_eq!(store.reserve(1).unwrap(), None);
        assert_eq!(store.get_by_id(1).unwrap().quantity, 0);
        assert!(matches!(store.reserve(2), Err(Error::KeyboardNotFound(2))));
    }

    #[test]
    fn test_concurrent_reserve_never_oversells() {
        let (_dir, store) = seeded_store();
        let taken = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let (store, taken) = (&store, &taken);
                scope.spawn(move || {
                    for _ in 0..5 {
                        if store.reserve(99).unwrap().is_some() {
                            taken.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        // 40 attempts against a stock of 20.
        assert_eq!(taken.into_inner(), 20);
        assert_eq!(store.get_by_id(99).unwrap().quantity, 0);
        assert!(on_disk(&store).iter().any(|k| k.id == 99 && k.quantity == 0));
    }

    #[test]
    fn test_update() {
        let (_dir, store) = seeded_store();
        let mut keyboard = store.get_by_id(103).unwrap();
        keyboard.price = 99;
        keyboard.switch_color = SwitchColor::Black;

        let updated = store.update(keyboard.clone()).unwrap();
        assert_eq!(updated, keyboard);
        let stored = store.get_by_id(103).unwrap();
        assert_eq!(stored.price, 99);
        assert_eq!(stored.switch_color, SwitchColor::Black);
        assert!(on_disk(&store).iter().any(|k| k.id == 103 && k.price == 99));
    }

    #[test]
    fn test_update_not_found() {
        let (_dir, store) = seeded_store();
        let keyboard = Keyboard::new(1, "ss", Size::Full, SwitchColor::Blue, 100, 2);
        assert!(matches!(
            store.update(keyboard),
            Err(Error::KeyboardNotFound(1))
        ));
        assert_eq!(store.get_all().len(), 5);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = seeded_store();
        assert!(store.delete(103).unwrap());
        assert_eq!(store.get_by_id(103), None);
        assert_eq!(store.get_all().len(), 4);
        assert_eq!(on_disk(&store).len(), 4);
    }

    #[test]
    fn test_delete_not_found_does_not_write() {
        let (_dir, store) = seeded_store();
        std::fs::remove_file(store.path()).unwrap();

        assert!(!store.delete(10000).unwrap());
        assert_eq!(store.get_all().len(), 5);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_write_failure_keeps_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        let path = data_dir.join("inventory.json");
        write_json(&path, &seed()).unwrap();
        let store = CatalogStore::open(&path).unwrap();
        std::fs::remove_dir_all(&data_dir).unwrap();

        let candidate = Keyboard::new(0, "Lost", Size::Full, SwitchColor::Red, 1, 1);
        assert!(matches!(store.create(&candidate), Err(Error::Io(_))));
        assert_eq!(store.get_all().len(), 6);
        assert_eq!(store.find("Lost").len(), 1);
    }

    #[test]
    fn test_reload_round_trip() {
        let (_dir, store) = seeded_store();
        store
            .create(&Keyboard::new(0, "Sixth", Size::Sixty, SwitchColor::Brown, 35, 25))
            .unwrap();
        store.delete(100).unwrap();

        let reloaded = CatalogStore::open(store.path()).unwrap();
        let before = store.get_all();
        let after = reloaded.get_all();
        assert_eq!(after.len(), before.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a, b);
            assert_eq!(a.size, b.size);
            assert_eq!(a.switch_color, b.switch_color);
        }
        assert_eq!(reloaded.lock().next_id, Some(105));
    }

    #[test]
    fn test_concurrent_creates_get_unique_ids() {
        let (_dir, store) = seeded_store();

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..10 {
                        let name = format!("t{t}-{i}");
                        store
                            .create(&Keyboard::new(0, name, Size::Full, SwitchColor::Red, 10, 1))
                            .unwrap();
                    }
                });
            }
        });

        let all = store.get_all();
        assert_eq!(all.len(), 45);
        let mut ids: Vec<_> = all.iter().map(|k| k.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 45);
        assert_eq!(on_disk(&store).len(), 45);
    }
}
