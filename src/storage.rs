use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::circle::{Circle, CircleId, CircleSet};

/// Quiet window before a burst of edits is written through.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Durable storage for one image's circle collection. The editor only calls
/// into this; it never learns how or where the rows live.
pub trait CircleRepository {
    /// Loads the collection, index ascending. Missing images load empty.
    fn load_circles(&self, image_id: &str) -> Result<Vec<Circle>>;

    /// Upserts `circles` by id and removes rows matching `deleted_ids`. An
    /// empty collection instead deletes everything stored for the image.
    fn save_circles(
        &self,
        image_id: &str,
        circles: &[Circle],
        deleted_ids: &[CircleId],
    ) -> Result<()>;
}

/// Local fallback repository: one JSON file per image id.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Store under the platform data directory.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "pinmark", "pinmark")
            .context("cannot resolve a data directory")?;
        Ok(Self {
            root: dirs.data_dir().join("circles"),
        })
    }

    /// Store rooted at an explicit directory (tests).
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn file_path(&self, image_id: &str) -> PathBuf {
        self.root.join(format!("{image_id}.json"))
    }

    fn read_rows(&self, image_id: &str) -> Result<Vec<Circle>> {
        let path = self.file_path(image_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let rows: Vec<Circle> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed circle data in {}", path.display()))?;
        Ok(rows)
    }
}

impl CircleRepository for LocalStore {
    fn load_circles(&self, image_id: &str) -> Result<Vec<Circle>> {
        let mut rows = self.read_rows(image_id)?;
        rows.sort_by_key(|c| c.index);
        Ok(rows)
    }

    fn save_circles(
        &self,
        image_id: &str,
        circles: &[Circle],
        deleted_ids: &[CircleId],
    ) -> Result<()> {
        let path = self.file_path(image_id);

        if circles.is_empty() {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("cannot remove {}", path.display()))?;
            }
            return Ok(());
        }

        let mut rows = self.read_rows(image_id).unwrap_or_default();
        rows.retain(|row| !deleted_ids.contains(&row.id));
        for circle in circles {
            match rows.iter_mut().find(|row| row.id == circle.id) {
                Some(row) => *row = circle.clone(),
                None => rows.push(circle.clone()),
            }
        }
        rows.sort_by_key(|c| c.index);

        fs::create_dir_all(&self.root)
            .with_context(|| format!("cannot create {}", self.root.display()))?;
        let raw = serde_json::to_string_pretty(&rows)?;
        fs::write(&path, raw).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

/// Observes the store's revision counter and coalesces bursts of edits into
/// one repository write after the quiet window. Runs on the UI loop; a failed
/// save is logged and its deleted ids are re-queued so a later save still
/// reconciles.
pub struct DebouncedSaver {
    delay: Duration,
    seen_revision: u64,
    dirty_since: Option<Instant>,
}

impl DebouncedSaver {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seen_revision: 0,
            dirty_since: None,
        }
    }

    /// Forget pending work and adopt the given revision as clean, e.g. right
    /// after loading a collection from the repository.
    pub fn settle_at(&mut self, revision: u64) {
        self.seen_revision = revision;
        self.dirty_since = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// One poll per frame: restarts the quiet window on every new revision
    /// and writes through once the window elapses.
    pub fn tick(
        &mut self,
        repo: &dyn CircleRepository,
        image_id: &str,
        circles: &mut CircleSet,
        now: Instant,
    ) {
        if circles.revision() != self.seen_revision {
            self.seen_revision = circles.revision();
            self.dirty_since = Some(now);
        }
        let Some(since) = self.dirty_since else {
            return;
        };
        if now.duration_since(since) < self.delay {
            return;
        }
        self.flush(repo, image_id, circles);
    }

    /// Immediate write of any pending change, e.g. on shutdown.
    pub fn flush(&mut self, repo: &dyn CircleRepository, image_id: &str, circles: &mut CircleSet) {
        if self.dirty_since.is_none() && circles.revision() == self.seen_revision {
            return;
        }
        self.seen_revision = circles.revision();
        self.dirty_since = None;
        let deleted = circles.take_deleted();
        if let Err(err) = repo.save_circles(image_id, circles.circles(), &deleted) {
            log::error!("saving circles for {image_id} failed: {err:#}");
            circles.restore_deleted(deleted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CircleRepository, DebouncedSaver, LocalStore, SAVE_DEBOUNCE};
    use crate::circle::{CircleSet, PctPoint};
    use std::time::{Duration, Instant};

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::with_root(dir.path().join("circles"));
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        let a = set.create(PctPoint::new(30.0, 30.0), 14.0);
        set.create(PctPoint::new(60.0, 60.0), 8.0);
        set.set_comment(a, "hello");

        store.save_circles("img", set.circles(), &[]).unwrap();
        let loaded = store.load_circles("img").unwrap();
        assert_eq!(loaded, set.circles());
    }

    #[test]
    fn missing_image_loads_empty() {
        let (_dir, store) = store();
        assert!(store.load_circles("nothing-here").unwrap().is_empty());
    }

    #[test]
    fn deleted_ids_drop_existing_rows() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        set.create(PctPoint::new(10.0, 10.0), 5.0);
        set.create(PctPoint::new(20.0, 20.0), 5.0);
        store.save_circles("img", set.circles(), &[]).unwrap();

        let doomed = set.circles()[0].id;
        set.delete(doomed);
        let deleted = set.take_deleted();
        store.save_circles("img", set.circles(), &deleted).unwrap();

        let loaded = store.load_circles("img").unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.iter().all(|c| c.id != doomed));
        assert_eq!(loaded[0].index, 0);
    }

    #[test]
    fn empty_save_purges_the_image() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        let id = set.create(PctPoint::new(10.0, 10.0), 5.0);
        store.save_circles("img", set.circles(), &[]).unwrap();

        set.delete(id);
        let deleted = set.take_deleted();
        store.save_circles("img", set.circles(), &deleted).unwrap();
        assert!(store.load_circles("img").unwrap().is_empty());
    }

    #[test]
    fn upsert_keeps_rows_not_in_the_payload() {
        let (_dir, store) = store();
        let mut first = CircleSet::new();
        first.create(PctPoint::new(10.0, 10.0), 5.0);
        store.save_circles("img", first.circles(), &[]).unwrap();

        let mut second = CircleSet::new();
        second.create(PctPoint::new(50.0, 50.0), 9.0);
        store.save_circles("img", second.circles(), &[]).unwrap();

        assert_eq!(store.load_circles("img").unwrap().len(), 2);
    }

    #[test]
    fn debounce_coalesces_a_burst_into_one_write() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        let mut saver = DebouncedSaver::new(SAVE_DEBOUNCE);
        let t0 = Instant::now();

        let id = set.create(PctPoint::new(10.0, 10.0), 5.0);
        saver.tick(&store, "img", &mut set, t0);
        assert!(store.load_circles("img").unwrap().is_empty());

        // More edits inside the window keep it open.
        set.move_center(id, PctPoint::new(20.0, 20.0));
        saver.tick(&store, "img", &mut set, t0 + Duration::from_millis(300));
        assert!(store.load_circles("img").unwrap().is_empty());

        // Quiet period elapsed: exactly one write with the latest state.
        saver.tick(&store, "img", &mut set, t0 + Duration::from_millis(900));
        let loaded = store.load_circles("img").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!((loaded[0].x, loaded[0].y), (20.0, 20.0));

        // Nothing left pending afterwards.
        assert!(!saver.is_dirty());
    }

    #[test]
    fn settle_at_ignores_the_load_revision() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        set.create(PctPoint::new(10.0, 10.0), 5.0);

        let mut saver = DebouncedSaver::new(SAVE_DEBOUNCE);
        saver.settle_at(set.revision());
        let t0 = Instant::now();
        saver.tick(&store, "img", &mut set, t0 + Duration::from_secs(5));
        assert!(store.load_circles("img").unwrap().is_empty());
    }

    #[test]
    fn flush_writes_pending_changes_immediately() {
        let (_dir, store) = store();
        let mut set = CircleSet::new();
        let mut saver = DebouncedSaver::new(SAVE_DEBOUNCE);
        set.create(PctPoint::new(10.0, 10.0), 5.0);
        saver.tick(&store, "img", &mut set, Instant::now());

        saver.flush(&store, "img", &mut set);
        assert_eq!(store.load_circles("img").unwrap().len(), 1);
    }
}
