//! Durable slot holding the serialized event collection.
//!
//! A slot is one named blob of text that is read whole and overwritten whole.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use fs2::FileExt;

use crate::error::{CalendarError, CalendarResult};

/// Name of the slot that holds all events.
pub const EVENTS_SLOT: &str = "calendar-events";

/// A single named slot in durable local storage.
pub trait Storage: Send + Sync {
    /// Read the slot. `None` when nothing has been written yet.
    fn read(&self) -> CalendarResult<Option<String>>;

    /// Overwrite the slot.
    fn write(&self, contents: &str) -> CalendarResult<()>;

    /// Take the exclusive lock that guards a read-modify-write of the slot.
    fn lock(&self) -> CalendarResult<SlotLock>;
}

/// Lock guard returned by [`Storage::lock`]; the lock is released on drop.
pub struct SlotLock {
    _file: Option<File>,
}

impl SlotLock {
    /// A guard for storage that needs no cross-process locking.
    pub fn unlocked() -> Self {
        SlotLock { _file: None }
    }
}

// =============================================================================
// File slot
// =============================================================================

/// Slot stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: &Path, name: &str) -> Self {
        FileStorage {
            path: dir.join(format!("{}.json", name)),
        }
    }

    /// The events slot inside `data_dir`.
    pub fn events(data_dir: &Path) -> Self {
        Self::new(data_dir, EVENTS_SLOT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sidecar(&self, extension: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(extension);
        PathBuf::from(name)
    }

    fn ensure_parent(&self) -> CalendarResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CalendarError::Storage(format!("Could not create {}: {e}", parent.display()))
            })?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read(&self) -> CalendarResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CalendarError::Storage(format!(
                "Could not read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, contents: &str) -> CalendarResult<()> {
        self.ensure_parent()?;

        let temp = self.sidecar(".tmp");

        fs::write(&temp, contents).map_err(|e| {
            CalendarError::Storage(format!("Could not write {}: {e}", temp.display()))
        })?;
        fs::rename(&temp, &self.path).map_err(|e| {
            CalendarError::Storage(format!("Could not replace {}: {e}", self.path.display()))
        })?;

        Ok(())
    }

    fn lock(&self) -> CalendarResult<SlotLock> {
        self.ensure_parent()?;

        let lock_path = self.sidecar(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                CalendarError::Storage(format!("Could not open {}: {e}", lock_path.display()))
            })?;

        file.lock_exclusive().map_err(|e| {
            CalendarError::Storage(format!("Could not lock {}: {e}", lock_path.display()))
        })?;

        Ok(SlotLock { _file: Some(file) })
    }
}

// =============================================================================
// In-memory slot
// =============================================================================

/// Slot kept in memory. Useful for tests and for embedding without a disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing slot contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        MemoryStorage {
            slot: Mutex::new(Some(contents.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail, as a full disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Replace the slot contents behind the store's back.
    pub fn overwrite(&self, contents: impl Into<String>) {
        *self.slot.lock().expect("mutex poisoned") = Some(contents.into());
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().expect("mutex poisoned").clone()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> CalendarResult<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> CalendarResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CalendarError::Storage("storage quota exceeded".into()));
        }
        *self.slot.lock().expect("mutex poisoned") = Some(contents.to_string());
        Ok(())
    }

    fn lock(&self) -> CalendarResult<SlotLock> {
        Ok(SlotLock::unlocked())
    }
}
