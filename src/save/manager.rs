//! Numbered save slots on disk
//!
//! Slot files live in one directory as `save_slot_<n>.json`, with a
//! separate `autosave.json` the driver rewrites each century. Slot 0
//! doubles as the quicksave target.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::error::{LichError, Result};
use crate::save::context::SaveContext;

/// Current save format version; bumped on incompatible layout changes.
pub const SAVE_VERSION: i64 = 1;

/// Slot the quicksave shortcut writes to.
pub const QUICKSAVE_SLOT: u8 = 0;

const AUTOSAVE_FILE: &str = "autosave.json";

/// Summary of one occupied slot, readable without restoring the game
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub slot: u8,
    pub timestamp: u64,
    pub year: u32,
    pub gold: String,
}

/// Owns the save directory and slot naming
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
    max_slots: u8,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>, max_slots: u8) -> Self {
        Self {
            dir: dir.into(),
            max_slots,
        }
    }

    pub fn max_slots(&self) -> u8 {
        self.max_slots
    }

    pub fn slot_path(&self, slot: u8) -> PathBuf {
        self.dir.join(format!("save_slot_{}.json", slot))
    }

    pub fn autosave_path(&self) -> PathBuf {
        self.dir.join(AUTOSAVE_FILE)
    }

    fn validate_slot(&self, slot: u8) -> Result<()> {
        if slot >= self.max_slots {
            return Err(LichError::InvalidSlot(slot));
        }
        Ok(())
    }

    /// Stamps the header and writes the context to the given slot.
    pub fn save_to_slot(&self, slot: u8, ctx: &mut SaveContext) -> Result<()> {
        self.validate_slot(slot)?;
        self.write_file(&self.slot_path(slot), ctx)?;
        tracing::info!(slot, "saved game");
        Ok(())
    }

    pub fn load_from_slot(&self, slot: u8) -> Result<SaveContext> {
        self.validate_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(LichError::Load(format!("slot {} is empty", slot)));
        }
        let ctx = self.read_file(&path)?;
        tracing::info!(slot, "loaded game");
        Ok(ctx)
    }

    pub fn quicksave(&self, ctx: &mut SaveContext) -> Result<()> {
        self.save_to_slot(QUICKSAVE_SLOT, ctx)
    }

    pub fn quickload(&self) -> Result<SaveContext> {
        self.load_from_slot(QUICKSAVE_SLOT)
    }

    pub fn autosave(&self, ctx: &mut SaveContext) -> Result<()> {
        self.write_file(&self.autosave_path(), ctx)?;
        tracing::debug!("autosave written");
        Ok(())
    }

    pub fn load_autosave(&self) -> Result<SaveContext> {
        let path = self.autosave_path();
        if !path.exists() {
            return Err(LichError::Load("no autosave present".to_string()));
        }
        self.read_file(&path)
    }

    pub fn slot_exists(&self, slot: u8) -> bool {
        slot < self.max_slots && self.slot_path(slot).exists()
    }

    pub fn delete_slot(&self, slot: u8) -> Result<()> {
        self.validate_slot(slot)?;
        let path = self.slot_path(slot);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Reads a slot's header without restoring the game. Returns `None`
    /// for empty or unreadable slots.
    pub fn slot_info(&self, slot: u8) -> Option<SlotInfo> {
        if !self.slot_exists(slot) {
            return None;
        }
        let ctx = SaveContext::read_from_file(&self.slot_path(slot)).ok()?;
        Some(SlotInfo {
            slot,
            timestamp: ctx.read_uint("save-timestamp", 0),
            year: ctx.read_uint("summary-year", 0) as u32,
            gold: ctx.read_string("summary-gold", "?"),
        })
    }

    /// Info for every occupied slot, in slot order.
    pub fn list_slots(&self) -> Vec<SlotInfo> {
        (0..self.max_slots)
            .filter_map(|slot| self.slot_info(slot))
            .collect()
    }

    fn write_file(&self, path: &Path, ctx: &mut SaveContext) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        ctx.write_int("save-version", SAVE_VERSION);
        ctx.write_uint("save-timestamp", unix_now());
        ctx.write_to_file(path)
            .map_err(|e| LichError::Save(format!("{}: {}", path.display(), e)))
    }

    fn read_file(&self, path: &Path) -> Result<SaveContext> {
        let ctx = SaveContext::read_from_file(path)?;
        let version = ctx.read_int("save-version", 0);
        if version > SAVE_VERSION {
            return Err(LichError::Load(format!(
                "save version {} is newer than supported version {}",
                version, SAVE_VERSION
            )));
        }
        Ok(ctx)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_context() -> SaveContext {
        let mut ctx = SaveContext::new();
        ctx.write_uint("summary-year", 901);
        ctx.write_string("summary-gold", "1.25M");
        ctx.begin_section("world");
        ctx.write_int("current-year", 901);
        ctx.end_section();
        ctx
    }

    #[test]
    fn test_save_and_load_slot() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.save_to_slot(3, &mut ctx).unwrap();

        assert!(manager.slot_exists(3));
        let mut loaded = manager.load_from_slot(3).unwrap();
        assert_eq!(loaded.read_int("save-version", 0), SAVE_VERSION);
        loaded.begin_section("world");
        assert_eq!(loaded.read_int("current-year", 0), 901);
    }

    #[test]
    fn test_invalid_slot_rejected() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        assert!(matches!(
            manager.save_to_slot(10, &mut ctx),
            Err(LichError::InvalidSlot(10))
        ));
        assert!(matches!(
            manager.load_from_slot(42),
            Err(LichError::InvalidSlot(42))
        ));
    }

    #[test]
    fn test_empty_slot_load_fails() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);
        assert!(manager.load_from_slot(5).is_err());
        assert!(!manager.slot_exists(5));
    }

    #[test]
    fn test_quicksave_uses_slot_zero() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.quicksave(&mut ctx).unwrap();

        assert!(manager.slot_exists(QUICKSAVE_SLOT));
        let loaded = manager.quickload().unwrap();
        assert_eq!(loaded.read_uint("summary-year", 0), 901);
    }

    #[test]
    fn test_autosave_separate_from_slots() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.autosave(&mut ctx).unwrap();

        assert!(manager.autosave_path().exists());
        for slot in 0..10 {
            assert!(!manager.slot_exists(slot));
        }
        assert!(manager.load_autosave().is_ok());
    }

    #[test]
    fn test_slot_info_peek() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.save_to_slot(1, &mut ctx).unwrap();

        let info = manager.slot_info(1).unwrap();
        assert_eq!(info.slot, 1);
        assert_eq!(info.year, 901);
        assert_eq!(info.gold, "1.25M");
        assert!(info.timestamp > 0);

        assert!(manager.slot_info(2).is_none());
        assert_eq!(manager.list_slots().len(), 1);
    }

    #[test]
    fn test_delete_slot() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.save_to_slot(4, &mut ctx).unwrap();
        assert!(manager.slot_exists(4));

        manager.delete_slot(4).unwrap();
        assert!(!manager.slot_exists(4));
        // Deleting an already-empty slot is not an error
        manager.delete_slot(4).unwrap();
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), 10);

        let mut ctx = sample_context();
        manager.save_to_slot(0, &mut ctx).unwrap();

        // Rewrite the file claiming a future version
        let mut tampered = SaveContext::read_from_file(&manager.slot_path(0)).unwrap();
        tampered.write_int("save-version", SAVE_VERSION + 1);
        tampered.write_to_file(&manager.slot_path(0)).unwrap();

        assert!(manager.load_from_slot(0).is_err());
    }
}
