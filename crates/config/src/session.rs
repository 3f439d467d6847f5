use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Last known viewport of one table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ViewportSnapshot {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Session {
    pub version: u32,
    pub last_table: Option<i64>,
    pub viewports: BTreeMap<i64, ViewportSnapshot>,
}

impl Session {
    pub fn path() -> PathBuf {
        crate::config_dir().join("session.json")
    }

    pub fn load() -> Option<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        fs::read_to_string(path).ok()
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Viewport to restore when `table_id` is opened again.
    pub fn viewport(&self, table_id: i64) -> ViewportSnapshot {
        self.viewports.get(&table_id).copied().unwrap_or_default()
    }

    pub fn remember(&mut self, table_id: i64, snapshot: ViewportSnapshot) {
        self.last_table = Some(table_id);
        self.viewports.insert(table_id, snapshot);
    }

    /// Drop state for a deleted table.
    pub fn forget(&mut self, table_id: i64) {
        self.viewports.remove(&table_id);
        if self.last_table == Some(table_id) {
            self.last_table = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_gets_default_viewport() {
        let session = Session::default();
        assert_eq!(session.viewport(7), ViewportSnapshot::default());
    }

    #[test]
    fn test_remember_and_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = Session::default();
        session.remember(3, ViewportSnapshot { scale: 1.5, offset_x: 240.0, offset_y: 88.0 });
        session.save_to(&path).unwrap();

        let loaded = Session::load_from(&path).unwrap();
        assert_eq!(loaded.last_table, Some(3));
        assert_eq!(loaded.viewport(3).scale, 1.5);
        assert_eq!(loaded.viewport(3).offset_x, 240.0);
    }

    #[test]
    fn test_forget_clears_last_table() {
        let mut session = Session::default();
        session.remember(1, ViewportSnapshot::default());
        session.forget(1);
        assert!(session.viewports.is_empty());
        assert_eq!(session.last_table, None);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Session::load_from(&dir.path().join("absent.json")).is_none());
    }
}
