use std::fs;
use std::path::PathBuf;
use vj_core::preset::PresetError;
use vj_core::{PresetStorage, MIDI_STORAGE_KEY, PRESET_STORAGE_KEY};

/// One JSON file per storage key under `dir` (`VJ_DATA_DIR`, default `.`).
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn from_env() -> Self {
        let dir = std::env::var_os("VJ_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn write(&self, key: &str, json: &str) -> Result<(), PresetError> {
        fs::create_dir_all(&self.dir).map_err(|e| PresetError::Storage(e.to_string()))?;
        fs::write(self.path(key), json).map_err(|e| PresetError::Storage(e.to_string()))
    }
}

impl PresetStorage for FileStorage {
    fn load_presets(&self) -> Option<String> {
        self.read(PRESET_STORAGE_KEY)
    }

    fn save_presets(&mut self, json: &str) -> Result<(), PresetError> {
        self.write(PRESET_STORAGE_KEY, json)
    }

    fn load_midi_mappings(&self) -> Option<String> {
        self.read(MIDI_STORAGE_KEY)
    }

    fn save_midi_mappings(&mut self, json: &str) -> Result<(), PresetError> {
        self.write(MIDI_STORAGE_KEY, json)
    }
}
