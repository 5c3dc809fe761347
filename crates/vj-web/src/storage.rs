use vj_core::preset::PresetError;
use vj_core::{PresetStorage, MIDI_STORAGE_KEY, PRESET_STORAGE_KEY};
use web_sys as web;

/// `localStorage` persistence. Private browsing modes may deny access, in
/// which case reads come back empty and writes report a storage error.
pub struct LocalStorage {
    storage: Option<web::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("[preset] localStorage unavailable; presets will not persist");
        }
        Self { storage }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PresetError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| PresetError::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| PresetError::Storage(format!("{:?}", e)))
    }
}

impl PresetStorage for LocalStorage {
    fn load_presets(&self) -> Option<String> {
        self.get(PRESET_STORAGE_KEY)
    }

    fn save_presets(&mut self, json: &str) -> Result<(), PresetError> {
        self.set(PRESET_STORAGE_KEY, json)
    }

    fn load_midi_mappings(&self) -> Option<String> {
        self.get(MIDI_STORAGE_KEY)
    }

    fn save_midi_mappings(&mut self, json: &str) -> Result<(), PresetError> {
        self.set(MIDI_STORAGE_KEY, json)
    }
}
