//! Session-spanning cache of synthesized speech: a flat JSON map from the
//! exact sentence text to its base64 WAV data, persisted in the platform
//! data dir. Loaded once at startup, written after every successful
//! synthesis. A corrupt or missing file degrades to an empty cache.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

const CACHE_FILE: &str = "audio_cache.json";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AudioCacheData {
    #[serde(default)]
    pub entries: HashMap<String, String>,
}

pub struct AudioStore {
    base_dir: PathBuf,
}

impl AudioStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("badasseugi");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    #[allow(dead_code)] // Used by integration tests
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn cache_path(&self) -> PathBuf {
        self.base_dir.join(CACHE_FILE)
    }

    pub fn load(&self) -> AudioCacheData {
        let path = self.cache_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => AudioCacheData::default(),
            }
        } else {
            AudioCacheData::default()
        }
    }

    /// Atomic write: stage to .tmp, fsync, rename over the old file.
    pub fn save(&self, data: &AudioCacheData) -> Result<()> {
        let path = self.cache_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Record one synthesis result (WAV bytes, stored base64) and persist.
    pub fn put(&self, data: &mut AudioCacheData, sentence: &str, wav: &[u8]) -> Result<()> {
        data.entries
            .insert(sentence.to_string(), BASE64.encode(wav));
        self.save(data)
    }

    /// Decoded WAV bytes for a sentence, if cached. A corrupt entry is
    /// treated as a miss.
    pub fn get(data: &AudioCacheData, sentence: &str) -> Option<Vec<u8>> {
        let b64 = data.entries.get(sentence)?;
        BASE64.decode(b64.as_bytes()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, AudioStore) {
        let dir = TempDir::new().unwrap();
        let store = AudioStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.load().entries.is_empty());
    }

    #[test]
    fn test_put_then_reload_round_trips_bytes() {
        let (_dir, store) = make_test_store();
        let mut data = store.load();
        let wav = vec![0x52, 0x49, 0x46, 0x46, 0x00, 0x01];
        store.put(&mut data, "학교에 가요", &wav).unwrap();

        let reloaded = store.load();
        assert_eq!(AudioStore::get(&reloaded, "학교에 가요").unwrap(), wav);
        assert!(AudioStore::get(&reloaded, "도서관").is_none());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let (_dir, store) = make_test_store();
        fs::write(store.cache_path(), "not json {{{").unwrap();
        assert!(store.load().entries.is_empty());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let mut data = AudioCacheData::default();
        data.entries
            .insert("학교".to_string(), "!!not-base64!!".to_string());
        assert!(AudioStore::get(&data, "학교").is_none());
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let (dir, store) = make_test_store();
        let mut data = store.load();
        store.put(&mut data, "학교", b"abc").unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }
}
