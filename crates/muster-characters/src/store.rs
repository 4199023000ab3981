//! The character store: create, list, delete, activate, and sync back.
//!
//! Every operation resolves against one user's directory under the
//! store's base path. `activate` copies a save into the directory the
//! game loads from; `sync_character_back` copies the (possibly updated)
//! save home again after play.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::savefile::{self, CharacterClass, MAX_NAME_LEN};
use crate::CharacterError;

const METADATA_FILE: &str = "characters.json";
const SAVE_EXT: &str = "sav";

/// Seconds since the unix epoch.
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Strips everything outside `[A-Za-z0-9_-]` and truncates to the save
/// format's name limit. Returns `None` when nothing survives.
fn sanitize_name(raw: &str) -> Option<String> {
    let safe: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_NAME_LEN)
        .collect();
    if safe.is_empty() { None } else { Some(safe) }
}

/// Metadata kept per character in `characters.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMeta {
    pub class: CharacterClass,
    pub level: u8,
    pub hardcore: bool,
    /// Unix seconds at creation.
    pub created: u64,
    /// Unix seconds of the last activate/sync.
    pub last_played: u64,
    pub icon: String,
}

/// File/JSON-backed character registry.
#[derive(Debug, Clone)]
pub struct CharacterStore {
    base_dir: PathBuf,
    active_dir: PathBuf,
}

impl CharacterStore {
    /// Creates a store rooted at `base_dir`, activating saves into
    /// `active_dir`.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        active_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            active_dir: active_dir.into(),
        }
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        // User ids come from the outside; keep them to the same safe
        // alphabet as character names so they can't escape the base dir.
        let safe: String = user
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        self.base_dir.join(format!("user_{safe}"))
    }

    fn metadata_path(&self, user: &str) -> PathBuf {
        self.user_dir(user).join(METADATA_FILE)
    }

    fn save_path(&self, user: &str, name: &str) -> PathBuf {
        self.user_dir(user).join(format!("{name}.{SAVE_EXT}"))
    }

    fn active_path(&self, name: &str) -> PathBuf {
        self.active_dir.join(format!("{name}.{SAVE_EXT}"))
    }

    /// Creates the user's directory and an empty metadata file if they
    /// don't exist yet. Returns the user's directory.
    pub async fn initialize_user(
        &self,
        user: &str,
    ) -> Result<PathBuf, CharacterError> {
        let dir = self.user_dir(user);
        fs::create_dir_all(&dir).await?;

        let metadata = self.metadata_path(user);
        if fs::try_exists(&metadata).await? {
            return Ok(dir);
        }
        fs::write(&metadata, b"{}").await?;
        Ok(dir)
    }

    /// Lists the user's characters, name → metadata. A user with no
    /// directory yet simply has no characters.
    pub async fn list_characters(
        &self,
        user: &str,
    ) -> Result<BTreeMap<String, CharacterMeta>, CharacterError> {
        match fs::read(self.metadata_path(user)).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_metadata(
        &self,
        user: &str,
        metadata: &BTreeMap<String, CharacterMeta>,
    ) -> Result<(), CharacterError> {
        let data = serde_json::to_vec_pretty(metadata)?;
        fs::write(self.metadata_path(user), data).await?;
        Ok(())
    }

    /// Creates a character: writes a fresh save file and records the
    /// metadata. The stored name is the sanitized form, which is also
    /// returned.
    pub async fn create_character(
        &self,
        user: &str,
        name: &str,
        class_name: &str,
        hardcore: bool,
    ) -> Result<(String, CharacterMeta), CharacterError> {
        let safe_name =
            sanitize_name(name).ok_or(CharacterError::InvalidName)?;
        let class = CharacterClass::from_name(class_name).ok_or_else(
            || CharacterError::UnknownClass(class_name.to_string()),
        )?;

        self.initialize_user(user).await?;
        let save_path = self.save_path(user, &safe_name);
        if fs::try_exists(&save_path).await? {
            return Err(CharacterError::AlreadyExists(safe_name));
        }

        let save = savefile::encode_save(&safe_name, class, hardcore);
        fs::write(&save_path, save).await?;

        let now = now_secs();
        let meta = CharacterMeta {
            class,
            level: 1,
            hardcore,
            created: now,
            last_played: now,
            icon: class.icon().to_string(),
        };
        let mut metadata = self.list_characters(user).await?;
        metadata.insert(safe_name.clone(), meta.clone());
        self.write_metadata(user, &metadata).await?;

        tracing::info!(user, name = %safe_name, %class, "character created");
        Ok((safe_name, meta))
    }

    /// Deletes a character's save and metadata entry.
    pub async fn delete_character(
        &self,
        user: &str,
        name: &str,
    ) -> Result<(), CharacterError> {
        match fs::remove_file(self.save_path(user, name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CharacterError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let mut metadata = self.list_characters(user).await?;
        metadata.remove(name);
        self.write_metadata(user, &metadata).await?;

        tracing::info!(user, name, "character deleted");
        Ok(())
    }

    /// Copies a character's save into the active game directory and
    /// bumps its `last_played`. Returns the activated save's path.
    pub async fn activate_character(
        &self,
        user: &str,
        name: &str,
    ) -> Result<PathBuf, CharacterError> {
        fs::create_dir_all(&self.active_dir).await?;

        let source = self.save_path(user, name);
        let dest = self.active_path(name);
        match fs::copy(&source, &dest).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CharacterError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        self.touch_last_played(user, name).await?;
        tracing::info!(user, name, "character activated");
        Ok(dest)
    }

    /// Copies the active save back into the user's directory after play
    /// and bumps `last_played`.
    pub async fn sync_character_back(
        &self,
        user: &str,
        name: &str,
    ) -> Result<(), CharacterError> {
        let source = self.active_path(name);
        let dest = self.save_path(user, name);
        match fs::copy(&source, &dest).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CharacterError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        self.touch_last_played(user, name).await?;
        tracing::info!(user, name, "character synced back");
        Ok(())
    }

    /// Number of characters the user has.
    pub async fn character_count(
        &self,
        user: &str,
    ) -> Result<usize, CharacterError> {
        Ok(self.list_characters(user).await?.len())
    }

    async fn touch_last_played(
        &self,
        user: &str,
        name: &str,
    ) -> Result<(), CharacterError> {
        let mut metadata = self.list_characters(user).await?;
        if let Some(meta) = metadata.get_mut(name) {
            meta.last_played = now_secs();
            self.write_metadata(user, &metadata).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_unsafe_characters() {
        assert_eq!(
            sanitize_name("K/or..mir!"),
            Some("Kormir".to_string())
        );
        assert_eq!(
            sanitize_name("snake_case-ok"),
            Some("snake_case-ok".to_string())
        );
    }

    #[test]
    fn test_sanitize_name_truncates_to_save_limit() {
        let long = "A".repeat(40);
        assert_eq!(sanitize_name(&long).unwrap().len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_sanitize_name_rejects_empty_results() {
        assert_eq!(sanitize_name("!!!"), None);
        assert_eq!(sanitize_name(""), None);
    }
}
