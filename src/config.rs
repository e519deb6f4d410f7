//! Settings management for commitit.
//!
//! Settings are a flat string table stored in TOML format at
//! `~/.config/commitit/config.toml`. This module provides:
//!
//! - [`SettingsBackend`]: the key/value storage seam
//! - [`FileBackend`]: the on-disk backend used by the binary
//! - [`Settings`]: typed access to the API key, model and prompt, with
//!   built-in defaults for model and prompt
//!
//! # Example
//!
//! ```ignore
//! let settings = Settings::new(FileBackend::new(config_path()));
//! settings.set_model("gpt-4o-mini")?;
//! assert_eq!(settings.model()?, "gpt-4o-mini");
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tracing::debug;

use crate::error::ConfigError;

/// Default LLM model used for commit message generation.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default system prompt sent ahead of the diff.
pub const DEFAULT_PROMPT: &str = r#"You are a senior developer who writes concise, clear commit messages that precisely capture changes in a single line.

When given a git diff, you generate a commit message that:
1. Follows conventional commit format: type(scope): concise message
2. Never exceeds one line
3. Captures key technical detail in minimal words
4. Uses present tense, imperative mood

Your style matches these examples:
- "fix(auth): Add rate limiting to login endpoint"
- "refactor(css): Consolidate button styles into theme"
- "feat(api): Implement user preference caching"
- "perf(db): Add index for frequently filtered columns"
- "chore(deps): Update React to v18.2.0"

You are:
- Extremely concise
- Technically precise
- Focused on key changes
- Limited to one line

Generate a single commit message without any explanation or additional commentary."#;

const KEY_API_KEY: &str = "api_key";
const KEY_MODEL: &str = "model";
const KEY_PROMPT: &str = "prompt";

/// Returns the path to the settings file.
///
/// Typically `~/.config/commitit/config.toml` on Linux.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("commitit")
        .join("config.toml")
}

/// Picks the stored override if present and non-empty, otherwise the
/// built-in value.
pub fn resolve(stored: Option<String>, builtin: &str) -> String {
    non_empty(stored).unwrap_or_else(|| builtin.to_string())
}

/// An empty stored value counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Flat key/value storage behind [`Settings`].
pub trait SettingsBackend {
    /// Returns `Ok(None)` when the key has never been set or was deleted.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Overwrites any existing value for the key.
    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Removes the key. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), ConfigError>;
}

/// TOML file backend.
///
/// The file is created on first write. Every write replaces the whole file
/// atomically (temp file, then rename) and, on Unix, is readable only by the
/// owner since it holds the API key.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(table).map_err(ConfigError::Serialize)?;
        let temp_path = self.path.with_extension("tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(write_err)?;

            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;

            file.write_all(contents.as_bytes()).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }

        fs::rename(&temp_path, &self.path).map_err(write_err)?;
        debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

impl SettingsBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.read_table()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table)
    }

    fn delete(&self, key: &str) -> Result<(), ConfigError> {
        let mut table = self.read_table()?;
        if table.remove(key).is_none() {
            return Ok(());
        }
        self.write_table(&table)
    }
}

/// In-memory backend for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    table: std::cell::RefCell<BTreeMap<String, String>>,
}

#[cfg(test)]
impl SettingsBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.table.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.table
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), ConfigError> {
        self.table.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed settings over a [`SettingsBackend`].
///
/// Constructed once per process and passed to whatever needs it.
#[derive(Debug)]
pub struct Settings<B> {
    backend: B,
}

impl<B: SettingsBackend> Settings<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the stored API key or [`ConfigError::MissingApiKey`].
    pub fn api_key(&self) -> Result<String, ConfigError> {
        non_empty(self.backend.get(KEY_API_KEY)?).ok_or(ConfigError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> Result<bool, ConfigError> {
        Ok(non_empty(self.backend.get(KEY_API_KEY)?).is_some())
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), ConfigError> {
        debug!("storing API key");
        self.backend.set(KEY_API_KEY, key)
    }

    pub fn unset_api_key(&self) -> Result<(), ConfigError> {
        debug!("removing API key");
        self.backend.delete(KEY_API_KEY)
    }

    pub fn model(&self) -> Result<String, ConfigError> {
        Ok(resolve(self.backend.get(KEY_MODEL)?, DEFAULT_MODEL))
    }

    pub fn set_model(&self, model: &str) -> Result<(), ConfigError> {
        debug!(model, "storing model");
        self.backend.set(KEY_MODEL, model)
    }

    pub fn prompt(&self) -> Result<String, ConfigError> {
        Ok(resolve(self.backend.get(KEY_PROMPT)?, DEFAULT_PROMPT))
    }

    pub fn has_prompt_override(&self) -> Result<bool, ConfigError> {
        Ok(non_empty(self.backend.get(KEY_PROMPT)?).is_some())
    }

    pub fn set_prompt(&self, text: &str) -> Result<(), ConfigError> {
        debug!(len = text.len(), "storing prompt override");
        self.backend.set(KEY_PROMPT, text)
    }

    /// Drops the prompt override and returns the built-in prompt for display.
    pub fn reset_prompt(&self) -> Result<String, ConfigError> {
        self.backend.delete(KEY_PROMPT)?;
        Ok(DEFAULT_PROMPT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_settings() -> Settings<MemoryBackend> {
        Settings::new(MemoryBackend::default())
    }

    #[test]
    fn resolve_prefers_stored_value() {
        assert_eq!(resolve(Some("x".into()), "y"), "x");
        assert_eq!(resolve(None, "y"), "y");
        assert_eq!(resolve(Some(String::new()), "y"), "y");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let settings = memory_settings();
        settings.set_api_key("").unwrap();
        settings.set_model("").unwrap();
        settings.set_prompt("").unwrap();

        assert!(matches!(
            settings.api_key(),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(!settings.has_api_key().unwrap());
        assert_eq!(settings.model().unwrap(), DEFAULT_MODEL);
        assert_eq!(settings.prompt().unwrap(), DEFAULT_PROMPT);
        assert!(!settings.has_prompt_override().unwrap());
    }

    #[test]
    fn model_defaults_until_set_then_last_write_wins() {
        let settings = memory_settings();
        assert_eq!(settings.model().unwrap(), DEFAULT_MODEL);

        settings.set_model("gpt-4o-mini").unwrap();
        settings.set_model("o3-mini").unwrap();
        assert_eq!(settings.model().unwrap(), "o3-mini");
    }

    #[test]
    fn prompt_defaults_until_set() {
        let settings = memory_settings();
        assert_eq!(settings.prompt().unwrap(), DEFAULT_PROMPT);
        assert!(!settings.has_prompt_override().unwrap());

        settings.set_prompt("Write haiku commits.").unwrap();
        assert_eq!(settings.prompt().unwrap(), "Write haiku commits.");
        assert!(settings.has_prompt_override().unwrap());
    }

    #[test]
    fn reset_prompt_is_idempotent() {
        let settings = memory_settings();
        settings.set_prompt("custom").unwrap();

        assert_eq!(settings.reset_prompt().unwrap(), DEFAULT_PROMPT);
        assert_eq!(settings.prompt().unwrap(), DEFAULT_PROMPT);

        assert_eq!(settings.reset_prompt().unwrap(), DEFAULT_PROMPT);
        assert_eq!(settings.prompt().unwrap(), DEFAULT_PROMPT);
    }

    #[test]
    fn unset_absent_key_is_noop_and_lookup_fails() {
        let settings = memory_settings();
        settings.unset_api_key().unwrap();
        assert!(matches!(
            settings.api_key(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn api_key_round_trips_and_unsets() {
        let settings = memory_settings();
        settings.set_api_key("sk-test").unwrap();
        assert_eq!(settings.api_key().unwrap(), "sk-test");
        assert!(settings.has_api_key().unwrap());

        settings.unset_api_key().unwrap();
        assert!(!settings.has_api_key().unwrap());
    }

    #[test]
    fn file_backend_creates_file_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings::new(FileBackend::new(path.clone()));

        assert_eq!(settings.model().unwrap(), DEFAULT_MODEL);
        assert!(!path.exists());

        settings.set_model("gpt-4o-mini").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let first = Settings::new(FileBackend::new(path.clone()));
        first.set_api_key("sk-persisted").unwrap();
        first.set_prompt("line one\nline two").unwrap();

        let second = Settings::new(FileBackend::new(path));
        assert_eq!(second.api_key().unwrap(), "sk-persisted");
        assert_eq!(second.prompt().unwrap(), "line one\nline two");
        assert_eq!(second.model().unwrap(), DEFAULT_MODEL);
    }

    #[test]
    fn file_backend_deletes_single_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let settings = Settings::new(FileBackend::new(path.clone()));

        settings.set_api_key("sk-a").unwrap();
        settings.set_model("m").unwrap();
        settings.unset_api_key().unwrap();
        settings.unset_api_key().unwrap();

        assert!(!settings.has_api_key().unwrap());
        assert_eq!(settings.model().unwrap(), "m");
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_backend_restricts_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        FileBackend::new(path.clone()).set("api_key", "sk").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn file_backend_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let settings = Settings::new(FileBackend::new(path));
        assert!(matches!(settings.model(), Err(ConfigError::Parse { .. })));
    }
}
