//! Encrypted persistence of administration tool settings
//!
//! The `CredentialVault` writes an `AdminToolSettings` bundle as property
//! text encrypted under a caller-supplied passphrase, and reads it back.
//! It is independent of any live directory connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use realmadmin_core::vault::CredentialVault;
//!
//! let vault = CredentialVault::new()?;
//! vault.store(&settings, None)?;
//! let restored = vault.load(&passphrase, None)?;
//! ```

mod cipher;
mod codec;
mod properties;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use secrecy::SecretString;
use tempfile::NamedTempFile;

use crate::error::{VaultError, VaultResult};
use crate::models::AdminToolSettings;
use crate::tracing::span_names;

pub use cipher::{EncryptionStrength, VAULT_MAGIC};
pub use codec::{keys, parse_bool};
pub use properties::{PropertiesError, parse_properties, write_properties};

/// File name of the settings file in the user's home directory
pub const DEFAULT_SETTINGS_FILE: &str = ".realmadmin-settings";

/// Header comment written above the property entries
const HEADER_COMMENT: &str = "realmadmin administration tool settings";

/// Returns `$HOME/.realmadmin-settings`
///
/// # Errors
///
/// Returns `VaultError::NoHomeDirectory` if the home directory is unknown
pub fn default_settings_path() -> VaultResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_SETTINGS_FILE))
        .ok_or(VaultError::NoHomeDirectory)
}

/// Stores and loads encrypted settings bundles
#[derive(Debug, Clone)]
pub struct CredentialVault {
    default_path: PathBuf,
    strength: EncryptionStrength,
}

impl CredentialVault {
    /// Creates a vault rooted at the default settings location
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NoHomeDirectory` if the home directory is unknown
    pub fn new() -> VaultResult<Self> {
        Ok(Self::with_path(default_settings_path()?))
    }

    /// Creates a vault whose default location is `path`
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: path.into(),
            strength: EncryptionStrength::default(),
        }
    }

    /// Sets the key-derivation cost used for new files
    #[must_use]
    pub const fn with_strength(mut self, strength: EncryptionStrength) -> Self {
        self.strength = strength;
        self
    }

    /// Location used when no explicit path is given
    #[must_use]
    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    fn resolve<'a>(&'a self, path: Option<&'a Path>) -> &'a Path {
        path.unwrap_or(&self.default_path)
    }

    /// Encrypts and writes `settings` to `target` (or the default path)
    ///
    /// The payload is written to a sibling temporary file and renamed over
    /// the target, so an interrupted write leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// - `VaultError::PassphraseRequired` if the bundle has no passphrase
    /// - `VaultError::Encryption` if encryption fails
    /// - `VaultError::Io` if the file cannot be written
    pub fn store(&self, settings: &AdminToolSettings, target: Option<&Path>) -> VaultResult<()> {
        let path = self.resolve(target);
        let _span = crate::trace_operation!(span_names::VAULT_STORE, path = %path.display())
            .entered();

        let passphrase = settings
            .settings_passphrase()
            .ok_or(VaultError::PassphraseRequired)?;

        let entries = codec::to_entries(settings);
        let timestamp = Utc::now().format("%a %b %d %H:%M:%S UTC %Y").to_string();
        let text = zeroize::Zeroizing::new(write_properties(
            &[HEADER_COMMENT, &timestamp],
            entries.iter().map(|(k, v)| (*k, v.as_str())),
        ));
        // Wipes the plaintext values
        drop(entries);

        let payload = cipher::encrypt(text.as_bytes(), passphrase, self.strength)?;
        write_atomic(path, &payload)?;

        tracing::info!(bytes = payload.len(), "Settings stored");
        Ok(())
    }

    /// Reads and decrypts settings from `source` (or the default path)
    ///
    /// Returns `Ok(None)` when the file does not exist. The returned bundle
    /// carries `passphrase` in memory so it can be stored again.
    ///
    /// # Errors
    ///
    /// - `VaultError::CorruptOrWrongPassphrase` if decryption or parsing fails
    /// - `VaultError::Io` if the file exists but cannot be read
    pub fn load(
        &self,
        passphrase: &SecretString,
        source: Option<&Path>,
    ) -> VaultResult<Option<AdminToolSettings>> {
        let path = self.resolve(source);
        let _span = crate::trace_operation!(span_names::VAULT_LOAD, path = %path.display())
            .entered();

        if !path.exists() {
            tracing::debug!("No settings file present");
            return Ok(None);
        }

        let data = fs::read(path).map_err(|e| VaultError::Io(e.to_string()))?;
        let plaintext = cipher::decrypt(&data, passphrase)?;

        let text = std::str::from_utf8(&plaintext).map_err(|e| {
            tracing::debug!(error = %e, "Decrypted payload is not UTF-8");
            VaultError::CorruptOrWrongPassphrase
        })?;
        let map = parse_properties(text).map_err(|e| {
            tracing::debug!(error = %e, "Decrypted payload is not property text");
            VaultError::CorruptOrWrongPassphrase
        })?;
        let settings = codec::from_entries(&map, passphrase.clone()).map_err(|e| {
            tracing::debug!(error = %e, "Decrypted payload is not a settings file");
            VaultError::CorruptOrWrongPassphrase
        })?;

        tracing::info!("Settings loaded");
        Ok(Some(settings))
    }

    /// Re-encrypts the settings file under a new passphrase
    ///
    /// Returns `Ok(false)` if there is no file to re-encrypt.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::load`] and [`Self::store`]
    pub fn change_passphrase(
        &self,
        old: &SecretString,
        new: SecretString,
        path: Option<&Path>,
    ) -> VaultResult<bool> {
        let Some(mut settings) = self.load(old, path)? else {
            return Ok(false);
        };
        settings.set_settings_passphrase(new);
        self.store(&settings, path)?;
        Ok(true)
    }
}

/// Writes `data` to a temporary sibling and renames it over `path`
fn write_atomic(path: &Path, data: &[u8]) -> VaultResult<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| {
                VaultError::Io(format!(
                    "Failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
            parent
        }
        None => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| VaultError::Io(format!("'{}' is not a file path", path.display())))?;

    replace_with_temp(parent, file_name, path, data)
        .map_err(|e| VaultError::Io(format!("Failed to write '{}': {e}", path.display())))
}

/// Writes `data` to a temp file in `dir` and persists it over `path`
///
/// The temp file is removed on drop unless persisted.
fn replace_with_temp(
    dir: &Path,
    file_name: &std::ffi::OsStr,
    path: &Path,
    data: &[u8],
) -> std::io::Result<()> {
    let mut temp = create_temp(dir, file_name)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Owner-only temp file next to the destination
fn create_temp(dir: &Path, file_name: &std::ffi::OsStr) -> std::io::Result<NamedTempFile> {
    let mut prefix = file_name.to_os_string();
    prefix.push(".");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o600));
    }
    builder.tempfile_in(dir)
}
