//! Network key generation and rotation
//!
//! Keys are 16 characters drawn uniformly from `A-Z`, `a-z` and `0-9`.
//! Generating a key persists it but never pushes it to the radio; that only
//! happens through a regular commit.

use crate::settings::{PersistedSettings, SettingsStore};
use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rand_core::{OsRng, TryRngCore};

pub const KEY_LENGTH: usize = 16;
pub const KEY_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits into a byte; bytes at or
/// above it are rejected so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / KEY_ALPHABET.len() * KEY_ALPHABET.len()) as u8;

/// Service for network key lifecycle operations
pub struct KeyService;

impl KeyService {
    /// Generate a key from the operating system's random source
    pub fn generate() -> Result<String> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a key from the given random source
    pub fn generate_with<R: TryRngCore + ?Sized>(rng: &mut R) -> Result<String> {
        let mut key = String::with_capacity(KEY_LENGTH);
        let mut buf = [0u8; KEY_LENGTH * 2];

        while key.len() < KEY_LENGTH {
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| anyhow!("{e}"))
                .context("failed to draw random bytes")?;

            key.extend(
                buf.iter()
                    .filter(|b| **b < ACCEPT_BELOW)
                    .map(|b| char::from(KEY_ALPHABET[usize::from(*b) % KEY_ALPHABET.len()]))
                    .take(KEY_LENGTH - key.len()),
            );
        }

        Ok(key)
    }

    /// Return the persisted key, generating and persisting one on first need
    ///
    /// # Arguments
    /// * `store` - Settings store holding the key
    /// * `settings` - Last loaded settings, updated in place when a key is generated
    pub fn ensure_key<S: SettingsStore + ?Sized>(
        store: &S,
        settings: &mut PersistedSettings,
    ) -> Result<String> {
        if let Some(key) = settings.encryption_key.as_ref().filter(|k| !k.is_empty()) {
            debug!("using persisted network key");
            return Ok(key.clone());
        }

        info!("no network key persisted, generating one");
        Self::rotate(store, settings)
    }

    /// Generate a fresh key, overwriting the persisted one
    ///
    /// # Arguments
    /// * `store` - Settings store holding the key
    /// * `settings` - Last loaded settings, updated in place on success
    pub fn rotate<S: SettingsStore + ?Sized>(
        store: &S,
        settings: &mut PersistedSettings,
    ) -> Result<String> {
        let key = Self::generate()?;

        let mut updated = settings.clone();
        updated.encryption_key = Some(key.clone());
        store.save(&updated).context("failed to persist network key")?;

        *settings = updated;
        Ok(key)
    }
}
