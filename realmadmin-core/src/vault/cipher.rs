//! Passphrase-based payload encryption
//!
//! Uses AES-256-GCM with Argon2id key derivation. Output layout:
//! magic (8) + strength (1) + salt (32) + nonce (12) + ciphertext + tag (16).

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// Magic bytes identifying an encrypted settings file
pub const VAULT_MAGIC: &[u8] = b"RADMVLT1";

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = VAULT_MAGIC.len() + 1 + SALT_LEN + NONCE_LEN;

/// Key-derivation cost profile
///
/// Recorded in the file header so a file always opens with the profile it
/// was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionStrength {
    /// Minimal cost (m=4096 KiB, t=2, p=1); for tests and constrained hosts
    Fast,
    /// Default cost (m=65536 KiB, t=3, p=4)
    #[default]
    Standard,
    /// Raised cost (m=262144 KiB, t=4, p=4)
    High,
}

impl EncryptionStrength {
    const fn tag(self) -> u8 {
        match self {
            Self::Fast => 0,
            Self::Standard => 1,
            Self::High => 2,
        }
    }

    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Fast),
            1 => Some(Self::Standard),
            2 => Some(Self::High),
            _ => None,
        }
    }

    const fn argon2_costs(self) -> (u32, u32, u32) {
        match self {
            Self::Fast => (4096, 2, 1),
            Self::Standard => (65536, 3, 4),
            Self::High => (262_144, 4, 4),
        }
    }
}

/// Encrypts `plaintext` under `passphrase`
///
/// # Errors
///
/// Returns `VaultError::Encryption` if randomness, key derivation or sealing fails
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &SecretString,
    strength: EncryptionStrength,
) -> VaultResult<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut salt)
        .map_err(|_| VaultError::Encryption("Failed to generate salt".to_string()))?;
    rng.fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Encryption("Failed to generate nonce".to_string()))?;

    let key = derive_key(passphrase, &salt, strength)?;
    let unbound_key = UnboundKey::new(&AES_256_GCM, &key[..])
        .map_err(|_| VaultError::Encryption("Failed to create key".to_string()))?;
    let sealing_key = LessSafeKey::new(unbound_key);

    let mut ciphertext = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(VAULT_MAGIC),
            &mut ciphertext,
        )
        .map_err(|_| VaultError::Encryption("Encryption failed".to_string()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    output.extend_from_slice(VAULT_MAGIC);
    output.push(strength.tag());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypts data produced by [`encrypt`]
///
/// A wrong passphrase and a damaged file are indistinguishable here; both
/// yield `CorruptOrWrongPassphrase`.
///
/// # Errors
///
/// Returns `VaultError::CorruptOrWrongPassphrase` if the header is malformed
/// or authentication fails, and `VaultError::Encryption` if key derivation
/// itself cannot run
pub fn decrypt(data: &[u8], passphrase: &SecretString) -> VaultResult<Zeroizing<Vec<u8>>> {
    if data.len() < HEADER_LEN + TAG_LEN || !data.starts_with(VAULT_MAGIC) {
        return Err(VaultError::CorruptOrWrongPassphrase);
    }

    let strength = EncryptionStrength::from_tag(data[VAULT_MAGIC.len()])
        .ok_or(VaultError::CorruptOrWrongPassphrase)?;
    let salt_start = VAULT_MAGIC.len() + 1;
    let salt = &data[salt_start..salt_start + SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&data[salt_start + SALT_LEN..HEADER_LEN]);

    let key = derive_key(passphrase, salt, strength)?;
    let unbound_key = UnboundKey::new(&AES_256_GCM, &key[..])
        .map_err(|_| VaultError::Encryption("Failed to create key".to_string()))?;
    let opening_key = LessSafeKey::new(unbound_key);

    let mut buffer = Zeroizing::new(data[HEADER_LEN..].to_vec());
    let plaintext_len = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(VAULT_MAGIC),
            buffer.as_mut_slice(),
        )
        .map_err(|_| VaultError::CorruptOrWrongPassphrase)?
        .len();
    buffer.truncate(plaintext_len);
    Ok(buffer)
}

/// Derives a 256-bit key from a passphrase using Argon2id
fn derive_key(
    passphrase: &SecretString,
    salt: &[u8],
    strength: EncryptionStrength,
) -> VaultResult<Zeroizing<[u8; 32]>> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let (m_cost, t_cost, p_cost) = strength.argon2_costs();
    let params = Params::new(m_cost, t_cost, p_cost, Some(32))
        .map_err(|e| VaultError::Encryption(format!("Invalid Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase.expose_secret().as_bytes(), salt, &mut key[..])
        .map_err(|e| VaultError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(key)
}
