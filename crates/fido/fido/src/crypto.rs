//! AES-128 primitives for protecting card exchanges
//!
//! This module provides AES-128 in CBC mode without padding, AES-CMAC as
//! defined in NIST SP 800-38B / RFC 4493, and the 8-byte CMAC derivation that
//! keeps the odd-indexed bytes of the full tag.
//!
//! Keys and IVs are borrowed for the duration of a call and never retained.

use aes::Aes128;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, generic_array::GenericArray};
use cmac::{Cmac, Mac};
use zeroize::Zeroizing;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const KEY_SIZE: usize = 16;

/// All-zero IV substituted when none is supplied
pub const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Full AES-CMAC tag
pub type Cmac128 = [u8; 16];

/// Derived 8-byte CMAC tag
pub type Cmac64 = [u8; 8];

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Errors from the cipher primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// The key or IV could not be set up
    #[error("Cipher setup failed: {0}")]
    KeySetup(&'static str),

    /// The block operation could not be performed
    #[error("Cipher operation failed: {0}")]
    Operation(&'static str),
}

fn check_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() == KEY_SIZE {
        Ok(())
    } else {
        Err(CryptoError::KeySetup("AES-128 key must be 16 bytes"))
    }
}

fn check_input(input: &[u8]) -> Result<(), CryptoError> {
    if input.is_empty() || input.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Operation(
            "input length must be a positive multiple of 16 bytes",
        ));
    }
    Ok(())
}

fn setup_cbc<C: KeyIvInit>(key: &[u8], iv: Option<&[u8]>) -> Result<C, CryptoError> {
    check_key(key)?;
    let iv = iv.unwrap_or(&ZERO_IV);
    C::new_from_slices(key, iv).map_err(|_| CryptoError::KeySetup("IV must be 16 bytes"))
}

/// Encrypt with AES-128-CBC
///
/// `iv` defaults to all zeros. The input is not padded and must be a positive
/// multiple of 16 bytes; the output has the same length.
pub fn aes_encrypt(key: &[u8], iv: Option<&[u8]>, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher: Aes128CbcEnc = setup_cbc(key, iv)?;
    check_input(input)?;

    let mut output = input.to_vec();
    for block in output.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    Ok(output)
}

/// Decrypt with AES-128-CBC
///
/// `iv` defaults to all zeros. The input must be a positive multiple of 16
/// bytes; no padding is removed.
pub fn aes_decrypt(key: &[u8], iv: Option<&[u8]>, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher: Aes128CbcDec = setup_cbc(key, iv)?;
    check_input(input)?;

    let mut output = input.to_vec();
    for block in output.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    Ok(output)
}

/// Compute AES-CMAC into `mac`
///
/// `mac` is zeroed before anything else, so it never holds a stale tag when
/// this returns an error.
pub fn aes_cmac_into(key: &[u8], input: &[u8], mac: &mut Cmac128) -> Result<(), CryptoError> {
    mac.fill(0);
    check_key(key)?;

    let mut state = <Cmac<Aes128> as Mac>::new_from_slice(key)
        .map_err(|_| CryptoError::KeySetup("AES-128 key must be 16 bytes"))?;
    state.update(input);
    mac.copy_from_slice(&state.finalize().into_bytes());
    Ok(())
}

/// Compute the 16-byte AES-CMAC of `input`
pub fn aes_cmac(key: &[u8], input: &[u8]) -> Result<Cmac128, CryptoError> {
    let mut mac = [0u8; 16];
    aes_cmac_into(key, input, &mut mac)?;
    Ok(mac)
}

/// Derive the 8-byte tag from a full CMAC
///
/// Byte `i` of the result is byte `2i + 1` of `mac`.
pub fn truncate_cmac(mac: &Cmac128) -> Cmac64 {
    let mut short = [0u8; 8];
    for (out, pair) in short.iter_mut().zip(mac.chunks_exact(2)) {
        *out = pair[1];
    }
    short
}

/// Compute the 8-byte AES-CMAC of `input`
pub fn aes_cmac8(key: &[u8], input: &[u8]) -> Result<Cmac64, CryptoError> {
    let full = Zeroizing::new(aes_cmac(key, input)?);
    Ok(truncate_cmac(&full))
}
