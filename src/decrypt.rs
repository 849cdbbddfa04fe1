use tracing::debug;

use crate::error::{CasaError, Result};

/// Compound File Binary header shared by legacy `.xls` files and encrypted
/// OOXML containers.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];
/// Stream holding the key material of an encrypted OOXML package.
const ENCRYPTION_INFO_STREAM: &str = "EncryptionInfo";

/// Decrypt a password-protected workbook into plaintext spreadsheet bytes.
///
/// Every failure here is a `Decryption` error and happens before any table
/// parsing is attempted.
pub fn decrypt_workbook(encrypted: &[u8], password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(CasaError::Decryption("a password is required".to_string()));
    }
    if encrypted.starts_with(&ZIP_MAGIC) {
        return Err(CasaError::Decryption(
            "file is not password protected".to_string(),
        ));
    }
    if !encrypted.starts_with(&OLE_MAGIC) {
        return Err(CasaError::Decryption(
            "not a recognized encrypted spreadsheet".to_string(),
        ));
    }

    if !has_encryption_info(encrypted) {
        return Err(CasaError::Decryption(
            "legacy .xls encryption is not supported; save the statement as .xlsx".to_string(),
        ));
    }

    let plain = office_crypto::decrypt_from_bytes(encrypted.to_vec(), password)
        .map_err(|e| CasaError::Decryption(e.to_string()))?;

    // A wrong key still "decrypts" to noise; only a real container passes.
    if !looks_like_workbook(&plain) {
        return Err(CasaError::Decryption("wrong password".to_string()));
    }
    debug!(bytes = plain.len(), "workbook decrypted");
    Ok(plain)
}

fn looks_like_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&OLE_MAGIC)
}

/// Compound-file directory names are UTF-16LE. A container without an
/// `EncryptionInfo` entry is a BIFF `.xls` workbook, not an OOXML package.
fn has_encryption_info(container: &[u8]) -> bool {
    let name: Vec<u8> = ENCRYPTION_INFO_STREAM
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    container.windows(name.len()).any(|w| w == name.as_slice())
}
