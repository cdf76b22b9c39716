//! On-disk key persistence.
//!
//! The key file is a tiny two-part format: a human-readable first line
//! (`account:<address>` or `evm:<address>`) for eyeballing and backup
//! tooling, followed by the raw secret bytes. The file is created with
//! owner-only permissions (`0600`); an existing file with looser
//! permissions is rejected rather than silently tightened, so a permission
//! mistake made outside this crate is never hidden.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use xpay_core::network::NetworkFamily;

use crate::error::WalletError;

const ACCOUNT_PREFIX: &str = "account:";
const EVM_PREFIX: &str = "evm:";

/// Writes `secret` to `path`, tagged with `family` and `address`, creating
/// the file with owner-only permissions.
///
/// # Errors
///
/// Returns [`WalletError::Storage`] if the file cannot be created or
/// written.
pub fn write_key_file(path: &Path, family: NetworkFamily, address: &str, secret: &[u8]) -> Result<(), WalletError> {
    let prefix = match family {
        NetworkFamily::Account => ACCOUNT_PREFIX,
        NetworkFamily::Evm => EVM_PREFIX,
    };
    let mut file = open_owner_only(path).map_err(|e| WalletError::Storage(e.to_string()))?;
    writeln!(file, "{prefix}{address}").map_err(|e| WalletError::Storage(e.to_string()))?;
    file.write_all(secret).map_err(|e| WalletError::Storage(e.to_string()))?;
    Ok(())
}

/// Reads a key file previously written by [`write_key_file`], returning the
/// network family it was tagged with and the raw secret bytes.
///
/// # Errors
///
/// Returns [`WalletError::Storage`] if the file is missing, has group/world
/// permissions, or is malformed.
pub fn read_key_file(path: &Path) -> Result<(NetworkFamily, Vec<u8>), WalletError> {
    check_owner_only_perms(path)?;
    let contents = fs::read(path).map_err(|e| WalletError::Storage(e.to_string()))?;
    let newline_at = contents
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| WalletError::Storage("key file missing header line".to_owned()))?;
    let header = std::str::from_utf8(&contents[..newline_at])
        .map_err(|e| WalletError::Storage(e.to_string()))?;
    let family = if header.starts_with(ACCOUNT_PREFIX) {
        NetworkFamily::Account
    } else if header.starts_with(EVM_PREFIX) {
        NetworkFamily::Evm
    } else {
        return Err(WalletError::Storage(format!("unrecognized key file header: {header:?}")));
    };
    let secret = contents[newline_at + 1..].to_vec();
    Ok((family, secret))
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt as _;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[cfg(unix)]
fn check_owner_only_perms(path: &Path) -> Result<(), WalletError> {
    use std::os::unix::fs::PermissionsExt as _;

    let metadata = fs::metadata(path).map_err(|e| WalletError::Storage(e.to_string()))?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o600 {
        return Err(WalletError::Storage(format!(
            "refusing to read key file with permissions {mode:o}, expected 600"
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_owner_only_perms(_path: &Path) -> Result<(), WalletError> {
    Ok(())
}
