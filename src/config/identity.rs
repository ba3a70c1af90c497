//! Client certificate resolution
//!
//! A client identity is a certificate plus private key, both PEM. When none is
//! configured explicitly, the conventional X509 environment variables are
//! consulted in this order:
//!
//! 1. `X509_USER_PROXY` - a proxy file holding both certificate and key
//! 2. `X509_USER_CERT` and `X509_USER_KEY` - used only when both are set

use crate::ConfigError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const ENV_USER_PROXY: &str = "X509_USER_PROXY";
pub const ENV_USER_CERT: &str = "X509_USER_CERT";
pub const ENV_USER_KEY: &str = "X509_USER_KEY";

/// Paths of a client certificate and its private key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Resolves the default identity from the process environment
pub fn identity_from_env() -> Option<IdentityPaths> {
    resolve_identity(|name| std::env::var_os(name))
}

/// Resolves the default identity through an arbitrary variable lookup
pub fn resolve_identity<F>(lookup: F) -> Option<IdentityPaths>
where
    F: Fn(&str) -> Option<OsString>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(proxy) = non_empty(ENV_USER_PROXY) {
        let path = PathBuf::from(proxy);
        return Some(IdentityPaths {
            cert: path.clone(),
            key: path,
        });
    }

    match (non_empty(ENV_USER_CERT), non_empty(ENV_USER_KEY)) {
        (Some(cert), Some(key)) => Some(IdentityPaths {
            cert: PathBuf::from(cert),
            key: PathBuf::from(key),
        }),
        _ => None,
    }
}

/// Reads the certificate and key into a single PEM buffer
///
/// When both paths point to the same file (a proxy), it is read only once.
pub fn load_identity_pem(paths: &IdentityPaths) -> Result<Vec<u8>, ConfigError> {
    let mut pem = read_pem(&paths.cert)?;

    if paths.key != paths.cert {
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend_from_slice(&read_pem(&paths.key)?);
    }

    Ok(pem)
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::IdentityFile {
        path: path.to_path_buf(),
        source,
    })
}
