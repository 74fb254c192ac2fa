//! Binary lookup on `PATH`.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::InvocationError;

/// Resolve `binary` against the process `PATH`.
///
/// A value with more than one path component (`./buildah`,
/// `/usr/bin/buildah`) must name an existing file. A bare name is searched
/// for in each `PATH` entry.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, InvocationError> {
    resolve_binary_in(binary, env::var_os("PATH").as_deref())
}

/// Resolve `binary` against an explicit `PATH`-style search list.
pub fn resolve_binary_in(
    binary: &str,
    search_path: Option<&OsStr>,
) -> Result<PathBuf, InvocationError> {
    let binary = binary.trim();
    if binary.is_empty() {
        return Err(InvocationError::binary_not_found(binary));
    }

    let expanded = shellexpand::tilde(binary).into_owned();
    let candidate = Path::new(&expanded);
    if candidate.components().count() > 1 {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(InvocationError::binary_not_found(binary))
        };
    }

    search_path
        .into_iter()
        .flat_map(env::split_paths)
        .map(|dir| dir.join(binary))
        .find(|path| is_executable(path))
        .ok_or_else(|| InvocationError::binary_not_found(binary))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
