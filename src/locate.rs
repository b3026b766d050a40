//! Search-path lookup for the probe binary
//!
//! Walks `$PATH` in order and returns the first entry that is an executable
//! regular file, the way a shell would resolve the command.

use std::env;
use std::path::{Path, PathBuf};

/// Find `name` on `$PATH`
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    find_in(env::split_paths(&path_var), name)
}

/// Find `name` in an explicit list of directories, first match wins
pub fn find_in<I>(dirs: I, name: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
