//! Staged binary promotion
//!
//! A download only ever lands in the staging directory. It is made
//! executable there and then renamed into `bin/`, so the final path never
//! points at a partial or non-executable file.

use std::fs;
use std::path::Path;

use crate::error::{CreateError, Result};

/// Set executable permissions (755) on the staged binary
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path)
            .map_err(|e| CreateError::fs("read metadata of", path, e))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
            .map_err(|e| CreateError::fs("set permissions on", path, e))?;
    }

    #[cfg(not(unix))]
    {
        // Executability follows the .exe extension on Windows
        fs::metadata(path).map_err(|e| CreateError::fs("read metadata of", path, e))?;
    }

    Ok(())
}

/// Move the staged binary to its final location with a same-volume rename
pub fn promote(staged: &Path, installed: &Path) -> Result<()> {
    fs::rename(staged, installed).map_err(|e| CreateError::fs("move binary into", installed, e))
}

/// Whether `path` exists and carries an execute bit
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        metadata.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_is_executable_after_promotion() {
        let tmp = tempfile::tempdir().unwrap();
        let staged = tmp.path().join("download").join("boilerplate");
        let installed = tmp.path().join("bin").join("boilerplate");
        fs::create_dir_all(staged.parent().unwrap()).unwrap();
        fs::create_dir_all(installed.parent().unwrap()).unwrap();
        fs::write(&staged, b"#!/bin/sh\n").unwrap();

        make_executable(&staged).unwrap();
        promote(&staged, &installed).unwrap();

        assert!(!staged.exists());
        assert!(is_executable(&installed));
    }

    #[test]
    fn promote_replaces_an_older_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let staged = tmp.path().join("new");
        let installed = tmp.path().join("boilerplate");
        fs::write(&installed, b"old").unwrap();
        fs::write(&staged, b"new").unwrap();

        promote(&staged, &installed).unwrap();
        assert_eq!(fs::read(&installed).unwrap(), b"new");
    }

    #[test]
    fn missing_staged_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let err = make_executable(&tmp.path().join("absent")).unwrap_err();
        assert!(err.to_string().contains("absent"));
        assert!(!is_executable(&tmp.path().join("absent")));
    }
}
