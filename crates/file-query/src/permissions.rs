//! Write-permission checks for the current process.

use std::path::Path;

/// Returns true if the current process may open `path` for writing.
///
/// Any failure (missing file, bad path, permission error) counts as not
/// writable.
#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn fresh_file_is_writable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fresh.txt");
        fs::write(&path, b"data").unwrap();
        assert!(is_writable(&path));
    }

    #[test]
    fn missing_file_is_not_writable() {
        let temp = TempDir::new().unwrap();
        assert!(!is_writable(&temp.path().join("missing.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn interior_nul_is_not_writable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\0name"));
        assert!(!is_writable(path));
    }

    #[test]
    fn read_only_file_is_not_writable_for_unprivileged_users() {
        if running_as_root() {
            // root bypasses permission bits
            return;
        }
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("locked.txt");
        fs::write(&path, b"data").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        assert!(!is_writable(&path));
    }

    #[cfg(unix)]
    fn running_as_root() -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    fn running_as_root() -> bool {
        false
    }
}
