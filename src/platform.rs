//! Host platform capabilities: runtime identification and permission bits.
//!
//! The provider consumes these through the [`Platform`] trait so tests can
//! exercise the POSIX and non-POSIX paths deterministically on any host.

use std::path::Path;

use tracing::debug;

use crate::error::UpdateError;

/// Platform capability injected into the update provider.
pub trait Platform: Send + Sync {
    /// Stable OS+architecture tag selecting which build output the packager
    /// produces.
    fn runtime_identifier(&self) -> String;

    /// Whether the host supports POSIX permission bits.
    fn is_posix(&self) -> bool;

    /// Add execute permission for owner, group, and other, leaving every
    /// other mode bit untouched.
    fn make_executable(&self, path: &Path) -> Result<(), UpdateError>;
}

/// The real host.
#[derive(Debug, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn runtime_identifier(&self) -> String {
        runtime_identifier_for(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn is_posix(&self) -> bool {
        cfg!(unix)
    }

    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> Result<(), UpdateError> {
        use std::os::unix::fs::PermissionsExt;

        let permission_error = |e: std::io::Error| UpdateError::Permission {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut perms = std::fs::metadata(path)
            .map_err(permission_error)?
            .permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms).map_err(permission_error)
    }

    #[cfg(not(unix))]
    fn make_executable(&self, _path: &Path) -> Result<(), UpdateError> {
        Ok(())
    }
}

/// Map `std::env::consts` values to the packager's platform tags.
pub fn runtime_identifier_for(os: &str, arch: &str) -> String {
    match (os, arch) {
        ("linux", "x86_64") => "linux-x64".to_string(),
        ("linux", "aarch64") => "linux-arm64".to_string(),
        ("macos", "x86_64") => "osx-x64".to_string(),
        ("macos", "aarch64") => "osx-arm64".to_string(),
        ("windows", "x86_64") => "win-x64".to_string(),
        ("windows", "aarch64") => "win-arm64".to_string(),
        (os, arch) => format!("{os}-{arch}"),
    }
}

/// Mark the deployed server executable as executable.
///
/// No-op on non-POSIX hosts. Absence of the executable is not an error;
/// some deployments ship no native launcher.
pub fn normalize_server_permissions(
    platform: &dyn Platform,
    bin_dir: &Path,
    executable: &str,
) -> Result<(), UpdateError> {
    if !platform.is_posix() {
        return Ok(());
    }

    let path = bin_dir.join(executable);
    if !path.is_file() {
        debug!(path = %path.display(), "server executable not present, skipping permission fix");
        return Ok(());
    }
    platform.make_executable(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakePlatform {
        posix: bool,
        chmod_calls: Mutex<Vec<PathBuf>>,
    }

    impl FakePlatform {
        fn new(posix: bool) -> Self {
            Self {
                posix,
                chmod_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Platform for FakePlatform {
        fn runtime_identifier(&self) -> String {
            "linux-x64".to_string()
        }

        fn is_posix(&self) -> bool {
            self.posix
        }

        fn make_executable(&self, path: &Path) -> Result<(), UpdateError> {
            self.chmod_calls.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn runtime_identifier_covers_supported_targets() {
        assert_eq!(runtime_identifier_for("linux", "x86_64"), "linux-x64");
        assert_eq!(runtime_identifier_for("linux", "aarch64"), "linux-arm64");
        assert_eq!(runtime_identifier_for("macos", "x86_64"), "osx-x64");
        assert_eq!(runtime_identifier_for("macos", "aarch64"), "osx-arm64");
        assert_eq!(runtime_identifier_for("windows", "x86_64"), "win-x64");
        assert_eq!(runtime_identifier_for("freebsd", "x86_64"), "freebsd-x86_64");
    }

    #[test]
    #[cfg(unix)]
    fn make_executable_preserves_other_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server-host");
        std::fs::write(&path, "bits").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        HostPlatform.make_executable(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o751);
    }

    #[test]
    fn missing_executable_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let platform = FakePlatform::new(true);

        normalize_server_permissions(&platform, tmp.path(), "server-host").unwrap();
        assert!(platform.chmod_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn non_posix_host_never_mutates_permissions() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("server-host"), "bits").unwrap();
        let platform = FakePlatform::new(false);

        normalize_server_permissions(&platform, tmp.path(), "server-host").unwrap();
        assert!(platform.chmod_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn posix_host_marks_the_present_executable() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("server-host"), "bits").unwrap();
        let platform = FakePlatform::new(true);

        normalize_server_permissions(&platform, tmp.path(), "server-host").unwrap();
        assert_eq!(
            *platform.chmod_calls.lock().unwrap(),
            vec![tmp.path().join("server-host")]
        );
    }
}
