//! Update provider facade: the public lifecycle every update source exposes.

mod local_build;

pub use local_build::LocalBuildProvider;

use std::path::Path;

use crate::cancel::CancelToken;
use crate::error::UpdateError;

/// Name of the server executable inside the deployed binary directory.
pub const SERVER_EXECUTABLE: &str = "server-host";

/// Package file the packaging step produces.
pub const SERVER_PACKAGE: &str = "server.tar.zst";

/// Subdirectory of the checkout the package lands in.
pub const RELEASE_DIR: &str = "release";

/// Subdirectory of the instance holding the source checkout.
pub const SOURCE_DIR: &str = "source";

/// Common contract all update sources satisfy.
///
/// At most one `run_update` per instance may be in flight at a time; that
/// serialization belongs to the caller. Independent instances update
/// concurrently with no shared state. `check_for_update` is pure and safe
/// to call concurrently with anything.
pub trait UpdateProvider {
    /// Whether the deployed version differs from the target version.
    ///
    /// Pure comparison; no I/O, no external calls.
    fn check_for_update(&self, current_version: Option<&str>) -> bool;

    /// Build and deploy the target version into `bin_dir`.
    ///
    /// Returns `Ok(Some(version))` after a completed deploy, `Ok(None)` when
    /// the instance is already at the target (nothing is touched), and the
    /// typed failure kind otherwise. A failed run never reports a new
    /// version; the caller keeps its current one and decides whether to
    /// retry.
    fn run_update(
        &self,
        current_version: Option<&str>,
        bin_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<Option<String>, UpdateError>;
}
