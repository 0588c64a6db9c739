//! Update provider that builds the server from the instance's local checkout.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::build::{BuildPipeline, BuildStep};
use crate::cancel::CancelToken;
use crate::config::UpdateConfig;
use crate::deploy::{deploy_package, package_digest};
use crate::error::UpdateError;
use crate::instance::ServerInstance;
use crate::platform::{normalize_server_permissions, HostPlatform, Platform};
use crate::preflight;
use crate::process::{CommandRunner, ProcessRunner};

use super::{UpdateProvider, RELEASE_DIR, SERVER_EXECUTABLE, SERVER_PACKAGE, SOURCE_DIR};

/// Builds the target version from `<instance>/source` and deploys the
/// resulting package into the instance's binary directory.
///
/// The checkout is a cargo workspace with a `packager` bin crate: the
/// pipeline restores dependencies, compiles the packager, then runs it to
/// produce `release/server.tar.zst` for the host platform.
pub struct LocalBuildProvider {
    config: UpdateConfig,
    source_dir: PathBuf,
    runner: Box<dyn CommandRunner>,
    platform: Box<dyn Platform>,
}

impl LocalBuildProvider {
    /// Provider wired to the real process runner and host platform.
    pub fn for_instance(instance: &dyn ServerInstance, config: UpdateConfig) -> Self {
        Self::new(
            instance.instance_dir().join(SOURCE_DIR),
            config,
            Box::new(ProcessRunner),
            Box::new(HostPlatform),
        )
    }

    /// Provider with explicit capabilities; tests inject recording doubles.
    pub fn new(
        source_dir: PathBuf,
        config: UpdateConfig,
        runner: Box<dyn CommandRunner>,
        platform: Box<dyn Platform>,
    ) -> Self {
        Self {
            config,
            source_dir,
            runner,
            platform,
        }
    }

    pub fn target_version(&self) -> &str {
        &self.config.target_version
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    fn pipeline(&self, runtime_identifier: &str) -> BuildPipeline {
        let checkout = self.source_dir.as_path();
        BuildPipeline::new(vec![
            BuildStep::new(
                "failed to fetch server dependencies",
                checkout,
                "cargo",
                &["fetch", "--locked"],
            ),
            BuildStep::new(
                "failed to build the packager",
                checkout,
                "cargo",
                &["build", "--release", "--bin", "packager"],
            ),
            BuildStep::new(
                "failed to package the server build",
                checkout,
                "cargo",
                &[
                    "run",
                    "--release",
                    "--bin",
                    "packager",
                    "--",
                    "server",
                    "--platform",
                    runtime_identifier,
                    "--bundle-assets",
                ],
            ),
        ])
    }

    fn build_and_deploy(&self, bin_dir: &Path, cancel: &CancelToken) -> Result<(), UpdateError> {
        let rid = self.platform.runtime_identifier();
        debug!(runtime_identifier = %rid, checkout = %self.source_dir.display(), "building server package");

        preflight::check_build_tools(preflight::BUILD_TOOLS)?;
        self.pipeline(&rid).run(self.runner.as_ref(), cancel)?;

        let package = self.source_dir.join(RELEASE_DIR).join(SERVER_PACKAGE);
        let digest = package_digest(&package)?;
        info!(package = %package.display(), %digest, "applying server update");

        deploy_package(&package, bin_dir, cancel)?;
        normalize_server_permissions(self.platform.as_ref(), bin_dir, SERVER_EXECUTABLE)
    }
}

impl UpdateProvider for LocalBuildProvider {
    fn check_for_update(&self, current_version: Option<&str>) -> bool {
        current_version != Some(self.config.target_version.as_str())
    }

    fn run_update(
        &self,
        current_version: Option<&str>,
        bin_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<Option<String>, UpdateError> {
        // Re-check so repeated invocations with the same inputs are no-ops.
        if current_version == Some(self.config.target_version.as_str()) {
            debug!(version = %self.config.target_version, "instance already at target version");
            return Ok(None);
        }

        match self.build_and_deploy(bin_dir, cancel) {
            Ok(()) => {
                info!(version = %self.config.target_version, "server instance updated");
                Ok(Some(self.config.target_version.clone()))
            }
            Err(e) => {
                match &e {
                    UpdateError::Cancelled => info!("server update cancelled"),
                    UpdateError::BuildCommand { output, .. } => {
                        error!(error = %e, %output, "failed to run server update")
                    }
                    _ => error!(error = %e, "failed to run server update"),
                }
                Err(e)
            }
        }
    }
}
