//! Build-from-source update pipeline for managed server instances.
//!
//! Keeps the deployed binary tree of a long-running server instance in sync
//! with a designated target version: compile the server from the instance's
//! source checkout with the external toolchain, extract the produced package
//! into the live binary directory, and normalize executable permissions on
//! POSIX hosts.
//!
//! # Architecture
//!
//! ```text
//! UpdateProvider (facade: check_for_update / run_update)
//!     │
//!     ├── BuildPipeline ── CommandRunner (external toolchain, cancellable)
//!     ├── deploy          (clear bin dir, extract package, traversal guard)
//!     └── Platform        (runtime identifier, execute-bit normalization)
//! ```
//!
//! Process supervision, the control API, and instance metadata belong to the
//! surrounding control plane; this crate only consumes the instance root
//! directory and exposes the update lifecycle. The caller serializes updates
//! per instance; updates for independent instances run concurrently.
//!
//! # Example
//!
//! ```rust,ignore
//! use server_updater::{CancelToken, InstanceDir, LocalBuildProvider, UpdateConfig, UpdateProvider};
//!
//! let instance = InstanceDir::new("/srv/instances/main");
//! let provider = LocalBuildProvider::for_instance(&instance, UpdateConfig::new("2024.08.1"));
//!
//! if provider.check_for_update(Some("2024.07.9")) {
//!     let deployed = provider.run_update(
//!         Some("2024.07.9"),
//!         &instance.instance_dir().join("bin"),
//!         &CancelToken::new(),
//!     )?;
//! }
//! ```

pub mod build;
pub mod cancel;
pub mod config;
pub mod deploy;
pub mod error;
pub mod instance;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod provider;

pub use cancel::CancelToken;
pub use config::UpdateConfig;
pub use error::UpdateError;
pub use instance::{InstanceDir, ServerInstance};
pub use provider::{LocalBuildProvider, UpdateProvider};
