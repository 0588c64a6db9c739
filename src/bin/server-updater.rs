use std::path::Path;

use anyhow::{bail, Context, Result};
use server_updater::{
    CancelToken, InstanceDir, LocalBuildProvider, UpdateConfig, UpdateProvider,
};

fn usage() -> &'static str {
    "Usage:\n  server-updater check <instance-dir> <config.toml> [current-version]\n  server-updater run <instance-dir> <config.toml> [current-version]"
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, instance_dir, config] if cmd == "check" => {
            check(Path::new(instance_dir), Path::new(config), None)
        }
        [cmd, instance_dir, config, current] if cmd == "check" => {
            check(Path::new(instance_dir), Path::new(config), Some(current.as_str()))
        }
        [cmd, instance_dir, config] if cmd == "run" => {
            run(Path::new(instance_dir), Path::new(config), None)
        }
        [cmd, instance_dir, config, current] if cmd == "run" => {
            run(Path::new(instance_dir), Path::new(config), Some(current.as_str()))
        }
        _ => bail!(usage()),
    }
}

fn load_provider(instance_dir: &Path, config_path: &Path) -> Result<LocalBuildProvider> {
    let config = UpdateConfig::load(config_path)?;
    let instance = InstanceDir::new(instance_dir);
    Ok(LocalBuildProvider::for_instance(&instance, config))
}

fn check(instance_dir: &Path, config_path: &Path, current: Option<&str>) -> Result<()> {
    let provider = load_provider(instance_dir, config_path)?;
    if provider.check_for_update(current) {
        println!(
            "update available: {} -> {}",
            current.unwrap_or("<none>"),
            provider.target_version()
        );
    } else {
        println!(
            "instance is already at the target version {}",
            provider.target_version()
        );
    }
    Ok(())
}

fn run(instance_dir: &Path, config_path: &Path, current: Option<&str>) -> Result<()> {
    let provider = load_provider(instance_dir, config_path)?;
    let bin_dir = instance_dir.join("bin");
    let cancel = CancelToken::new();

    match provider.run_update(current, &bin_dir, &cancel) {
        Ok(Some(version)) => {
            println!("instance updated to {version}");
            Ok(())
        }
        Ok(None) => {
            println!("no update needed");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "updating instance '{}' to {}",
                instance_dir.display(),
                provider.target_version()
            )
        }),
    }
}
