//! Command implementations for the CLI

use crate::{
    cli::Args,
    config::Config,
    core::{
        DiskSystem, DriveEnumerator, MacDiskSystem, NtfsDrive, RemountOutcome, Remounter,
        select_volume_names,
    },
    error::RemountError,
};
use anyhow::Context;
use tracing::{info, instrument, warn};

/// Execute the remount flow against the real system
#[instrument(skip(config, args))]
pub fn execute(config: &Config, args: &Args) -> anyhow::Result<()> {
    let system = MacDiskSystem::new(config.clone())?;
    run(config, &args.volumes, args.list, &system)?;
    Ok(())
}

/// Privilege check, enumeration, selection and remount
#[instrument(skip(config, system))]
pub fn run<S: DiskSystem>(
    config: &Config,
    volumes: &[String],
    list_only: bool,
    system: &S,
) -> anyhow::Result<Vec<RemountOutcome>> {
    if !system.is_elevated() {
        return Err(RemountError::insufficient_privilege(
            "administrator rights are required, run again with sudo",
        )
        .into());
    }

    config.validate()?;

    let enumerator = DriveEnumerator::new()?;
    let available = enumerator.list_available(system)?;

    if list_only {
        print_drives(system, &available)?;
        return Ok(Vec::new());
    }

    let selected = select_volume_names(&available, volumes);
    info!("Selected volume(s): {:?}", selected);

    if !config.unmount_only && !system.driver_available() {
        warn!(
            "Mount driver not found at {}",
            config.driver.path.display()
        );
    }

    let remounter = Remounter::new(config.clone(), system);
    let outcomes = remounter.process(&selected, &available)?;

    let mounted = outcomes
        .iter()
        .filter(|o| matches!(o, RemountOutcome::Mounted { .. }))
        .count();
    info!(
        "Done: {} volume(s) processed, {} mounted read-write",
        outcomes.len(),
        mounted
    );

    Ok(outcomes)
}

fn print_drives<S: DiskSystem>(system: &S, drives: &[NtfsDrive]) -> anyhow::Result<()> {
    println!("{:<12} {:<24} MOUNT POINT", "DEVICE", "VOLUME");
    for drive in drives {
        let mount_point = system
            .mount_point(&drive.device_identifier)
            .with_context(|| format!("Failed to query {}", drive.device_identifier))?;
        let mount_point = mount_point
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<24} {}",
            drive.device_identifier, drive.volume_name, mount_point
        );
    }
    Ok(())
}
