//! Subcommand implementations.
//!
//! Each command writes its report to the given writer so the binary can
//! point it at stdout and tests at a buffer.

use std::{io::Write, time::Duration};

use serde::Serialize;
use tracing::{info, warn};
use webshell_core::{
    CapabilityTier, HostPlatform, PermissionSequencer, PermissionStatus, ShellConfig,
};
use webshell_harness::{ConnectivityChaos, InvariantRegistry, ShellWorld, chaos::ChaosReport};
use webshell_proto::shim::{self, Transport};

use crate::CliError;

/// Write a summary of a validated config.
pub fn check<W: Write>(config: &ShellConfig, out: &mut W) -> Result<(), CliError> {
    config.validate()?;
    writeln!(out, "{} ({})", config.app_name, config.package_id)?;
    writeln!(out, "  platform   {} tier {}", config.platform, config.tier())?;
    writeln!(out, "  remote     {}", config.remote_url)?;
    writeln!(out, "  fallback   {}", config.fallback_url())?;
    writeln!(out, "  splash     {}", config.splash_path.as_deref().unwrap_or("none"))?;
    writeln!(out, "  icon       {}", config.icon_path.as_deref().unwrap_or("none"))?;
    if !config.architectures.is_empty() {
        writeln!(out, "  arch       {}", config.architectures.join(", "))?;
    }
    writeln!(out, "  permissions {} declared", config.permissions.len())?;

    let timings = &config.timings;
    writeln!(
        out,
        "  timings    grace {}ms, exit window {}ms, splash fade {}ms, tick {}ms",
        timings.grace_delay_ms, timings.exit_window_ms, timings.splash_fade_ms, timings.tick_ms
    )?;
    writeln!(out, "ok")?;
    Ok(())
}

/// Write the permission plan for the config's host, optionally at another
/// tier.
pub fn plan<W: Write>(
    config: &ShellConfig,
    tier: Option<u32>,
    out: &mut W,
) -> Result<(), CliError> {
    let platform = config.platform;
    let tier = tier.map_or_else(|| config.tier(), CapabilityTier);
    let sequencer = PermissionSequencer::<Duration>::new(
        platform,
        tier,
        &config.permissions,
        config.timings.grace_delay(),
    );

    writeln!(out, "{platform} tier {tier}")?;
    writeln!(out, "batch after {}ms:", config.timings.grace_delay_ms)?;
    for (index, permission) in sequencer.batch().iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {permission:?} {}",
            index + 1,
            identifier(platform, platform.permission_identifier(*permission))
        )?;
    }

    match sequencer.follow_up() {
        Some(follow_up) => writeln!(
            out,
            "follow-up: {follow_up:?} {} after a foreground location grant",
            identifier(platform, platform.permission_identifier(follow_up))
        )?,
        None => writeln!(out, "follow-up: none")?,
    }

    let skipped: Vec<String> = config
        .permissions
        .iter()
        .filter(|p| sequencer.status(**p) == PermissionStatus::Unsupported)
        .map(|p| format!("{p:?}"))
        .collect();
    if !skipped.is_empty() {
        writeln!(out, "not requested: {}", skipped.join(", "))?;
    }
    Ok(())
}

fn identifier(platform: HostPlatform, id: &str) -> String {
    if id.is_empty() { format!("(no {platform} identifier)") } else { format!("({id})") }
}

/// Write the page-side bridge shim for a host.
pub fn shim<W: Write>(platform: HostPlatform, out: &mut W) -> Result<(), CliError> {
    let transport = match platform {
        HostPlatform::Android => Transport::JavascriptInterface,
        HostPlatform::Ios => Transport::MessageHandler,
    };
    out.write_all(shim::render(transport).as_bytes())?;
    Ok(())
}

/// Combined outcome of a batch of chaos runs.
#[derive(Debug, Clone, Serialize)]
pub struct ChaosSummary {
    /// Per-seed reports, in seed order.
    pub runs: Vec<ChaosReport>,
    /// Whether every run kept every invariant.
    pub passed: bool,
}

/// Run seeded connectivity chaos against a shell built from `config` and
/// write a JSON report.
///
/// Runs `runs` consecutive seeds starting at `seed`. Fails with the first
/// violating seed once the report is written.
pub fn chaos<W: Write>(
    config: &ShellConfig,
    seed: u64,
    runs: u64,
    steps: usize,
    out: &mut W,
) -> Result<ChaosSummary, CliError> {
    let registry = InvariantRegistry::standard();
    let mut reports = Vec::new();

    for seed in seed..seed.saturating_add(runs) {
        let mut world = ShellWorld::new(config.clone());
        world.boot(seed % 2 == 0);
        let report = ConnectivityChaos::new(seed).run(&mut world, steps, &registry);
        if report.passed() {
            info!(seed, steps = report.steps, "chaos run passed");
        } else {
            warn!(seed, violations = report.violations.len(), "chaos run failed");
        }
        reports.push(report);
    }

    let passed = reports.iter().all(ChaosReport::passed);
    let summary = ChaosSummary { runs: reports, passed };
    serde_json::to_writer_pretty(&mut *out, &summary).map_err(std::io::Error::from)?;
    writeln!(out)?;

    match summary.runs.iter().find(|r| !r.passed()) {
        Some(failed) => {
            Err(CliError::InvariantViolated { seed: failed.seed, count: failed.violations.len() })
        },
        None => Ok(summary),
    }
}
