//! Application orchestration: configuration, scan, grouping, relocation and
//! the audit log.
//!
//! The wet/dry decision and its confirmation gate live here and nowhere
//! else. Library functions below this layer always do what they are asked.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use chrono::Local;

use crate::actions::{generate_safe_path, hash_preserving_times, RelocationOutcome, Relocator};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{select_keeper, DuplicateFinder, DuplicateGroup, FinderConfig};
use crate::error::{ExitCode, WetModeRefused};
use crate::logging::init_logging;
use crate::output::{AuditLog, AuditRecord, GroupContext};
use crate::progress::{Progress, ProgressCallback, PHASE_RELOCATING};
use crate::scanner::{Hasher, WalkerConfig};

/// Timestamp format used for default directory and log names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Where a run writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Destination for relocated duplicates
    pub move_dir: PathBuf,
    /// Whether `move_dir` came from the built-in default
    pub default_move_dir: bool,
    /// CSV audit log location
    pub log_path: PathBuf,
    /// Files are actually moved
    pub wet: bool,
}

impl RunPlan {
    /// Resolve output locations from the CLI, config and run timestamp.
    ///
    /// Dry runs log to the working directory; wet runs log inside the move
    /// directory. An explicit `--log` wins in both cases.
    #[must_use]
    pub fn resolve(cli: &Cli, config: &Config, timestamp: &str) -> Self {
        let (move_dir, default_move_dir) = match &cli.move_dir {
            Some(dir) => (dir.clone(), false),
            None => (config.quarantine_root.join(timestamp), true),
        };

        let log_path = cli.log.clone().unwrap_or_else(|| {
            let name = format!("dupes-{timestamp}.csv");
            if cli.wet {
                move_dir.join(name)
            } else {
                PathBuf::from(name)
            }
        });

        Self {
            move_dir,
            default_move_dir,
            log_path,
            wet: cli.wet,
        }
    }
}

/// Environment variable that must confirm wet mode.
pub const CONFIRM_ENV_VAR: &str = "DUDE_ARE_YOU_SURE";
/// Exact value [`CONFIRM_ENV_VAR`] must hold.
pub const CONFIRM_VALUE: &str = "YES";

/// Check both wet-mode confirmations.
///
/// # Errors
///
/// Returns [`WetModeRefused`] unless `yes_really` is set and `env_value`
/// equals [`CONFIRM_VALUE`] exactly.
pub fn check_wet_confirmation(
    yes_really: bool,
    env_value: Option<&str>,
) -> Result<(), WetModeRefused> {
    if yes_really && env_value == Some(CONFIRM_VALUE) {
        Ok(())
    } else {
        Err(WetModeRefused)
    }
}

/// Counters collected while processing groups.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Groups processed
    pub groups: usize,
    /// Rows proposing a move
    pub planned: usize,
    /// Files relocated
    pub moved: usize,
    /// Relocations or post-move hashes that failed
    pub failed: usize,
    /// Bytes held by non-keeper members
    pub duplicate_space: u64,
}

/// Run the application for parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, a refused wet run, a missing
/// source directory, or an audit log that cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_cli_overrides(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let plan = RunPlan::resolve(&cli, &config, &timestamp);
    let quiet = cli.quiet;

    if plan.default_move_dir && !quiet {
        println!("[INFO] Using default move-dir: {}", plan.move_dir.display());
    }

    if plan.wet {
        let env_value = env::var(CONFIRM_ENV_VAR).ok();
        check_wet_confirmation(cli.yes_really, env_value.as_deref())?;
        fs::create_dir_all(&plan.move_dir).with_context(|| {
            format!("Failed to create move directory {}", plan.move_dir.display())
        })?;
    }

    if !quiet {
        print_config(&plan, &config);
    }

    let progress = Arc::new(Progress::new(quiet));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_algorithm(config.algorithm)
            .with_chunk_size(config.chunk_size)
            .with_verbose(cli.verbose > 0)
            .with_progress_callback(progress.clone()),
    );
    let walker_config = WalkerConfig::new(config.follow_symlinks, config.skip_hidden);

    let (groups, summary) = finder
        .find_duplicates_in(&cli.src, &walker_config)
        .with_context(|| format!("Failed to scan {}", cli.src.display()))?;

    for warning in &summary.warnings {
        log::warn!("Skipped: {}", warning);
    }
    if !quiet {
        println!("[INFO] Found {} duplicate groups.", groups.len());
    }

    let mut audit = AuditLog::create(&plan.log_path)
        .with_context(|| format!("Failed to open log {}", plan.log_path.display()))?;

    let stats = process_groups(&groups, &plan, &config, &mut audit, progress.as_ref(), quiet)?;

    if !quiet {
        println!(
            "[DONE] {} dupe groups processed. Total duplicate space: {}. Moved: {}, failed: {}. Log saved to {}",
            stats.groups,
            ByteSize(stats.duplicate_space),
            stats.moved,
            stats.failed,
            plan.log_path.display()
        );
    }

    Ok(if groups.is_empty() {
        ExitCode::NoDuplicates
    } else if stats.failed > 0 || summary.has_warnings() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

fn print_config(plan: &RunPlan, config: &Config) {
    println!("[CONFIG]");
    println!("- Mode: {}", if plan.wet { "WET" } else { "DRYRUN" });
    println!("- Keeper strategy: {}", config.keeper);
    println!("- Algorithm: {}", config.algorithm);
    println!("- Move directory: {}", plan.move_dir.display());
    println!(
        "- Strict hash verification: {}",
        if config.strict { "ON" } else { "OFF" }
    );
    println!("- Log file: {}", plan.log_path.display());
}

/// Write audit rows for every group and relocate non-keepers in wet mode.
///
/// Individual relocation failures are recorded and counted; only a failure
/// to write the log aborts.
pub fn process_groups<W: std::io::Write>(
    groups: &[DuplicateGroup],
    plan: &RunPlan,
    config: &Config,
    audit: &mut AuditLog<W>,
    progress: &dyn ProgressCallback,
    quiet: bool,
) -> Result<RunStats> {
    let hasher = Hasher::new()
        .with_algorithm(config.algorithm)
        .with_chunk_size(config.chunk_size);
    let relocator = Relocator::new(config.strict)
        .with_algorithm(config.algorithm)
        .with_chunk_size(config.chunk_size);

    let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();
    progress.on_phase_start(PHASE_RELOCATING, total);

    let mut stats = RunStats::default();
    let mut current = 0;

    for (idx, group) in groups.iter().enumerate() {
        let group_id = idx + 1;
        let keeper = select_keeper(group, config.keeper);
        let ctx = GroupContext::new(
            group_id,
            keeper,
            group.total_size(),
            group.reclaimable_space(),
        );
        stats.groups += 1;

        if !quiet {
            println!(
                "[GROUP {}] {} files, size each: {}",
                group_id,
                group.len(),
                ByteSize(group.size)
            );
            println!(
                "  - Before: {} | After: {} | Reclaimable: {}",
                ByteSize(group.total_size()),
                ByteSize(group.size),
                ByteSize(group.reclaimable_space())
            );
        }

        audit.record(&AuditRecord::keeper(&ctx, group.digest.as_str()))?;

        for dupe in group.paths().iter().filter(|f| f.as_path() != keeper) {
            current += 1;
            progress.on_progress(current, &dupe.to_string_lossy());
            stats.duplicate_space += group.size;

            let record = if plan.wet {
                relocate_one(&relocator, &hasher, &ctx, dupe, &plan.move_dir, &mut stats)
            } else {
                stats.planned += 1;
                let destination = match dupe.file_name() {
                    Some(name) => generate_safe_path(&plan.move_dir, name),
                    None => plan.move_dir.clone(),
                };
                AuditRecord::dry_run(&ctx, dupe, &destination, group.digest.as_str())
            };
            audit.record(&record)?;
        }
    }

    progress.on_phase_end(PHASE_RELOCATING);
    Ok(stats)
}

fn relocate_one(
    relocator: &Relocator,
    hasher: &Hasher,
    ctx: &GroupContext,
    dupe: &Path,
    move_dir: &Path,
    stats: &mut RunStats,
) -> AuditRecord {
    let result = relocator.relocate(dupe, move_dir);
    match &result.outcome {
        RelocationOutcome::Success { destination } => {
            match hash_preserving_times(hasher, destination) {
                Ok(digest) => {
                    stats.moved += 1;
                    AuditRecord::moved(ctx, dupe, destination, digest.as_str())
                }
                Err(e) => {
                    stats.failed += 1;
                    AuditRecord::error(ctx, dupe, destination, "", &format!("Hash error: {e}"))
                }
            }
        }
        RelocationOutcome::Failure { destination, cause } => {
            stats.failed += 1;
            AuditRecord::error(ctx, dupe, destination, "", cause)
        }
    }
}
