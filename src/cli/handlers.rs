use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, CONFIG_KEYS};
use crate::io::recovery;
use crate::io::todo_io;
use crate::model::Settings;
use crate::ops::{archive, view};

/// Where settings live, what they say, and which task file they point at
pub struct Context {
    pub config_dir: PathBuf,
    pub settings: Settings,
    pub task_file: PathBuf,
}

/// Resolve the config directory, load settings and pick the task file
pub fn load_context(file_override: Option<&str>) -> Result<Context, Box<dyn std::error::Error>> {
    let config_dir = config_io::config_dir()?;
    let settings = config_io::load_settings(&config_dir)?;
    let task_file = config_io::resolve_task_file(file_override, &settings, &config_dir);
    Ok(Context {
        config_dir,
        settings,
        task_file,
    })
}

/// Create the task file's parent directory on first run
fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("could not create {}: {}", parent.display(), e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let ctx = load_context(cli.file.as_deref())?;

    match cli.command {
        // No subcommand: launch the TUI
        None => {
            ensure_parent_dir(&ctx.task_file)?;
            crate::tui::run(&ctx.task_file, &ctx.settings)
        }
        Some(Commands::Config(cmd)) => cmd_config(cmd, &ctx, json),
        Some(Commands::Archive(args)) => cmd_archive(args, &ctx, json),
        Some(Commands::List(args)) => cmd_list(args, &ctx, json),
        Some(Commands::Recovery(args)) => cmd_recovery(args, &ctx, json),
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cmd: ConfigCmd, ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match cmd.action {
        ConfigAction::Set(args) => {
            let mut doc = config_io::read_config_doc(&ctx.config_dir)?;
            let stored = config_io::set_config_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config_doc(&ctx.config_dir, &doc)?;
            println!("{} = {}", args.key, stored);
        }
        ConfigAction::Get(args) => match args.key {
            Some(key) => {
                let value = config_io::get_config_value(&ctx.settings, &ctx.config_dir, &key)?;
                if json {
                    println!("{}", serde_json::json!({ key: value }));
                } else {
                    println!("{}", value);
                }
            }
            None => {
                let mut all = serde_json::Map::new();
                for key in CONFIG_KEYS {
                    let value = config_io::get_config_value(&ctx.settings, &ctx.config_dir, key)?;
                    if json {
                        all.insert(key.to_string(), value.into());
                    } else {
                        println!("{} = {}", key, value);
                    }
                }
                if json {
                    println!("{}", serde_json::to_string_pretty(&all)?);
                }
            }
        },
        ConfigAction::Path => {
            println!("{}", config_io::settings_path(&ctx.config_dir).display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

fn cmd_archive(args: ArchiveArgs, ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let days = args.days.unwrap_or(ctx.settings.archive.threshold_days);
    if days < 0 {
        return Err(format!("--days must be 0 or more, got {}", days).into());
    }
    if !ctx.task_file.exists() {
        return Err(format!("task file not found: {}", ctx.task_file.display()).into());
    }

    let today = Local::now().date_naive();
    let outcome = archive::archive_task_file(&ctx.task_file, today, days)?;

    if json {
        let files: Vec<_> = outcome
            .months
            .iter()
            .map(|m| serde_json::json!({ "file": m.path.display().to_string(), "count": m.count }))
            .collect();
        let report = serde_json::json!({
            "archived": outcome.archived_count(),
            "remaining": outcome.remaining.len(),
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if outcome.months.is_empty() {
        println!("nothing to archive");
    } else {
        for month in &outcome.months {
            println!("{} -> {}", month.count, month.path.display());
        }
        println!("archived {} task(s)", outcome.archived_count());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (tasks, err) = todo_io::load_tasks_or_empty(&ctx.task_file);
    if let Some(e) = err {
        return Err(e.into());
    }

    let buckets = if args.all {
        view::group_nonblank(&tasks)
    } else {
        view::group_visible(&tasks, Local::now().date_naive())
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&buckets_to_json(&buckets, &tasks))?
        );
    } else if buckets.is_empty() {
        println!("no tasks");
    } else {
        print!("{}", format_buckets(&buckets, &tasks));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(args: RecoveryArgs, ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dir = todo_io::log_dir(&ctx.task_file);
    let entries = recovery::read_recovery_entries(dir, Some(args.limit.unwrap_or(10)));

    if json {
        let out: Vec<_> = entries.iter().map(recovery_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("no recovery entries");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", format_recovery_entry(entry));
    }
    Ok(())
}
