// CardForge diagnostic tools
// Command-line access to the migration, verification, and backup entry
// points, for working on card databases without launching the editor.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use env_logger::Env;

use cardforge_lib::migrations::{self, CURRENT_VERSION};
use cardforge_lib::utils::backup;
use cardforge_lib::utils::database::{self, Database};
use cardforge_lib::utils::settings::SettingsStore;

const USAGE: &str = "\
Usage: cardforge-tools <command> [options]

Commands:
  migrate    Bring the card database up to the current schema version
  verify     Check the live schema against the expected shape
  backup     Take a timestamped backup of the card database
  version    Show the stored and supported schema versions

Options:
  --db <path>        Card database file (default: from settings)
  --settings <path>  Settings file (default: app data directory)
";

struct Options {
    command: String,
    db_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprint!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let result = match options.command.as_str() {
        "migrate" => run_migrate(&options),
        "verify" => run_verify(&options),
        "backup" => run_backup(&options),
        "version" => run_version(&options),
        other => Err(format!("Unknown command: {}", other)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut args = env::args().skip(1);
    let command = args.next().ok_or_else(|| String::from("Missing command"))?;

    let mut db_path = None;
    let mut settings_path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = args.next().ok_or_else(|| String::from("--db needs a path"))?;
                db_path = Some(PathBuf::from(value));
            }
            "--settings" => {
                let value = args
                    .next()
                    .ok_or_else(|| String::from("--settings needs a path"))?;
                settings_path = Some(PathBuf::from(value));
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(Options {
        command,
        db_path,
        settings_path,
    })
}

fn load_settings(options: &Options) -> Result<SettingsStore, String> {
    match &options.settings_path {
        Some(path) => SettingsStore::load(path.clone()),
        None => SettingsStore::open_default(),
    }
}

fn resolve_db_path(options: &Options, settings: &SettingsStore) -> Result<PathBuf, String> {
    database::resolve_database_path(settings, options.db_path.as_deref())
}

fn run_migrate(options: &Options) -> Result<(), String> {
    let mut settings = load_settings(options)?;
    let db_path = resolve_db_path(options, &settings)?;

    let report = migrations::ensure_up_to_date(&db_path, &mut settings)
        .map_err(|e| e.to_string())?;

    if report.was_noop() {
        println!("{}: already at schema v{}", db_path.display(), report.to_version);
        return Ok(());
    }

    println!(
        "{}: migrated from {} to v{} (steps: {:?})",
        db_path.display(),
        report.from_version,
        report.to_version,
        report.applied
    );
    if let Some(backup) = &report.backup_path {
        println!("Backup written to {}", backup.display());
    }
    if let Some(summary) = &report.template_summary {
        println!(
            "Templates: {} copied, {} already managed, {} skipped",
            summary.copied,
            summary.already_managed,
            summary.skipped.len()
        );
        for rarity in &summary.skipped {
            println!("  skipped: {}", rarity);
        }
    }
    Ok(())
}

fn run_verify(options: &Options) -> Result<(), String> {
    let settings = load_settings(options)?;
    let db_path = resolve_db_path(options, &settings)?;

    let db = Database::open_legacy(db_path.clone())?;
    let report = db.with_connection(migrations::verify_database_integrity)?;

    if report.is_ok() {
        println!("{}: schema OK", db_path.display());
        return Ok(());
    }

    for table in &report.missing_tables {
        println!("missing table: {}", table);
    }
    for column in &report.missing_columns {
        println!("missing column: {}", column);
    }
    for message in &report.integrity_errors {
        println!("integrity: {}", message);
    }
    Err(String::from("schema verification failed"))
}

fn run_backup(options: &Options) -> Result<(), String> {
    let settings = load_settings(options)?;
    let db_path = resolve_db_path(options, &settings)?;

    let backup_path = backup::snapshot(&db_path)?;
    println!("Backup written to {}", backup_path.display());
    Ok(())
}

fn run_version(options: &Options) -> Result<(), String> {
    let settings = load_settings(options)?;
    let db_path = resolve_db_path(options, &settings)?;

    let db = Database::open_legacy(db_path.clone())?;
    let stored = db.with_connection(|conn| migrations::inspect::current_version(conn))?;

    println!("{}: stored schema version {}", db_path.display(), stored);
    println!("supported schema version {}", CURRENT_VERSION);
    Ok(())
}
