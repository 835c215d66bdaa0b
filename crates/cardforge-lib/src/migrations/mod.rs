// Schema migrations
// Brings a card database file from whatever structural version it is at up
// to the version this build expects, one step at a time. Each step commits
// together with its version-marker row in a single transaction, so a crash
// always leaves the file at a well-defined, previously completed version.
// There is no rollback; recovery relies on the pre-run backup plus every
// step being safe to re-run.

pub mod error;
pub mod inspect;
pub mod integrity;

mod v001_baseline;
mod v002_text_layout;
mod v003_original_image;
mod v004_actors;
mod v005_rarity_templates;

use rusqlite::{params, Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};

pub use error::MigrationError;
pub use inspect::SchemaVersion;
pub use integrity::{verify_database_integrity, IntegrityReport};
pub use v005_rarity_templates::{reconcile_templates, TemplateReconcileSummary};

use crate::utils::backup;
use crate::utils::settings::SettingsStore;

/// Schema version this build expects
pub const CURRENT_VERSION: i32 = 5;

/// A single version-to-version transform. `up` runs inside the step's
/// transaction; anything filesystem-side it does must be re-runnable.
struct Migration {
    version: i32,
    description: &'static str,
    up: fn(&Connection, &mut MigrationContext) -> Result<(), String>,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: v001_baseline::VERSION,
        description: v001_baseline::DESCRIPTION,
        up: v001_baseline::up,
    },
    Migration {
        version: v002_text_layout::VERSION,
        description: v002_text_layout::DESCRIPTION,
        up: v002_text_layout::up,
    },
    Migration {
        version: v003_original_image::VERSION,
        description: v003_original_image::DESCRIPTION,
        up: v003_original_image::up,
    },
    Migration {
        version: v004_actors::VERSION,
        description: v004_actors::DESCRIPTION,
        up: v004_actors::up,
    },
    Migration {
        version: v005_rarity_templates::VERSION,
        description: v005_rarity_templates::DESCRIPTION,
        up: v005_rarity_templates::up,
    },
];

/// State handed to each step. The settings store is an explicit handle so
/// the dual-target step has no hidden coupling to process-wide state.
pub struct MigrationContext<'a> {
    pub settings: &'a mut SettingsStore,
    pub template_summary: Option<TemplateReconcileSummary>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(settings: &'a mut SettingsStore) -> Self {
        Self {
            settings,
            template_summary: None,
        }
    }
}

/// What a migration run did
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Version found on disk before the run
    pub from_version: SchemaVersion,
    /// Version the file is at now
    pub to_version: i32,
    /// Versions applied by this run, in order (empty = already up to date)
    pub applied: Vec<i32>,
    /// Where the pre-run backup landed; None when nothing existed to back
    /// up or no step needed to run
    pub backup_path: Option<PathBuf>,
    /// Per-rarity outcome of the template reorganization, when that step ran
    pub template_summary: Option<TemplateReconcileSummary>,
}

impl MigrationReport {
    pub fn was_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Bring the database file at `db_path` up to the current schema version.
///
/// The common case (file already current) returns immediately without
/// taking a backup or writing anything. Otherwise the file is backed up
/// first, then pending steps run in order; the first failing step halts the
/// chain with the database left at the last completed version.
pub fn ensure_up_to_date(
    db_path: &Path,
    settings: &mut SettingsStore,
) -> Result<MigrationReport, MigrationError> {
    migrate_to(db_path, settings, CURRENT_VERSION)
}

/// Runner core, parameterized on the target version so tests can stage a
/// database at an intermediate version.
pub(crate) fn migrate_to(
    db_path: &Path,
    settings: &mut SettingsStore,
    target: i32,
) -> Result<MigrationReport, MigrationError> {
    let from_version = inspect_file(db_path)?;

    if let SchemaVersion::Known(found) = from_version {
        if found > CURRENT_VERSION {
            return Err(MigrationError::NewerSchema {
                found,
                supported: CURRENT_VERSION,
            });
        }
        if found >= target {
            // Fast path: nothing to do, no backup, no writes
            log::debug!("database schema is up to date at v{}", found);
            return Ok(MigrationReport {
                from_version,
                to_version: found,
                applied: Vec::new(),
                backup_path: None,
                template_summary: None,
            });
        }
    }

    // Never mutate unprotected data: snapshot before the first step. A file
    // that does not exist yet has nothing to protect.
    let backup_path = if db_path.exists() {
        let path = backup::snapshot(db_path).map_err(|message| MigrationError::Backup { message })?;
        log::info!("Database backed up to {:?}", path);
        Some(path)
    } else {
        None
    };

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| MigrationError::Open {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }
    }
    let mut conn = Connection::open(db_path).map_err(|e| MigrationError::Open {
        message: format!("Failed to open database: {}", e),
    })?;

    let mut ctx = MigrationContext::new(settings);
    let mut last_good = from_version.effective();
    let mut applied = Vec::new();

    for migration in MIGRATIONS {
        if migration.version <= last_good || migration.version > target {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        let tx = conn.transaction().map_err(|e| MigrationError::Step {
            version: migration.version,
            last_good,
            message: format!("Failed to start transaction: {}", e),
        })?;

        (migration.up)(&tx, &mut ctx).map_err(|message| MigrationError::Step {
            version: migration.version,
            last_good,
            message,
        })?;

        tx.execute(
            "INSERT INTO schema_version (version, description) VALUES (?1, ?2)",
            params![migration.version, migration.description],
        )
        .map_err(|e| MigrationError::Step {
            version: migration.version,
            last_good,
            message: format!("Failed to record migration: {}", e),
        })?;

        tx.commit().map_err(|e| MigrationError::Step {
            version: migration.version,
            last_good,
            message: format!("Failed to commit: {}", e),
        })?;

        last_good = migration.version;
        applied.push(migration.version);
        log::info!("Migration v{} completed", migration.version);
    }

    Ok(MigrationReport {
        from_version,
        to_version: last_good,
        applied,
        backup_path,
        template_summary: ctx.template_summary,
    })
}

/// Determine the on-disk version without mutating anything. A nonexistent
/// file reads as unversioned; a file SQLite cannot parse is corrupt.
fn inspect_file(db_path: &Path) -> Result<SchemaVersion, MigrationError> {
    if !db_path.exists() {
        return Ok(SchemaVersion::Unversioned);
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |e| MigrationError::Open {
            message: format!("Failed to open database read-only: {}", e),
        },
    )?;

    let valid = inspect::is_valid_database(&conn)
        .map_err(|message| MigrationError::Open { message })?;
    if !valid {
        return Err(MigrationError::CorruptDatabase {
            path: db_path.to_path_buf(),
        });
    }

    inspect::current_version(&conn).map_err(|message| MigrationError::Open { message })
}
