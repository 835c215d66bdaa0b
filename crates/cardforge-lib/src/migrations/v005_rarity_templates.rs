// v5: templates by rarity
// Dual-target step. Schema side (fail-fast): normalize rarity values so
// template lookup by rarity always succeeds. Settings side (best-effort):
// copy each referenced template image into the canonical managed templates
// directory and rewrite the settings entry to the new path. A template file
// that cannot be copied is logged and skipped; one missing optional image
// must not abort the migration.

use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

use super::MigrationContext;
use crate::models::Rarity;
use crate::utils::settings::SettingsStore;

pub(crate) const VERSION: i32 = 5;
pub(crate) const DESCRIPTION: &str = "Per-rarity template reorganization";

/// Outcome of the best-effort template reorganization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReconcileSummary {
    /// Templates copied into the managed directory and rewritten in settings
    pub copied: usize,
    /// Entries that already pointed into the managed directory
    pub already_managed: usize,
    /// Rarities whose template could not be copied; their settings entries
    /// are left unchanged
    pub skipped: Vec<String>,
}

pub(crate) fn up(conn: &Connection, ctx: &mut MigrationContext) -> Result<(), String> {
    conn.execute(
        "UPDATE cards SET rarity = 'common' WHERE rarity IS NULL OR TRIM(rarity) = ''",
        [],
    )
    .map_err(|e| format!("Failed to normalize card rarities: {}", e))?;

    let summary = reconcile_templates(ctx.settings)?;
    ctx.template_summary = Some(summary);
    Ok(())
}

/// Relocate configured template images into the managed templates directory
/// and point the settings entries at the new canonical paths. Re-runnable:
/// entries already under the managed directory are left alone, and copying
/// over an existing destination is harmless.
pub fn reconcile_templates(settings: &mut SettingsStore) -> Result<TemplateReconcileSummary, String> {
    let templates_dir = settings.templates_dir();
    fs::create_dir_all(&templates_dir)
        .map_err(|e| format!("Failed to create templates directory {:?}: {}", templates_dir, e))?;

    let mut summary = TemplateReconcileSummary::default();
    for rarity in Rarity::ALL {
        let source: PathBuf = match settings.template_for(rarity) {
            Some(path) => path.to_path_buf(),
            None => continue,
        };

        if source.starts_with(&templates_dir) {
            summary.already_managed += 1;
            continue;
        }

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let dest = templates_dir.join(format!("{}.{}", rarity.as_str(), ext));

        match fs::copy(&source, &dest) {
            Ok(_) => {
                settings.set_template(rarity, dest);
                summary.copied += 1;
            }
            Err(e) => {
                log::warn!(
                    "Skipping template for rarity '{}' ({}): {}",
                    rarity.as_str(),
                    source.display(),
                    e
                );
                summary.skipped.push(rarity.as_str().to_string());
            }
        }
    }

    settings.save()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_reconcile_copies_and_rewrites() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("old").join("rare-template.png");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"png bytes").unwrap();

        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        settings.set_template(Rarity::Rare, source);

        let summary = reconcile_templates(&mut settings).unwrap();
        assert_eq!(summary.copied, 1);
        assert!(summary.skipped.is_empty());

        let managed = dir.path().join("templates").join("rare.png");
        assert_eq!(settings.template_for(Rarity::Rare), Some(managed.as_path()));
        assert_eq!(fs::read(&managed).unwrap(), b"png bytes");
    }

    #[test]
    fn test_missing_source_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        settings.set_template(Rarity::Epic, dir.path().join("nowhere.png"));

        let summary = reconcile_templates(&mut settings).unwrap();
        assert_eq!(summary.copied, 0);
        assert_eq!(summary.skipped, vec![String::from("epic")]);

        // The entry is left pointing at the old location
        assert_eq!(
            settings.template_for(Rarity::Epic),
            Some(dir.path().join("nowhere.png").as_path())
        );
    }

    #[test]
    fn test_already_managed_entries_are_untouched() {
        let dir = tempdir().unwrap();
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();

        let managed: &Path = &dir.path().join("templates").join("common.png");
        fs::create_dir_all(managed.parent().unwrap()).unwrap();
        fs::write(managed, b"already here").unwrap();
        settings.set_template(Rarity::Common, managed.to_path_buf());

        let summary = reconcile_templates(&mut settings).unwrap();
        assert_eq!(summary.copied, 0);
        assert_eq!(summary.already_managed, 1);
        assert_eq!(settings.template_for(Rarity::Common), Some(managed));
    }
}
