//! Loading source files and persisting raid snapshots

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use raidbook_core::{BossDirectory, DirectoryConfig, Gym, GymDirectory, PoiError, Raid};
use raidbook_records::{parse_boss_file, parse_gyms, parse_raid_snapshot, write_raid_snapshot};

pub fn load_bosses(path: &Path, config: DirectoryConfig) -> Result<BossDirectory> {
    let context = || format!("unable to load bosses from {}", path.display());

    let contents = fs::read_to_string(path).with_context(context)?;
    let groups = parse_boss_file(&contents).with_context(context)?;
    let bosses = BossDirectory::from_tier_groups(&groups, config).with_context(context)?;
    Ok(bosses)
}

pub fn load_gyms(path: &Path, config: DirectoryConfig) -> Result<GymDirectory> {
    let context = || format!("unable to load gyms from {}", path.display());

    let contents = fs::read_to_string(path).with_context(context)?;
    let records = parse_gyms(&contents).with_context(context)?;
    let gyms = records
        .iter()
        .map(Gym::from_record)
        .collect::<Result<Vec<_>, PoiError>>()
        .with_context(context)?;

    let mut directory = GymDirectory::new(config);
    directory.add_range(gyms).with_context(context)?;
    tracing::debug!(path = %path.display(), gyms = directory.len(), "loaded gyms");
    Ok(directory)
}

/// Read a raid snapshot. Records that no longer resolve against the
/// loaded gyms and bosses are skipped with a warning.
pub fn load_snapshot(
    path: &Path,
    gyms: &GymDirectory,
    bosses: &BossDirectory,
    now: DateTime<Utc>,
) -> Result<Vec<Raid>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read raid snapshot {}", path.display()))?;
    let records = parse_raid_snapshot(&contents)
        .with_context(|| format!("invalid raid snapshot {}", path.display()))?;

    let mut raids = Vec::with_capacity(records.len());
    for record in &records {
        match Raid::from_record(record, gyms, bosses, now) {
            Ok(raid) => raids.push(raid),
            Err(e) => tracing::warn!(gym = %record.gym, error = %e, "Skipping raid from snapshot"),
        }
    }
    Ok(raids)
}

pub fn save_snapshot<'a>(path: &Path, raids: impl IntoIterator<Item = &'a Raid>) -> Result<()> {
    let records: Vec<_> = raids.into_iter().map(Raid::to_record).collect();
    let contents = write_raid_snapshot(&records)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("unable to save raids to {}", path.display()))?;
    Ok(())
}
