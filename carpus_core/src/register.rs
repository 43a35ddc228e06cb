//! CSV fracture register and journal rollup.
//!
//! Committed entries accumulate in the JSONL journal; rolling up converts
//! them into a long-term CSV register atomically, and recent history can
//! be read back from both stores for case resume and listings.

use crate::{EntryDetails, Finger, FractureEntry, PhalanxLevel, Result, Segment};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV register
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    ao_code: String,
    bone_id: String,
    bone_name: String,
    family_code: String,
    fracture_type: Option<String>,
    sub_bone_id: Option<String>,
    finger: Option<char>,
    phalanx: Option<char>,
    segment: Option<char>,
    qualifications: Option<String>,
    recorded_at: String,
}

impl From<&FractureEntry> for CsvRow {
    fn from(entry: &FractureEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            ao_code: entry.ao_code.clone(),
            bone_id: entry.bone_id.clone(),
            bone_name: entry.bone_name.clone(),
            family_code: entry.details.family_code.clone(),
            fracture_type: entry.details.fracture_type.clone(),
            sub_bone_id: entry.details.sub_bone_id.clone(),
            finger: entry.details.finger.map(|f| f.digit()),
            phalanx: entry.details.phalanx.map(|p| p.digit()),
            segment: entry.details.segment.map(|s| s.digit()),
            qualifications: entry
                .details
                .qualifications
                .as_ref()
                .map(|q| q.iter().collect()),
            recorded_at: entry.recorded_at.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for FractureEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(FractureEntry {
            id,
            bone_id: row.bone_id,
            bone_name: row.bone_name,
            ao_code: row.ao_code,
            recorded_at,
            details: EntryDetails {
                family_code: row.family_code,
                fracture_type: row.fracture_type,
                sub_bone_id: row.sub_bone_id,
                finger: row.finger.and_then(Finger::from_digit),
                phalanx: row.phalanx.and_then(PhalanxLevel::from_digit),
                segment: row.segment.and_then(Segment::from_digit),
                qualifications: row.qualifications.map(|q| q.chars().collect()),
            },
        })
    }
}

/// Roll journal entries into the CSV register and archive the journal
///
/// The register is fsynced before the journal is renamed `.processed`, so
/// an interruption can duplicate rows but never lose them. Processed
/// journals are kept for manual recovery until cleaned up.
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let entries = crate::journal::read_entries(journal_path)?;

    if entries.is_empty() {
        tracing::info!("No entries in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} entries to the register", entries.len());

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    Ok(entries.len())
}

/// Delete processed journal files left behind by previous rollups
pub fn cleanup_processed_journals(journal_dir: &Path) -> Result<usize> {
    if !journal_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for dir_entry in std::fs::read_dir(journal_dir)? {
        let dir_entry = dir_entry?;
        let name = dir_entry.file_name();
        if name.to_string_lossy().ends_with(".processed") {
            std::fs::remove_file(dir_entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!("Removed {} processed journal files", removed);
    }
    Ok(removed)
}

/// Load entries from the last N days from both journal and register
///
/// Returns entries sorted by recorded_at (newest first), deduplicated by
/// id across the two stores.
pub fn load_recent_entries(
    journal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<FractureEntry>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    if journal_path.exists() {
        for entry in crate::journal::read_entries(journal_path)? {
            if entry.recorded_at >= cutoff {
                seen_ids.insert(entry.id);
                entries.push(entry);
            }
        }
        tracing::debug!("Loaded {} entries from journal", entries.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for entry in load_entries_from_csv(csv_path)? {
            if entry.recorded_at >= cutoff && !seen_ids.contains(&entry.id) {
                seen_ids.insert(entry.id);
                entries.push(entry);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} entries from the register", csv_count);
    }

    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    tracing::info!(
        "Loaded {} total entries from last {} days",
        entries.len(),
        days
    );

    Ok(entries)
}

fn load_entries_from_csv(path: &Path) -> Result<Vec<FractureEntry>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match FractureEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse register row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize register row: {}", e);
            }
        }
    }

    Ok(entries)
}
