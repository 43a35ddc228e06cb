//! Referral intake: pre-existing classifications from an external system.
//!
//! A referral file seeds a capture session with entries classified
//! elsewhere, so a case can be resumed or extended. The file is optional
//! and a malformed one is ignored rather than treated as fatal.

use crate::{FractureEntry, Result};
use serde::Deserialize;
use std::path::Path;

/// Referral file format (matches external system output)
#[derive(Debug, Deserialize)]
struct ReferralFile {
    fractures: Vec<FractureEntry>,
}

/// Load pre-existing fracture entries from a referral JSON file
///
/// Returns None if the file doesn't exist (no referral for this case).
/// Unreadable or malformed files are logged and ignored.
pub fn load_referral(path: &Path) -> Result<Option<Vec<FractureEntry>>> {
    if !path.exists() {
        tracing::debug!("No referral file found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read referral at {:?}: {}. Ignoring referral.",
                path,
                e
            );
            return Ok(None);
        }
    };

    let file: ReferralFile = match serde_json::from_str(&contents) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                "Failed to parse referral at {:?}: {}. Ignoring referral.",
                path,
                e
            );
            return Ok(None);
        }
    };

    tracing::info!(
        "Loaded referral with {} prior classifications",
        file.fractures.len()
    );

    Ok(Some(file.fractures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryDetails;
    use chrono::Utc;
    use uuid::Uuid;

    fn referral_json() -> String {
        let entry = FractureEntry {
            id: Uuid::new_v4(),
            bone_id: "lunate".into(),
            bone_name: "Lunate".into(),
            ao_code: "71.A".into(),
            recorded_at: Utc::now(),
            details: EntryDetails {
                family_code: "71".into(),
                fracture_type: Some("A".into()),
                ..Default::default()
            },
        };
        serde_json::json!({ "fractures": [entry] }).to_string()
    }

    #[test]
    fn test_load_referral() {
        let temp_dir = tempfile::tempdir().unwrap();
        let referral_path = temp_dir.path().join("referral.json");

        std::fs::write(&referral_path, referral_json()).unwrap();

        let referred = load_referral(&referral_path).unwrap();
        assert!(referred.is_some());

        let entries = referred.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ao_code, "71.A");
    }

    #[test]
    fn test_load_missing_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let referral_path = temp_dir.path().join("nonexistent.json");

        let referred = load_referral(&referral_path).unwrap();
        assert!(referred.is_none());
    }

    #[test]
    fn test_malformed_referral_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let referral_path = temp_dir.path().join("bad.json");

        std::fs::write(&referral_path, "{ invalid json }").unwrap();

        let referred = load_referral(&referral_path).unwrap();
        assert!(referred.is_none());
    }
}
