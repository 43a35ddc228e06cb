//! The bone-family taxonomy of the hand and carpus.
//!
//! Families 71 through 76 cover the carpal bones (pisiform, triquetrum and
//! trapezoid share family 76 as sub-bones), 77 the metacarpals, 78 the
//! phalanges, and 79 crush or multiple fractures. The taxonomy is static
//! data plus pure lookups with no failure mode beyond "not found".

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default taxonomy - built once and reused across all operations
static DEFAULT_TAXONOMY: Lazy<Taxonomy> = Lazy::new(build_default_taxonomy_internal);

/// Get a reference to the cached default taxonomy
pub fn default_taxonomy() -> &'static Taxonomy {
    &DEFAULT_TAXONOMY
}

/// Builds the default hand/carpus taxonomy
///
/// **Note**: For production use, prefer `default_taxonomy()` which returns
/// a cached reference. This function is retained for testing and custom
/// taxonomy construction.
pub fn build_default_taxonomy() -> Taxonomy {
    build_default_taxonomy_internal()
}

fn carpal_types() -> Vec<TypeEntry> {
    vec![
        TypeEntry {
            group: FractureGroup::A,
            label: "Avulsion fracture",
        },
        TypeEntry {
            group: FractureGroup::B,
            label: "Simple fracture",
        },
        TypeEntry {
            group: FractureGroup::C,
            label: "Multifragmentary fracture",
        },
    ]
}

fn articular_segment_types() -> Vec<TypeEntry> {
    vec![
        TypeEntry {
            group: FractureGroup::A,
            label: "Extraarticular fracture",
        },
        TypeEntry {
            group: FractureGroup::B,
            label: "Partial articular fracture",
        },
        TypeEntry {
            group: FractureGroup::C,
            label: "Complete articular fracture",
        },
    ]
}

fn shaft_types() -> Vec<TypeEntry> {
    vec![
        TypeEntry {
            group: FractureGroup::A,
            label: "Simple fracture",
        },
        TypeEntry {
            group: FractureGroup::B,
            label: "Wedge fracture",
        },
        TypeEntry {
            group: FractureGroup::C,
            label: "Multifragmentary fracture",
        },
    ]
}

/// Segment tables for the long bones of the hand: base, shaft, head
fn long_bone_segments() -> [Vec<TypeEntry>; 3] {
    [articular_segment_types(), shaft_types(), articular_segment_types()]
}

fn build_default_taxonomy_internal() -> Taxonomy {
    let mut families = HashMap::new();

    families.insert(
        "71".to_string(),
        BoneFamily {
            code: "71",
            name: "Lunate",
            rules: FamilyRules::CarpalSingle {
                types: carpal_types(),
            },
            qualifications: vec![],
        },
    );

    // The scaphoid is the only family with location qualifiers, and only
    // its B and C types take one.
    families.insert(
        "72".to_string(),
        BoneFamily {
            code: "72",
            name: "Scaphoid",
            rules: FamilyRules::CarpalSingle {
                types: carpal_types(),
            },
            qualifications: vec![
                QualifierEntry {
                    key: 'a',
                    label: "Proximal pole",
                },
                QualifierEntry {
                    key: 'b',
                    label: "Waist",
                },
                QualifierEntry {
                    key: 'c',
                    label: "Distal pole",
                },
            ],
        },
    );

    families.insert(
        "73".to_string(),
        BoneFamily {
            code: "73",
            name: "Capitate",
            rules: FamilyRules::CarpalSingle {
                types: carpal_types(),
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "74".to_string(),
        BoneFamily {
            code: "74",
            name: "Hamate",
            rules: FamilyRules::CarpalSingle {
                types: carpal_types(),
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "75".to_string(),
        BoneFamily {
            code: "75",
            name: "Trapezium",
            rules: FamilyRules::CarpalSingle {
                types: carpal_types(),
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "76".to_string(),
        BoneFamily {
            code: "76",
            name: "Other carpal bones",
            rules: FamilyRules::CarpalSubBones {
                sub_bones: vec![
                    SubBone {
                        id: "pisiform",
                        name: "Pisiform",
                        types: carpal_types(),
                    },
                    SubBone {
                        id: "triquetrum",
                        name: "Triquetrum",
                        types: vec![
                            TypeEntry {
                                group: FractureGroup::A,
                                label: "Dorsal avulsion fracture",
                            },
                            TypeEntry {
                                group: FractureGroup::B,
                                label: "Simple body fracture",
                            },
                            TypeEntry {
                                group: FractureGroup::C,
                                label: "Multifragmentary body fracture",
                            },
                        ],
                    },
                    SubBone {
                        id: "trapezoid",
                        name: "Trapezoid",
                        types: carpal_types(),
                    },
                ],
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "77".to_string(),
        BoneFamily {
            code: "77",
            name: "Metacarpals",
            rules: FamilyRules::MetacarpalLongBone {
                by_segment: long_bone_segments(),
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "78".to_string(),
        BoneFamily {
            code: "78",
            name: "Phalanges",
            rules: FamilyRules::PhalanxLongBone {
                by_segment: long_bone_segments(),
            },
            qualifications: vec![],
        },
    );

    families.insert(
        "79".to_string(),
        BoneFamily {
            code: "79",
            name: "Crush or multiple fractures",
            rules: FamilyRules::CrushMultiple,
            qualifications: vec![],
        },
    );

    Taxonomy { families }
}

impl Taxonomy {
    /// Look up a bone family by its two-digit code
    pub fn family(&self, code: &str) -> Option<&BoneFamily> {
        self.families.get(code)
    }

    /// The family a concrete bone classifies under
    pub fn family_for_bone(&self, bone: BoneId) -> Option<&BoneFamily> {
        self.family(bone.family_code())
    }

    /// Selectable carpal bones, ordered by family code
    pub fn carpal_bones(&self) -> Vec<BoneId> {
        [
            BoneId::Lunate,
            BoneId::Scaphoid,
            BoneId::Capitate,
            BoneId::Hamate,
            BoneId::Trapezium,
            BoneId::Pisiform,
            BoneId::Triquetrum,
            BoneId::Trapezoid,
        ]
        .into_iter()
        .filter(|b| self.family(b.family_code()).is_some())
        .collect()
    }

    /// All families ordered by code, for listings
    pub fn families_ordered(&self) -> Vec<&BoneFamily> {
        let mut families: Vec<_> = self.families.values().collect();
        families.sort_by_key(|f| f.code);
        families
    }

    /// Validate the taxonomy for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (code, family) in &self.families {
            if code != family.code {
                errors.push(format!(
                    "Family key '{}' doesn't match family.code '{}'",
                    code, family.code
                ));
            }
            if family.code.len() != 2 || !family.code.chars().all(|c| c.is_ascii_digit()) {
                errors.push(format!("Family '{}' code is not two digits", family.code));
            }
            if family.name.is_empty() {
                errors.push(format!("Family '{}' has empty name", family.code));
            }

            match &family.rules {
                FamilyRules::CarpalSingle { types } => {
                    check_type_table(&mut errors, family.code, types);
                }
                FamilyRules::CarpalSubBones { sub_bones } => {
                    if sub_bones.is_empty() {
                        errors.push(format!("Family '{}' has no sub-bones", family.code));
                    }
                    for sub in sub_bones {
                        if sub.id.is_empty() || sub.name.is_empty() {
                            errors.push(format!(
                                "Family '{}' has a sub-bone with empty id or name",
                                family.code
                            ));
                        }
                        check_type_table(&mut errors, family.code, &sub.types);
                    }
                    let mut ids: Vec<_> = sub_bones.iter().map(|s| s.id).collect();
                    ids.sort_unstable();
                    ids.dedup();
                    if ids.len() != sub_bones.len() {
                        errors.push(format!("Family '{}' has duplicate sub-bone ids", family.code));
                    }
                }
                FamilyRules::MetacarpalLongBone { by_segment }
                | FamilyRules::PhalanxLongBone { by_segment } => {
                    for (i, table) in by_segment.iter().enumerate() {
                        if table.is_empty() {
                            errors.push(format!(
                                "Family '{}' segment {} has no types",
                                family.code,
                                i + 1
                            ));
                        }
                        check_type_table(&mut errors, family.code, table);
                    }
                }
                FamilyRules::CrushMultiple => {}
            }

            // Qualifiers are only observed on single-carpal families
            if !family.qualifications.is_empty()
                && !matches!(family.rules, FamilyRules::CarpalSingle { .. })
            {
                errors.push(format!(
                    "Family '{}' declares qualifiers but is not a single carpal",
                    family.code
                ));
            }
            let mut keys: Vec<_> = family.qualifications.iter().map(|q| q.key).collect();
            keys.sort_unstable();
            keys.dedup();
            if keys.len() != family.qualifications.len() {
                errors.push(format!("Family '{}' has duplicate qualifier keys", family.code));
            }
            for qualifier in &family.qualifications {
                if !qualifier.key.is_ascii_lowercase() {
                    errors.push(format!(
                        "Family '{}' qualifier '{}' is not a lowercase letter",
                        family.code, qualifier.key
                    ));
                }
            }
        }

        let crush_count = self
            .families
            .values()
            .filter(|f| matches!(f.rules, FamilyRules::CrushMultiple))
            .count();
        if crush_count != 1 {
            errors.push(format!(
                "Taxonomy has {} crush/multiple families, expected exactly 1",
                crush_count
            ));
        }

        errors
    }
}

fn check_type_table(errors: &mut Vec<String>, code: &str, types: &[TypeEntry]) {
    if types.is_empty() {
        errors.push(format!("Family '{}' has an empty type table", code));
    }
    let mut groups: Vec<_> = types.iter().map(|t| t.group).collect();
    groups.sort_by_key(|g| g.letter());
    groups.dedup();
    if groups.len() != types.len() {
        errors.push(format!("Family '{}' has duplicate type groups", code));
    }
    for entry in types {
        if entry.label.is_empty() {
            errors.push(format!("Family '{}' has a type with an empty label", code));
        }
    }
}
