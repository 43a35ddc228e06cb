//! Structural validation of classification codes.
//!
//! `validate` decodes a code against the taxonomy and reports the first
//! inconsistency it finds. It is pure and total: malformed input yields a
//! `Validation` with a reason, never a panic or an `Err`.

use crate::types::*;

/// Outcome of a code validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Validation {
            valid: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Validation {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Check a classification code for structural consistency
///
/// Grammar: a two-digit family code; for crush/multiple nothing more; for
/// every other family a dot, the location digits the family's kind
/// defines, one fracture-type letter, then optional qualifier letters.
pub fn validate(taxonomy: &Taxonomy, code: &str) -> Validation {
    if !code.is_ascii() {
        return Validation::fail("code must be ASCII");
    }
    if code.len() < 2 {
        return Validation::fail("code is shorter than a family code");
    }

    let (family_code, rest) = code.split_at(2);
    if !family_code.chars().all(|c| c.is_ascii_digit()) {
        return Validation::fail(format!("family code '{}' must be two digits", family_code));
    }
    let Some(family) = taxonomy.family(family_code) else {
        return Validation::fail(format!("unknown family code '{}'", family_code));
    };

    if matches!(family.rules, FamilyRules::CrushMultiple) {
        return if rest.is_empty() {
            Validation::ok()
        } else {
            Validation::fail("crush/multiple code carries no further fields")
        };
    }

    let Some(rest) = rest.strip_prefix('.') else {
        return Validation::fail("expected '.' after the family code");
    };

    let location_len = match &family.rules {
        FamilyRules::CarpalSingle { .. } | FamilyRules::CarpalSubBones { .. } => 0,
        FamilyRules::MetacarpalLongBone { .. } => 2,
        FamilyRules::PhalanxLongBone { .. } => 3,
        FamilyRules::CrushMultiple => 0,
    };
    if rest.len() < location_len + 1 {
        return Validation::fail("code is missing its fracture type");
    }
    let (location, rest) = rest.split_at(location_len);

    let mut segment = None;
    let location_digits: Vec<char> = location.chars().collect();
    match &family.rules {
        FamilyRules::MetacarpalLongBone { .. } => {
            if Finger::from_digit(location_digits[0]).is_none() {
                return Validation::fail(format!("invalid finger digit '{}'", location_digits[0]));
            }
            let Some(seg) = Segment::from_digit(location_digits[1]) else {
                return Validation::fail(format!("invalid segment digit '{}'", location_digits[1]));
            };
            segment = Some(seg);
        }
        FamilyRules::PhalanxLongBone { .. } => {
            let Some(finger) = Finger::from_digit(location_digits[0]) else {
                return Validation::fail(format!("invalid finger digit '{}'", location_digits[0]));
            };
            let Some(level) = PhalanxLevel::from_digit(location_digits[1]) else {
                return Validation::fail(format!("invalid phalanx digit '{}'", location_digits[1]));
            };
            if finger == Finger::Thumb && level == PhalanxLevel::Middle {
                return Validation::fail("the thumb has no middle phalanx");
            }
            let Some(seg) = Segment::from_digit(location_digits[2]) else {
                return Validation::fail(format!("invalid segment digit '{}'", location_digits[2]));
            };
            segment = Some(seg);
        }
        _ => {}
    }

    let mut chars = rest.chars();
    let Some(type_letter) = chars.next() else {
        return Validation::fail("code is missing its fracture type");
    };
    let Some(group) = FractureGroup::from_letter(type_letter) else {
        return Validation::fail(format!("invalid fracture type '{}'", type_letter));
    };
    if !group_defined(family, segment, group) {
        return Validation::fail(format!(
            "type '{}' is not defined for family {}",
            type_letter, family.code
        ));
    }

    let qualifiers: Vec<char> = chars.collect();
    if qualifiers.is_empty() {
        return Validation::ok();
    }
    if family.qualifications.is_empty() {
        return Validation::fail(format!(
            "family {} does not define qualifiers",
            family.code
        ));
    }
    if !family.qualifiers_permitted(group) {
        return Validation::fail(format!(
            "qualifiers are not permitted for type '{}'",
            type_letter
        ));
    }
    let mut seen = Vec::new();
    for q in qualifiers {
        if family.qualifier(q).is_none() {
            return Validation::fail(format!("unknown qualifier '{}'", q));
        }
        if seen.contains(&q) {
            return Validation::fail(format!("duplicate qualifier '{}'", q));
        }
        seen.push(q);
    }

    Validation::ok()
}

/// Whether `group` appears in the type table applicable to this family
///
/// The code does not embed a sub-bone, so for a shared family the type is
/// accepted when any sub-bone's table defines it.
fn group_defined(family: &BoneFamily, segment: Option<Segment>, group: FractureGroup) -> bool {
    match &family.rules {
        FamilyRules::CarpalSingle { types } => types.iter().any(|t| t.group == group),
        FamilyRules::CarpalSubBones { sub_bones } => sub_bones
            .iter()
            .any(|s| s.types.iter().any(|t| t.group == group)),
        FamilyRules::MetacarpalLongBone { by_segment }
        | FamilyRules::PhalanxLongBone { by_segment } => match segment {
            Some(segment) => by_segment[segment.index()].iter().any(|t| t.group == group),
            None => false,
        },
        FamilyRules::CrushMultiple => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{generate, CRUSH_CODE};
    use crate::taxonomy::build_default_taxonomy;

    #[test]
    fn test_crush_code_is_valid() {
        let taxonomy = build_default_taxonomy();
        assert!(validate(&taxonomy, CRUSH_CODE).valid);
        assert!(!validate(&taxonomy, "79.A").valid);
        assert!(!validate(&taxonomy, "79x").valid);
    }

    #[test]
    fn test_well_formed_codes() {
        let taxonomy = build_default_taxonomy();
        for code in ["72.B", "72.Bb", "72.Cac", "71.A", "76.C", "77.22A", "78.213C"] {
            let verdict = validate(&taxonomy, code);
            assert!(verdict.valid, "{} rejected: {:?}", code, verdict.reason);
        }
    }

    #[test]
    fn test_malformed_codes() {
        let taxonomy = build_default_taxonomy();
        let cases = [
            ("", "too short"),
            ("7", "too short"),
            ("99.A", "unknown family"),
            ("xx.A", "non-digit family"),
            ("72B", "missing dot"),
            ("72.", "missing type"),
            ("72.D", "unknown type"),
            ("77.22", "missing type after location"),
            ("77.62A", "finger out of range"),
            ("77.24A", "segment out of range"),
            ("78.21A", "truncated phalanx location"),
            ("78.220B", "segment digit zero"),
        ];
        for (code, why) in cases {
            let verdict = validate(&taxonomy, code);
            assert!(!verdict.valid, "{} accepted but is {}", code, why);
            assert!(verdict.reason.is_some());
        }
    }

    #[test]
    fn test_thumb_middle_phalanx_rejected() {
        let taxonomy = build_default_taxonomy();
        let verdict = validate(&taxonomy, "78.121A");
        assert!(!verdict.valid);
        assert!(verdict.reason.unwrap().contains("thumb"));

        // The same level is fine on any other finger
        assert!(validate(&taxonomy, "78.221A").valid);
    }

    #[test]
    fn test_qualifier_rules() {
        let taxonomy = build_default_taxonomy();

        // Only the scaphoid declares qualifiers
        assert!(!validate(&taxonomy, "71.Bb").valid);
        // Qualifiers need type B or C
        assert!(!validate(&taxonomy, "72.Ab").valid);
        // Unknown and duplicate qualifier letters
        assert!(!validate(&taxonomy, "72.Bz").valid);
        assert!(!validate(&taxonomy, "72.Bbb").valid);
    }

    #[test]
    fn test_validate_is_deterministic() {
        let taxonomy = build_default_taxonomy();
        for code in ["72.Bb", "79", "nonsense"] {
            assert_eq!(validate(&taxonomy, code), validate(&taxonomy, code));
        }
    }

    /// Every code the generator can produce from a complete, legal
    /// selection must validate.
    #[test]
    fn test_generated_codes_round_trip() {
        let taxonomy = build_default_taxonomy();
        let mut checked = 0usize;

        for bone in BoneId::ALL {
            let family = taxonomy.family_for_bone(bone).unwrap();
            let base = Selection {
                category: Some(bone.category()),
                bone: Some(bone),
                ..Default::default()
            };

            match bone.category() {
                BoneCategory::CrushMultiple => {
                    let verdict = validate(&taxonomy, &generate(&base));
                    assert!(verdict.valid, "{:?}", verdict.reason);
                    checked += 1;
                }
                BoneCategory::Carpal => {
                    let options = family.type_options(TypeContext {
                        sub_bone: bone.sub_bone_id(),
                        ..Default::default()
                    });
                    assert!(!options.is_empty());
                    for entry in options {
                        let mut selection = base.clone();
                        selection.fracture_type = Some(entry.group);

                        let mut qualifier_sets = vec![Some(vec![]), None];
                        if family.qualifiers_permitted(entry.group) {
                            for q in &family.qualifications {
                                qualifier_sets.push(Some(vec![q.key]));
                            }
                        }
                        for qualifiers in qualifier_sets {
                            selection.qualifications = qualifiers;
                            let code = generate(&selection);
                            let verdict = validate(&taxonomy, &code);
                            assert!(
                                verdict.valid,
                                "{} rejected: {:?}",
                                code, verdict.reason
                            );
                            checked += 1;
                        }
                    }
                }
                BoneCategory::Metacarpal | BoneCategory::Phalanx => {
                    let levels: &[Option<PhalanxLevel>] =
                        if bone.category() == BoneCategory::Phalanx {
                            &[
                                Some(PhalanxLevel::Proximal),
                                Some(PhalanxLevel::Middle),
                                Some(PhalanxLevel::Distal),
                            ]
                        } else {
                            &[None]
                        };
                    for finger in Finger::ALL {
                        for level in levels {
                            if finger == Finger::Thumb && *level == Some(PhalanxLevel::Middle) {
                                continue;
                            }
                            for segment in Segment::ALL {
                                let options = family.type_options(TypeContext {
                                    segment: Some(segment),
                                    ..Default::default()
                                });
                                assert!(!options.is_empty());
                                for entry in options {
                                    let mut selection = base.clone();
                                    selection.finger = Some(finger);
                                    selection.phalanx = *level;
                                    selection.segment = Some(segment);
                                    selection.fracture_type = Some(entry.group);
                                    let code = generate(&selection);
                                    let verdict = validate(&taxonomy, &code);
                                    assert!(
                                        verdict.valid,
                                        "{} rejected: {:?}",
                                        code, verdict.reason
                                    );
                                    checked += 1;
                                }
                            }
                        }
                    }
                }
            }
        }

        // 1 crush + 8 carpals with at least 2 variants each + the long bones
        assert!(checked > 100, "only {} combinations checked", checked);
    }
}
