//! Core domain types for the carpus classification system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Anatomical coordinates (bones, fingers, phalanges, segments)
//! - Bone families and their classification rule tables
//! - The transient selection state built up during a classification
//! - Committed fracture entries and the enclosing case record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Anatomical Coordinates
// ============================================================================

/// Top-level bone category, the first question of every classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoneCategory {
    Carpal,
    Metacarpal,
    Phalanx,
    CrushMultiple,
}

impl BoneCategory {
    pub const ALL: [BoneCategory; 4] = [
        BoneCategory::Carpal,
        BoneCategory::Metacarpal,
        BoneCategory::Phalanx,
        BoneCategory::CrushMultiple,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BoneCategory::Carpal => "carpal",
            BoneCategory::Metacarpal => "metacarpal",
            BoneCategory::Phalanx => "phalanx",
            BoneCategory::CrushMultiple => "crush_multiple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BoneCategory::Carpal => "Carpal bone",
            BoneCategory::Metacarpal => "Metacarpal",
            BoneCategory::Phalanx => "Phalanx",
            BoneCategory::CrushMultiple => "Crush or multiple fractures",
        }
    }

    pub fn from_key(key: &str) -> Option<BoneCategory> {
        BoneCategory::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// A concrete selectable bone
///
/// The eight carpal bones are listed individually; metacarpals and
/// phalanges are refined by finger (and phalanx level) rather than by
/// distinct bone entries.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoneId {
    Scaphoid,
    Lunate,
    Capitate,
    Hamate,
    Trapezium,
    Pisiform,
    Triquetrum,
    Trapezoid,
    Metacarpal,
    Phalanx,
    CrushMultiple,
}

impl BoneId {
    pub const ALL: [BoneId; 11] = [
        BoneId::Scaphoid,
        BoneId::Lunate,
        BoneId::Capitate,
        BoneId::Hamate,
        BoneId::Trapezium,
        BoneId::Pisiform,
        BoneId::Triquetrum,
        BoneId::Trapezoid,
        BoneId::Metacarpal,
        BoneId::Phalanx,
        BoneId::CrushMultiple,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BoneId::Scaphoid => "scaphoid",
            BoneId::Lunate => "lunate",
            BoneId::Capitate => "capitate",
            BoneId::Hamate => "hamate",
            BoneId::Trapezium => "trapezium",
            BoneId::Pisiform => "pisiform",
            BoneId::Triquetrum => "triquetrum",
            BoneId::Trapezoid => "trapezoid",
            BoneId::Metacarpal => "metacarpal",
            BoneId::Phalanx => "phalanx",
            BoneId::CrushMultiple => "crush_multiple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BoneId::Scaphoid => "Scaphoid",
            BoneId::Lunate => "Lunate",
            BoneId::Capitate => "Capitate",
            BoneId::Hamate => "Hamate",
            BoneId::Trapezium => "Trapezium",
            BoneId::Pisiform => "Pisiform",
            BoneId::Triquetrum => "Triquetrum",
            BoneId::Trapezoid => "Trapezoid",
            BoneId::Metacarpal => "Metacarpal",
            BoneId::Phalanx => "Phalanx",
            BoneId::CrushMultiple => "Crush or multiple fractures",
        }
    }

    pub fn category(&self) -> BoneCategory {
        match self {
            BoneId::Scaphoid
            | BoneId::Lunate
            | BoneId::Capitate
            | BoneId::Hamate
            | BoneId::Trapezium
            | BoneId::Pisiform
            | BoneId::Triquetrum
            | BoneId::Trapezoid => BoneCategory::Carpal,
            BoneId::Metacarpal => BoneCategory::Metacarpal,
            BoneId::Phalanx => BoneCategory::Phalanx,
            BoneId::CrushMultiple => BoneCategory::CrushMultiple,
        }
    }

    /// Two-digit family code this bone classifies under
    pub fn family_code(&self) -> &'static str {
        match self {
            BoneId::Lunate => "71",
            BoneId::Scaphoid => "72",
            BoneId::Capitate => "73",
            BoneId::Hamate => "74",
            BoneId::Trapezium => "75",
            BoneId::Pisiform | BoneId::Triquetrum | BoneId::Trapezoid => "76",
            BoneId::Metacarpal => "77",
            BoneId::Phalanx => "78",
            BoneId::CrushMultiple => "79",
        }
    }

    /// Sub-bone id within a shared family, set only for the family-76 carpals
    pub fn sub_bone_id(&self) -> Option<&'static str> {
        match self {
            BoneId::Pisiform => Some("pisiform"),
            BoneId::Triquetrum => Some("triquetrum"),
            BoneId::Trapezoid => Some("trapezoid"),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<BoneId> {
        BoneId::ALL.into_iter().find(|b| b.key() == key)
    }
}

/// Finger ray, numbered radially from the thumb
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];

    pub fn digit(&self) -> char {
        match self {
            Finger::Thumb => '1',
            Finger::Index => '2',
            Finger::Middle => '3',
            Finger::Ring => '4',
            Finger::Little => '5',
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index finger",
            Finger::Middle => "Middle finger",
            Finger::Ring => "Ring finger",
            Finger::Little => "Little finger",
        }
    }

    pub fn from_digit(digit: char) -> Option<Finger> {
        Finger::ALL.into_iter().find(|f| f.digit() == digit)
    }
}

/// Phalanx level within a finger
///
/// The thumb has no middle phalanx.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhalanxLevel {
    Proximal,
    Middle,
    Distal,
}

impl PhalanxLevel {
    pub const ALL: [PhalanxLevel; 3] = [
        PhalanxLevel::Proximal,
        PhalanxLevel::Middle,
        PhalanxLevel::Distal,
    ];

    pub fn digit(&self) -> char {
        match self {
            PhalanxLevel::Proximal => '1',
            PhalanxLevel::Middle => '2',
            PhalanxLevel::Distal => '3',
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PhalanxLevel::Proximal => "Proximal phalanx",
            PhalanxLevel::Middle => "Middle phalanx",
            PhalanxLevel::Distal => "Distal phalanx",
        }
    }

    pub fn from_digit(digit: char) -> Option<PhalanxLevel> {
        PhalanxLevel::ALL.into_iter().find(|p| p.digit() == digit)
    }
}

/// Long-bone segment in which the fracture lies
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Base,
    Shaft,
    Head,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Base, Segment::Shaft, Segment::Head];

    pub fn digit(&self) -> char {
        match self {
            Segment::Base => '1',
            Segment::Shaft => '2',
            Segment::Head => '3',
        }
    }

    /// Zero-based index into a per-segment rule table
    pub fn index(&self) -> usize {
        match self {
            Segment::Base => 0,
            Segment::Shaft => 1,
            Segment::Head => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Segment::Base => "Base",
            Segment::Shaft => "Shaft",
            Segment::Head => "Head",
        }
    }

    pub fn from_digit(digit: char) -> Option<Segment> {
        Segment::ALL.into_iter().find(|s| s.digit() == digit)
    }
}

/// Fracture morphology group letter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FractureGroup {
    A,
    B,
    C,
}

impl FractureGroup {
    pub const ALL: [FractureGroup; 3] = [FractureGroup::A, FractureGroup::B, FractureGroup::C];

    pub fn letter(&self) -> char {
        match self {
            FractureGroup::A => 'A',
            FractureGroup::B => 'B',
            FractureGroup::C => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<FractureGroup> {
        FractureGroup::ALL.into_iter().find(|g| g.letter() == letter)
    }
}

// ============================================================================
// Bone Families and Rule Tables
// ============================================================================

/// One row of a fracture-type table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeEntry {
    pub group: FractureGroup,
    pub label: &'static str,
}

/// A single-letter location qualifier and its label
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifierEntry {
    pub key: char,
    pub label: &'static str,
}

/// A sub-bone within a shared family code, carrying its own type table
#[derive(Clone, Debug)]
pub struct SubBone {
    pub id: &'static str,
    pub name: &'static str,
    pub types: Vec<TypeEntry>,
}

/// Classification rules for a bone family, one variant per kind
///
/// Each variant carries exactly the fields its kind needs, so "segment
/// required only for long bones" is a property of the type rather than a
/// runtime convention.
#[derive(Clone, Debug)]
pub enum FamilyRules {
    /// A carpal bone with a flat type table
    CarpalSingle { types: Vec<TypeEntry> },
    /// Carpals sharing one family code, each with its own type table
    CarpalSubBones { sub_bones: Vec<SubBone> },
    /// Metacarpals, typed per segment (base, shaft, head)
    MetacarpalLongBone { by_segment: [Vec<TypeEntry>; 3] },
    /// Phalanges, typed per segment (base, shaft, head)
    PhalanxLongBone { by_segment: [Vec<TypeEntry>; 3] },
    /// Crush or multiple fractures, no further questions
    CrushMultiple,
}

/// Context for a type-table lookup
///
/// Supplies the sub-bone for shared-family carpals and the segment for
/// long bones. Lookups return an empty list when the required piece of
/// context is missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypeContext<'a> {
    pub sub_bone: Option<&'a str>,
    pub segment: Option<Segment>,
}

/// One anatomical bone family of the classification scheme
#[derive(Clone, Debug)]
pub struct BoneFamily {
    /// Two-digit family code, unique across the taxonomy
    pub code: &'static str,
    pub name: &'static str,
    pub rules: FamilyRules,
    /// Location qualifiers, empty for every family except the scaphoid
    pub qualifications: Vec<QualifierEntry>,
}

impl BoneFamily {
    pub fn requires_finger(&self) -> bool {
        matches!(
            self.rules,
            FamilyRules::MetacarpalLongBone { .. } | FamilyRules::PhalanxLongBone { .. }
        )
    }

    pub fn requires_phalanx(&self) -> bool {
        matches!(self.rules, FamilyRules::PhalanxLongBone { .. })
    }

    pub fn requires_segment(&self) -> bool {
        self.requires_finger()
    }

    /// Ordered fracture-type options for this family under the given context
    pub fn type_options(&self, ctx: TypeContext<'_>) -> Vec<TypeEntry> {
        match &self.rules {
            FamilyRules::CarpalSingle { types } => types.clone(),
            FamilyRules::CarpalSubBones { sub_bones } => {
                let Some(id) = ctx.sub_bone else {
                    return Vec::new();
                };
                sub_bones
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| s.types.clone())
                    .unwrap_or_default()
            }
            FamilyRules::MetacarpalLongBone { by_segment }
            | FamilyRules::PhalanxLongBone { by_segment } => {
                let Some(segment) = ctx.segment else {
                    return Vec::new();
                };
                by_segment[segment.index()].clone()
            }
            FamilyRules::CrushMultiple => Vec::new(),
        }
    }

    pub fn qualifier(&self, key: char) -> Option<&QualifierEntry> {
        self.qualifications.iter().find(|q| q.key == key)
    }

    /// Whether the qualifier question applies for the chosen type
    ///
    /// Qualifiers refine types B and C only.
    pub fn qualifiers_permitted(&self, group: FractureGroup) -> bool {
        !self.qualifications.is_empty()
            && matches!(group, FractureGroup::B | FractureGroup::C)
    }
}

// ============================================================================
// Selection State
// ============================================================================

/// Dependency-ordered answer positions of a classification
///
/// Each position depends on every position before it. Resetting from a
/// position clears it together with everything after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnswerField {
    Category,
    Bone,
    Finger,
    Phalanx,
    Segment,
    Type,
    Qualifications,
}

/// Transient answer record for one fracture being classified
///
/// Invariant: a field is `None` whenever any field above it in the
/// dependency order is `None`. `qualifications` distinguishes "question
/// not yet asked" (`None`) from "explicitly skipped" (`Some(vec![])`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub category: Option<BoneCategory>,
    pub bone: Option<BoneId>,
    pub finger: Option<Finger>,
    pub phalanx: Option<PhalanxLevel>,
    pub segment: Option<Segment>,
    pub fracture_type: Option<FractureGroup>,
    pub qualifications: Option<Vec<char>>,
}

impl Selection {
    /// Copy of this selection with every field at and below `field` cleared
    pub fn reset_from(&self, field: AnswerField) -> Selection {
        let mut next = self.clone();
        if field <= AnswerField::Category {
            next.category = None;
        }
        if field <= AnswerField::Bone {
            next.bone = None;
        }
        if field <= AnswerField::Finger {
            next.finger = None;
        }
        if field <= AnswerField::Phalanx {
            next.phalanx = None;
        }
        if field <= AnswerField::Segment {
            next.segment = None;
        }
        if field <= AnswerField::Type {
            next.fracture_type = None;
        }
        next.qualifications = None;
        next
    }
}

// ============================================================================
// Committed Entries and Cases
// ============================================================================

/// Decoded classification fields of a committed entry
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct EntryDetails {
    pub family_code: String,
    pub fracture_type: Option<String>,
    pub sub_bone_id: Option<String>,
    pub finger: Option<Finger>,
    pub phalanx: Option<PhalanxLevel>,
    pub segment: Option<Segment>,
    pub qualifications: Option<Vec<char>>,
}

/// One committed, fully classified fracture belonging to a case
///
/// Immutable once created; a correction replaces the entry wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FractureEntry {
    pub id: Uuid,
    pub bone_id: String,
    pub bone_name: String,
    pub ao_code: String,
    pub recorded_at: DateTime<Utc>,
    pub details: EntryDetails,
}

/// The enclosing case: an owned list of committed fracture entries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub fractures: Vec<FractureEntry>,
}

impl CaseRecord {
    pub fn new() -> Self {
        CaseRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            fractures: Vec::new(),
        }
    }
}

impl Default for CaseRecord {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Taxonomy
// ============================================================================

/// The complete bone-family taxonomy, keyed by family code
#[derive(Clone, Debug)]
pub struct Taxonomy {
    pub families: HashMap<String, BoneFamily>,
}
