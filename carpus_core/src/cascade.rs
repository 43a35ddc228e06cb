//! The classification cascade: an explicit state machine over the ordered
//! questions a clinician answers to reach a valid code.
//!
//! The current step is derived from the selection and the chosen bone's
//! family on every call; there is no history stack. Answering a question
//! clears everything strictly downstream of it, and events that do not
//! apply to the current selection leave it unchanged.

use crate::generate::generate;
use crate::types::*;
use chrono::Utc;
use uuid::Uuid;

/// A question of the cascade
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    BoneSelect,
    FingerSelect,
    PhalanxSelect,
    SegmentSelect,
    TypeSelect,
    QualificationSelect,
    Review,
}

/// An answer (or navigation request) fed to the cascade
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SelectCategory(BoneCategory),
    SelectBone(BoneId),
    SelectFinger(Finger),
    SelectPhalanx(PhalanxLevel),
    SelectSegment(Segment),
    SelectType(FractureGroup),
    SetQualifications(Vec<char>),
    SkipQualifications,
    Back,
}

/// One selectable option at a step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub key: String,
    pub label: String,
}

impl Choice {
    fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Choice {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// The next question and the options offered for it
#[derive(Clone, Debug)]
pub struct Prompt {
    pub step: Step,
    pub options: Vec<Choice>,
}

/// Derive the current step from the selection
///
/// Crush/multiple short-circuits straight to review. Review is only
/// derivable once every field the bone's kind requires is populated.
pub fn derive_step(taxonomy: &Taxonomy, selection: &Selection) -> Step {
    let Some(category) = selection.category else {
        return Step::BoneSelect;
    };
    if category == BoneCategory::CrushMultiple {
        return Step::Review;
    }
    let Some(bone) = selection.bone else {
        return Step::BoneSelect;
    };
    let Some(family) = taxonomy.family_for_bone(bone) else {
        return Step::BoneSelect;
    };

    if family.requires_finger() && selection.finger.is_none() {
        return Step::FingerSelect;
    }
    if family.requires_phalanx() && selection.phalanx.is_none() {
        return Step::PhalanxSelect;
    }
    if family.requires_segment() && selection.segment.is_none() {
        return Step::SegmentSelect;
    }
    let Some(group) = selection.fracture_type else {
        return Step::TypeSelect;
    };
    if family.qualifiers_permitted(group) && selection.qualifications.is_none() {
        return Step::QualificationSelect;
    }
    Step::Review
}

/// The current step together with the options offered at it
pub fn next_step(taxonomy: &Taxonomy, selection: &Selection) -> Prompt {
    let step = derive_step(taxonomy, selection);
    let options = match step {
        Step::BoneSelect => {
            if selection.category.is_none() {
                BoneCategory::ALL
                    .iter()
                    .map(|c| Choice::new(c.key(), c.display_name()))
                    .collect()
            } else {
                taxonomy
                    .carpal_bones()
                    .into_iter()
                    .map(|b| Choice::new(b.key(), b.display_name()))
                    .collect()
            }
        }
        Step::FingerSelect => Finger::ALL
            .iter()
            .map(|f| Choice::new(f.digit(), f.display_name()))
            .collect(),
        Step::PhalanxSelect => PhalanxLevel::ALL
            .iter()
            .filter(|p| !(selection.finger == Some(Finger::Thumb) && **p == PhalanxLevel::Middle))
            .map(|p| Choice::new(p.digit(), p.display_name()))
            .collect(),
        Step::SegmentSelect => Segment::ALL
            .iter()
            .map(|s| Choice::new(s.digit(), s.display_name()))
            .collect(),
        Step::TypeSelect => type_choices(taxonomy, selection),
        Step::QualificationSelect => {
            let mut options: Vec<Choice> = selection
                .bone
                .and_then(|b| taxonomy.family_for_bone(b))
                .map(|family| {
                    family
                        .qualifications
                        .iter()
                        .map(|q| Choice::new(q.key, q.label))
                        .collect()
                })
                .unwrap_or_default();
            options.push(Choice::new("skip", "No qualifier"));
            options
        }
        Step::Review => Vec::new(),
    };

    Prompt { step, options }
}

fn type_choices(taxonomy: &Taxonomy, selection: &Selection) -> Vec<Choice> {
    let Some(bone) = selection.bone else {
        return Vec::new();
    };
    let Some(family) = taxonomy.family_for_bone(bone) else {
        return Vec::new();
    };
    family
        .type_options(TypeContext {
            sub_bone: bone.sub_bone_id(),
            segment: selection.segment,
        })
        .into_iter()
        .map(|t| Choice::new(t.group.letter(), t.label))
        .collect()
}

/// Pure transition function of the cascade
///
/// Events that are not applicable to the current selection (a segment for
/// a carpal bone, a qualifier where none is permitted) return the
/// selection unchanged; they are never offered, so there is nothing to
/// reject.
pub fn apply(taxonomy: &Taxonomy, selection: &Selection, event: Event) -> Selection {
    match event {
        Event::SelectCategory(category) => {
            let mut next = selection.reset_from(AnswerField::Category);
            next.category = Some(category);
            // Single-bone categories resolve the bone immediately
            next.bone = match category {
                BoneCategory::Carpal => None,
                BoneCategory::Metacarpal => Some(BoneId::Metacarpal),
                BoneCategory::Phalanx => Some(BoneId::Phalanx),
                BoneCategory::CrushMultiple => Some(BoneId::CrushMultiple),
            };
            tracing::debug!(category = category.key(), "category selected");
            next
        }
        Event::SelectBone(bone) => {
            if selection.category != Some(bone.category()) {
                return selection.clone();
            }
            let mut next = selection.reset_from(AnswerField::Bone);
            next.bone = Some(bone);
            tracing::debug!(bone = bone.key(), "bone selected");
            next
        }
        Event::SelectFinger(finger) => {
            if !requires(taxonomy, selection, BoneFamily::requires_finger) {
                return selection.clone();
            }
            let mut next = selection.reset_from(AnswerField::Finger);
            next.finger = Some(finger);
            next
        }
        Event::SelectPhalanx(level) => {
            if !requires(taxonomy, selection, BoneFamily::requires_phalanx) {
                return selection.clone();
            }
            if selection.finger == Some(Finger::Thumb) && level == PhalanxLevel::Middle {
                return selection.clone();
            }
            let mut next = selection.reset_from(AnswerField::Phalanx);
            next.phalanx = Some(level);
            next
        }
        Event::SelectSegment(segment) => {
            if !requires(taxonomy, selection, BoneFamily::requires_segment) {
                return selection.clone();
            }
            let mut next = selection.reset_from(AnswerField::Segment);
            next.segment = Some(segment);
            next
        }
        Event::SelectType(group) => {
            if selection.bone.is_none() || selection.category == Some(BoneCategory::CrushMultiple)
            {
                return selection.clone();
            }
            let mut next = selection.reset_from(AnswerField::Type);
            next.fracture_type = Some(group);
            next
        }
        Event::SetQualifications(qualifiers) => {
            if !qualifiers_applicable(taxonomy, selection) {
                return selection.clone();
            }
            let mut next = selection.clone();
            next.qualifications = Some(qualifiers);
            next
        }
        Event::SkipQualifications => {
            if !qualifiers_applicable(taxonomy, selection) {
                return selection.clone();
            }
            let mut next = selection.clone();
            next.qualifications = Some(Vec::new());
            next
        }
        Event::Back => back(taxonomy, selection),
    }
}

fn requires(
    taxonomy: &Taxonomy,
    selection: &Selection,
    predicate: impl Fn(&BoneFamily) -> bool,
) -> bool {
    selection
        .bone
        .and_then(|b| taxonomy.family_for_bone(b))
        .map(predicate)
        .unwrap_or(false)
}

fn qualifiers_applicable(taxonomy: &Taxonomy, selection: &Selection) -> bool {
    let (Some(bone), Some(group)) = (selection.bone, selection.fracture_type) else {
        return false;
    };
    taxonomy
        .family_for_bone(bone)
        .map(|f| f.qualifiers_permitted(group))
        .unwrap_or(false)
}

/// Step backward by clearing the answer of the previous question
///
/// The previous question is re-derived from the bone's kind and the
/// answers given so far.
fn back(taxonomy: &Taxonomy, selection: &Selection) -> Selection {
    let family = selection.bone.and_then(|b| taxonomy.family_for_bone(b));
    match derive_step(taxonomy, selection) {
        Step::BoneSelect => {
            // Carpal bone list goes back to the category question;
            // the category question is the start.
            if selection.category.is_some() {
                selection.reset_from(AnswerField::Category)
            } else {
                selection.clone()
            }
        }
        Step::FingerSelect => selection.reset_from(AnswerField::Category),
        Step::PhalanxSelect => selection.reset_from(AnswerField::Finger),
        Step::SegmentSelect => {
            if family.map(BoneFamily::requires_phalanx).unwrap_or(false) {
                selection.reset_from(AnswerField::Phalanx)
            } else {
                selection.reset_from(AnswerField::Finger)
            }
        }
        Step::TypeSelect => {
            if family.map(BoneFamily::requires_segment).unwrap_or(false) {
                selection.reset_from(AnswerField::Segment)
            } else if selection.category == Some(BoneCategory::Carpal) {
                selection.reset_from(AnswerField::Bone)
            } else {
                selection.reset_from(AnswerField::Category)
            }
        }
        Step::QualificationSelect => selection.reset_from(AnswerField::Type),
        Step::Review => {
            if selection.category == Some(BoneCategory::CrushMultiple) {
                selection.reset_from(AnswerField::Category)
            } else if selection.qualifications.is_some()
                && qualifiers_applicable(taxonomy, selection)
            {
                let mut next = selection.clone();
                next.qualifications = None;
                next
            } else {
                selection.reset_from(AnswerField::Type)
            }
        }
    }
}

// ============================================================================
// Capture Session
// ============================================================================

/// An in-progress classification session for one case
///
/// Owns the transient selection and the list of committed entries, which
/// may be seeded from a case's prior classifications for resume.
#[derive(Clone, Debug, Default)]
pub struct CaptureSession {
    selection: Selection,
    entries: Vec<FractureEntry>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<FractureEntry>) -> Self {
        CaptureSession {
            selection: Selection::default(),
            entries,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn entries(&self) -> &[FractureEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FractureEntry> {
        self.entries
    }

    pub fn next_step(&self, taxonomy: &Taxonomy) -> Prompt {
        next_step(taxonomy, &self.selection)
    }

    pub fn apply(&mut self, taxonomy: &Taxonomy, event: Event) {
        self.selection = apply(taxonomy, &self.selection, event);
    }

    /// Live code preview for the current selection
    pub fn preview(&self) -> String {
        generate(&self.selection)
    }

    /// Commit the current selection as a fracture entry
    ///
    /// Returns `None` unless the cascade has reached review. On success
    /// the selection resets so the next fracture starts at bone select.
    pub fn commit(&mut self, taxonomy: &Taxonomy) -> Option<FractureEntry> {
        if derive_step(taxonomy, &self.selection) != Step::Review {
            tracing::debug!("commit requested before review; ignoring");
            return None;
        }
        let bone = self.selection.bone?;

        let entry = FractureEntry {
            id: Uuid::new_v4(),
            bone_id: bone.key().to_string(),
            bone_name: bone.display_name().to_string(),
            ao_code: generate(&self.selection),
            recorded_at: Utc::now(),
            details: EntryDetails {
                family_code: bone.family_code().to_string(),
                fracture_type: self.selection.fracture_type.map(|g| g.letter().to_string()),
                sub_bone_id: bone.sub_bone_id().map(str::to_string),
                finger: self.selection.finger,
                phalanx: self.selection.phalanx,
                segment: self.selection.segment,
                qualifications: self
                    .selection
                    .qualifications
                    .clone()
                    .filter(|q| !q.is_empty()),
            },
        };

        tracing::info!(code = %entry.ao_code, bone = %entry.bone_id, "fracture committed");
        self.entries.push(entry.clone());
        self.selection = Selection::default();
        Some(entry)
    }

    /// Drop the in-progress selection without committing it
    pub fn discard(&mut self) {
        tracing::debug!("selection discarded");
        self.selection = Selection::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::build_default_taxonomy;
    use crate::validate::validate;

    fn answered(taxonomy: &Taxonomy, events: &[Event]) -> Selection {
        let mut selection = Selection::default();
        for event in events {
            selection = apply(taxonomy, &selection, event.clone());
        }
        selection
    }

    #[test]
    fn test_initial_step_offers_categories() {
        let taxonomy = build_default_taxonomy();
        let prompt = next_step(&taxonomy, &Selection::default());
        assert_eq!(prompt.step, Step::BoneSelect);
        let keys: Vec<_> = prompt.options.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["carpal", "metacarpal", "phalanx", "crush_multiple"]);
    }

    #[test]
    fn test_carpal_flow_reaches_review() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Lunate),
                Event::SelectType(FractureGroup::A),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
        assert_eq!(generate(&selection), "71.A");
    }

    #[test]
    fn test_crush_short_circuits_to_review() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[Event::SelectCategory(BoneCategory::CrushMultiple)],
        );
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
        assert_eq!(generate(&selection), "79");
    }

    #[test]
    fn test_scaphoid_qualifier_step() {
        let taxonomy = build_default_taxonomy();
        let mut selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Scaphoid),
                Event::SelectType(FractureGroup::B),
            ],
        );
        let prompt = next_step(&taxonomy, &selection);
        assert_eq!(prompt.step, Step::QualificationSelect);
        let keys: Vec<_> = prompt.options.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "skip"]);

        // Waist qualifier produces a valid code
        selection = apply(&taxonomy, &selection, Event::SetQualifications(vec!['b']));
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
        let code = generate(&selection);
        assert_eq!(code, "72.Bb");
        assert!(validate(&taxonomy, &code).valid);
    }

    #[test]
    fn test_scaphoid_qualifier_is_optional() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Scaphoid),
                Event::SelectType(FractureGroup::C),
                Event::SkipQualifications,
            ],
        );
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
        let code = generate(&selection);
        assert_eq!(code, "72.C");
        assert!(validate(&taxonomy, &code).valid);
    }

    #[test]
    fn test_type_a_scaphoid_skips_qualifier_step() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Scaphoid),
                Event::SelectType(FractureGroup::A),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
    }

    #[test]
    fn test_metacarpal_shaft_offers_shaft_types() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Metacarpal),
                Event::SelectFinger(Finger::Index),
                Event::SelectSegment(Segment::Shaft),
            ],
        );
        let prompt = next_step(&taxonomy, &selection);
        assert_eq!(prompt.step, Step::TypeSelect);

        let expected: Vec<Choice> = taxonomy
            .family("77")
            .unwrap()
            .type_options(TypeContext {
                segment: Some(Segment::Shaft),
                ..Default::default()
            })
            .into_iter()
            .map(|t| Choice::new(t.group.letter(), t.label))
            .collect();
        assert_eq!(prompt.options, expected);
        assert_eq!(prompt.options[1].label, "Wedge fracture");
    }

    #[test]
    fn test_thumb_has_no_middle_phalanx_option() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Phalanx),
                Event::SelectFinger(Finger::Thumb),
            ],
        );
        let prompt = next_step(&taxonomy, &selection);
        assert_eq!(prompt.step, Step::PhalanxSelect);
        let keys: Vec<_> = prompt.options.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "3"]);

        // Applying the excluded level anyway is a no-op
        let unchanged = apply(
            &taxonomy,
            &selection,
            Event::SelectPhalanx(PhalanxLevel::Middle),
        );
        assert_eq!(unchanged, selection);

        // Other fingers keep all three levels
        let index = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Phalanx),
                Event::SelectFinger(Finger::Index),
            ],
        );
        assert_eq!(next_step(&taxonomy, &index).options.len(), 3);
    }

    #[test]
    fn test_changing_upstream_answer_resets_downstream() {
        let taxonomy = build_default_taxonomy();
        let complete = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Metacarpal),
                Event::SelectFinger(Finger::Index),
                Event::SelectSegment(Segment::Shaft),
                Event::SelectType(FractureGroup::A),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &complete), Step::Review);

        let changed = apply(&taxonomy, &complete, Event::SelectFinger(Finger::Ring));
        assert_eq!(changed.finger, Some(Finger::Ring));
        assert_eq!(changed.segment, None);
        assert_eq!(changed.fracture_type, None);
        // The step immediately after the changed answer comes next
        assert_eq!(derive_step(&taxonomy, &changed), Step::SegmentSelect);
    }

    #[test]
    fn test_illegal_events_are_no_ops() {
        let taxonomy = build_default_taxonomy();
        let carpal = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Capitate),
            ],
        );
        // Segments and fingers do not exist for carpal bones
        assert_eq!(
            apply(&taxonomy, &carpal, Event::SelectSegment(Segment::Shaft)),
            carpal
        );
        assert_eq!(
            apply(&taxonomy, &carpal, Event::SelectFinger(Finger::Index)),
            carpal
        );
        // A carpal bone cannot be picked while the category is metacarpal
        let metacarpal = answered(
            &taxonomy,
            &[Event::SelectCategory(BoneCategory::Metacarpal)],
        );
        assert_eq!(
            apply(&taxonomy, &metacarpal, Event::SelectBone(BoneId::Scaphoid)),
            metacarpal
        );
        // Qualifiers only exist on the scaphoid with type B or C
        let lunate = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Lunate),
                Event::SelectType(FractureGroup::B),
            ],
        );
        assert_eq!(
            apply(&taxonomy, &lunate, Event::SetQualifications(vec!['b'])),
            lunate
        );
    }

    #[test]
    fn test_back_from_type_select() {
        let taxonomy = build_default_taxonomy();

        // With segments: back lands on segment select
        let metacarpal = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Metacarpal),
                Event::SelectFinger(Finger::Index),
                Event::SelectSegment(Segment::Shaft),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &metacarpal), Step::TypeSelect);
        let stepped = apply(&taxonomy, &metacarpal, Event::Back);
        assert_eq!(derive_step(&taxonomy, &stepped), Step::SegmentSelect);
        assert_eq!(stepped.finger, Some(Finger::Index));

        // Without segments: back lands on the carpal bone list
        let carpal = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Hamate),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &carpal), Step::TypeSelect);
        let stepped = apply(&taxonomy, &carpal, Event::Back);
        assert_eq!(derive_step(&taxonomy, &stepped), Step::BoneSelect);
        assert_eq!(stepped.category, Some(BoneCategory::Carpal));
        assert_eq!(stepped.bone, None);
    }

    #[test]
    fn test_back_from_review_reopens_qualifier_step() {
        let taxonomy = build_default_taxonomy();
        let selection = answered(
            &taxonomy,
            &[
                Event::SelectCategory(BoneCategory::Carpal),
                Event::SelectBone(BoneId::Scaphoid),
                Event::SelectType(FractureGroup::B),
                Event::SetQualifications(vec!['a']),
            ],
        );
        assert_eq!(derive_step(&taxonomy, &selection), Step::Review);
        let stepped = apply(&taxonomy, &selection, Event::Back);
        assert_eq!(derive_step(&taxonomy, &stepped), Step::QualificationSelect);
        assert_eq!(stepped.fracture_type, Some(FractureGroup::B));
    }

    #[test]
    fn test_commit_resets_to_bone_select() {
        let taxonomy = build_default_taxonomy();
        let mut session = CaptureSession::new();
        for event in [
            Event::SelectCategory(BoneCategory::Carpal),
            Event::SelectBone(BoneId::Scaphoid),
            Event::SelectType(FractureGroup::B),
            Event::SetQualifications(vec!['b']),
        ] {
            session.apply(&taxonomy, event);
        }
        let entry = session.commit(&taxonomy).expect("commit at review");
        assert_eq!(entry.ao_code, "72.Bb");
        assert_eq!(entry.details.family_code, "72");
        assert_eq!(entry.details.qualifications, Some(vec!['b']));

        // Fresh classification, independent of the committed entry
        assert_eq!(session.entries().len(), 1);
        assert_eq!(*session.selection(), Selection::default());
        assert_eq!(session.next_step(&taxonomy).step, Step::BoneSelect);
    }

    #[test]
    fn test_commit_before_review_is_refused() {
        let taxonomy = build_default_taxonomy();
        let mut session = CaptureSession::new();
        session.apply(&taxonomy, Event::SelectCategory(BoneCategory::Carpal));
        assert!(session.commit(&taxonomy).is_none());
        assert!(session.entries().is_empty());
    }

    #[test]
    fn test_discard_drops_selection_but_keeps_entries() {
        let taxonomy = build_default_taxonomy();
        let mut session = CaptureSession::new();
        for event in [
            Event::SelectCategory(BoneCategory::CrushMultiple),
        ] {
            session.apply(&taxonomy, event);
        }
        session.commit(&taxonomy);
        session.apply(&taxonomy, Event::SelectCategory(BoneCategory::Carpal));
        session.discard();
        assert_eq!(session.entries().len(), 1);
        assert_eq!(*session.selection(), Selection::default());
    }

    #[test]
    fn test_session_seeded_with_prior_entries() {
        let taxonomy = build_default_taxonomy();
        let mut first = CaptureSession::new();
        first.apply(&taxonomy, Event::SelectCategory(BoneCategory::CrushMultiple));
        first.commit(&taxonomy);
        let prior = first.into_entries();

        let mut resumed = CaptureSession::with_entries(prior);
        resumed.apply(&taxonomy, Event::SelectCategory(BoneCategory::Carpal));
        resumed.apply(&taxonomy, Event::SelectBone(BoneId::Lunate));
        resumed.apply(&taxonomy, Event::SelectType(FractureGroup::A));
        resumed.commit(&taxonomy);
        assert_eq!(resumed.entries().len(), 2);
    }

    #[test]
    fn test_skipped_qualifier_not_stored_on_entry() {
        let taxonomy = build_default_taxonomy();
        let mut session = CaptureSession::new();
        for event in [
            Event::SelectCategory(BoneCategory::Carpal),
            Event::SelectBone(BoneId::Scaphoid),
            Event::SelectType(FractureGroup::B),
            Event::SkipQualifications,
        ] {
            session.apply(&taxonomy, event);
        }
        let entry = session.commit(&taxonomy).expect("commit at review");
        assert_eq!(entry.ao_code, "72.B");
        assert_eq!(entry.details.qualifications, None);
    }

    #[test]
    fn test_sub_bone_recorded_on_entry() {
        let taxonomy = build_default_taxonomy();
        let mut session = CaptureSession::new();
        for event in [
            Event::SelectCategory(BoneCategory::Carpal),
            Event::SelectBone(BoneId::Triquetrum),
            Event::SelectType(FractureGroup::A),
        ] {
            session.apply(&taxonomy, event);
        }
        let entry = session.commit(&taxonomy).expect("commit at review");
        assert_eq!(entry.ao_code, "76.A");
        assert_eq!(entry.details.sub_bone_id, Some("triquetrum".to_string()));
    }
}
