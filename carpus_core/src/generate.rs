//! Code generation from a selection state.
//!
//! `generate` is pure, total and deterministic: it never panics, returns
//! an empty string while the selection cannot yet produce a code, and
//! returns the literal crush code for crush/multiple selections no matter
//! what else is set.

use crate::types::{BoneCategory, Selection};

/// The fixed code for crush or multiple fractures
pub const CRUSH_CODE: &str = "79";

/// Derive the classification code for the current selection
///
/// Field order is fixed: family code, a dot, the location digits defined
/// for the bone's kind (finger, phalanx, segment), the fracture-type
/// letter, then any qualifier letters. Insufficient selections yield `""`.
pub fn generate(selection: &Selection) -> String {
    let Some(category) = selection.category else {
        return String::new();
    };
    if category == BoneCategory::CrushMultiple {
        return CRUSH_CODE.to_string();
    }

    let Some(bone) = selection.bone else {
        return String::new();
    };
    let Some(group) = selection.fracture_type else {
        return String::new();
    };

    let mut code = String::with_capacity(8);
    code.push_str(bone.family_code());
    code.push('.');

    match category {
        BoneCategory::Metacarpal => {
            let (Some(finger), Some(segment)) = (selection.finger, selection.segment) else {
                return String::new();
            };
            code.push(finger.digit());
            code.push(segment.digit());
        }
        BoneCategory::Phalanx => {
            let (Some(finger), Some(phalanx), Some(segment)) =
                (selection.finger, selection.phalanx, selection.segment)
            else {
                return String::new();
            };
            code.push(finger.digit());
            code.push(phalanx.digit());
            code.push(segment.digit());
        }
        // Carpal codes carry no location digits
        _ => {}
    }

    code.push(group.letter());
    if let Some(qualifiers) = &selection.qualifications {
        for q in qualifiers {
            code.push(*q);
        }
    }

    code
}
