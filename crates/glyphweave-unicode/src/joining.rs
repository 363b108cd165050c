//! Cursive joining forms
//!
//! Arabic-style scripts draw a letter differently depending on whether it
//! connects to its neighbours. The joining type of every character comes from
//! ICU; marks are transparent and never break a connection.

use glyphweave_core::types::Tag;
use icu_properties::props::JoiningType;

/// Contextual form of a joining letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JoiningForm {
    Isolated,
    Initial,
    Medial,
    Final,
}

impl JoiningForm {
    /// The OpenType feature that selects this form
    pub fn feature_tag(self) -> Tag {
        match self {
            JoiningForm::Isolated => Tag::new(b"isol"),
            JoiningForm::Initial => Tag::new(b"init"),
            JoiningForm::Medial => Tag::new(b"medi"),
            JoiningForm::Final => Tag::new(b"fina"),
        }
    }

    /// The form a feature applies to, for the four form features
    pub fn from_feature_tag(tag: Tag) -> Option<Self> {
        match &tag.to_bytes() {
            b"isol" => Some(JoiningForm::Isolated),
            b"init" => Some(JoiningForm::Initial),
            b"medi" => Some(JoiningForm::Medial),
            b"fina" => Some(JoiningForm::Final),
            _ => None,
        }
    }
}

/// How a character takes part in joining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joining {
    Dual,
    Right,
    Left,
    Causing,
    Transparent,
    None,
}

impl Joining {
    pub fn from_icu(joining_type: JoiningType) -> Self {
        match joining_type {
            JoiningType::DualJoining => Joining::Dual,
            JoiningType::RightJoining => Joining::Right,
            JoiningType::LeftJoining => Joining::Left,
            JoiningType::JoinCausing => Joining::Causing,
            JoiningType::Transparent => Joining::Transparent,
            _ => Joining::None,
        }
    }

    /// Connects to the character that follows it in logical order
    fn joins_forward(self) -> bool {
        matches!(self, Joining::Dual | Joining::Left | Joining::Causing)
    }

    /// Connects to the character that precedes it in logical order
    fn joins_backward(self) -> bool {
        matches!(self, Joining::Dual | Joining::Right | Joining::Causing)
    }

    fn has_forms(self) -> bool {
        matches!(self, Joining::Dual | Joining::Right | Joining::Left)
    }
}

/// Contextual form of every character, in logical order
///
/// Characters that never change shape get `None`.
pub fn resolve_forms(joining: &[Joining]) -> Vec<Option<JoiningForm>> {
    let mut forms = vec![None; joining.len()];
    let mut previous: Option<usize> = None;

    for (index, &current) in joining.iter().enumerate() {
        if current == Joining::Transparent {
            continue;
        }

        let joins_previous = previous.is_some_and(|p| joining[p].joins_forward())
            && current.joins_backward();

        if joins_previous {
            if let Some(p) = previous {
                forms[p] = match forms[p] {
                    Some(JoiningForm::Isolated) => Some(JoiningForm::Initial),
                    Some(JoiningForm::Final) => Some(JoiningForm::Medial),
                    other => other,
                };
            }
        }

        if current.has_forms() {
            forms[index] = Some(if joins_previous {
                JoiningForm::Final
            } else {
                JoiningForm::Isolated
            });
        }
        previous = Some(index);
    }

    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    use JoiningForm::*;

    #[test]
    fn three_dual_joiners_connect() {
        let forms = resolve_forms(&[Joining::Dual, Joining::Dual, Joining::Dual]);
        assert_eq!(forms, vec![Some(Initial), Some(Medial), Some(Final)]);
    }

    #[test]
    fn right_joiner_breaks_the_chain() {
        // beh alef beh: alef never connects forward
        let forms = resolve_forms(&[Joining::Dual, Joining::Right, Joining::Dual]);
        assert_eq!(forms, vec![Some(Initial), Some(Final), Some(Isolated)]);
    }

    #[test]
    fn marks_are_transparent() {
        let forms = resolve_forms(&[Joining::Dual, Joining::Transparent, Joining::Dual]);
        assert_eq!(forms, vec![Some(Initial), None, Some(Final)]);
    }

    #[test]
    fn non_joiners_have_no_form() {
        let forms = resolve_forms(&[Joining::None, Joining::Dual, Joining::None]);
        assert_eq!(forms, vec![None, Some(Isolated), None]);
    }

    #[test]
    fn feature_tags_round_trip() {
        for form in [Isolated, Initial, Medial, Final] {
            assert_eq!(JoiningForm::from_feature_tag(form.feature_tag()), Some(form));
        }
        assert_eq!(JoiningForm::from_feature_tag(Tag::new(b"liga")), None);
    }
}
