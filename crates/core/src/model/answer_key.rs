use std::collections::BTreeMap;

use crate::model::{ids::QuestionId, letter::OptionLetter};

/// Mapping from question id to the correct option letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey(BTreeMap<QuestionId, OptionLetter>);

impl AnswerKey {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the correct letter for `id`. Returns the previous letter, if any.
    pub fn set(&mut self, id: QuestionId, letter: OptionLetter) -> Option<OptionLetter> {
        self.0.insert(id, letter)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<OptionLetter> {
        self.0.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, OptionLetter)> {
        self.0.iter().map(|(id, letter)| (id, *letter))
    }
}

impl FromIterator<(QuestionId, OptionLetter)> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = (QuestionId, OptionLetter)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
