//! Semantic buckets a sentence is partitioned into.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::word::Word;

/// The five semantic buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// What is being done.
    AgentAction,
    /// What it is done to.
    Object,
    /// Who does it.
    Subject,
    /// How it is done.
    Manner,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::AgentAction,
        Category::Object,
        Category::Subject,
        Category::Manner,
        Category::Other,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::AgentAction => write!(f, "agent_action"),
            Category::Object => write!(f, "object"),
            Category::Subject => write!(f, "subject"),
            Category::Manner => write!(f, "manner"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// A bucket entry: a main word, optionally qualified by a compound word
/// (for example the adjective in "red lamp").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceObject {
    pub main: Word,
    pub compound: Option<Word>,
}

impl SentenceObject {
    pub fn new(main: Word) -> Self {
        Self {
            main,
            compound: None,
        }
    }

    pub fn compound(main: Word, compound: Word) -> Self {
        Self {
            main,
            compound: Some(compound),
        }
    }
}

/// A sentence partitioned into its semantic buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceObjects {
    pub agent_actions: Vec<SentenceObject>,
    pub objects: Vec<SentenceObject>,
    pub subjects: Vec<SentenceObject>,
    pub manners: Vec<SentenceObject>,
    pub others: Vec<SentenceObject>,
}

impl SentenceObjects {
    pub fn bucket(&self, category: Category) -> &[SentenceObject] {
        match category {
            Category::AgentAction => &self.agent_actions,
            Category::Object => &self.objects,
            Category::Subject => &self.subjects,
            Category::Manner => &self.manners,
            Category::Other => &self.others,
        }
    }

    pub fn push(&mut self, category: Category, object: SentenceObject) {
        match category {
            Category::AgentAction => self.agent_actions.push(object),
            Category::Object => self.objects.push(object),
            Category::Subject => self.subjects.push(object),
            Category::Manner => self.manners.push(object),
            Category::Other => self.others.push(object),
        }
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.bucket(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_bucket_agree() {
        let mut objects = SentenceObjects::default();
        for (i, category) in Category::ALL.iter().enumerate() {
            for n in 0..=i {
                objects.push(*category, SentenceObject::new(Word::unknown(format!("w{n}"))));
            }
        }
        assert_eq!(objects.bucket(Category::AgentAction).len(), 1);
        assert_eq!(objects.bucket(Category::Object).len(), 2);
        assert_eq!(objects.bucket(Category::Subject).len(), 3);
        assert_eq!(objects.bucket(Category::Manner).len(), 4);
        assert_eq!(objects.bucket(Category::Other).len(), 5);
        assert_eq!(objects.len(), 15);
        assert!(!objects.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(SentenceObjects::default().is_empty());
    }

    #[test]
    fn test_compound_object() {
        let object = SentenceObject::compound(Word::unknown("lamp"), Word::unknown("red"));
        assert_eq!(object.compound.as_ref().map(|w| w.typed_form.as_str()), Some("red"));
        assert_eq!(Category::Manner.to_string(), "manner");
    }
}
