//! Ordered keyword groups and the classifier built on them.
//!
//! The utterance is lower-cased and tested against each group in order by
//! substring containment. The first group with any hit wins; overlaps are
//! resolved by group order alone, never by match count or specificity.

use crate::types::Intent;

/// A single intent with the keywords that select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordGroup {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

/// The keyword groups in precedence order.
pub const STANDARD_GROUPS: [KeywordGroup; 7] = [
    KeywordGroup {
        intent: Intent::Emergency,
        keywords: &["emergency", "urgent", "help", "112", "ambulance"],
    },
    KeywordGroup {
        intent: Intent::FindCare,
        keywords: &["doctor", "hospital", "clinic", "provider"],
    },
    KeywordGroup {
        intent: Intent::BookAppointment,
        keywords: &["appointment", "book"],
    },
    KeywordGroup {
        intent: Intent::Telemedicine,
        keywords: &["telemedicine", "video call", "online consultation"],
    },
    KeywordGroup {
        intent: Intent::ViewPolicy,
        keywords: &["policy"],
    },
    KeywordGroup {
        intent: Intent::CheckCoverage,
        keywords: &["coverage", "covered", "insurance"],
    },
    KeywordGroup {
        intent: Intent::SymptomReport,
        keywords: &["pain", "sick", "symptom", "fever"],
    },
];

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    /// The keyword that selected the intent; `None` for fallback.
    pub keyword: Option<&'static str>,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Fallback,
            keyword: None,
        }
    }
}

/// Classifier over an ordered list of keyword groups.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    groups: Vec<KeywordGroup>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    /// Create a classifier with the standard groups.
    pub fn new() -> Self {
        Self::with_groups(STANDARD_GROUPS.to_vec())
    }

    pub fn with_groups(groups: Vec<KeywordGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    /// Classify and report the matching keyword.
    pub fn classify_detailed(&self, utterance: &str) -> Classification {
        match_groups(&self.groups, utterance)
    }

    pub fn classify(&self, utterance: &str) -> Intent {
        self.classify_detailed(utterance).intent
    }
}

/// Classify with the standard groups.
pub fn classify(utterance: &str) -> Intent {
    classify_detailed(utterance).intent
}

/// Classify with the standard groups, reporting the matching keyword.
pub fn classify_detailed(utterance: &str) -> Classification {
    match_groups(&STANDARD_GROUPS, utterance)
}

fn match_groups(groups: &[KeywordGroup], utterance: &str) -> Classification {
    let lowered = utterance.to_lowercase();

    groups
        .iter()
        .find_map(|group| {
            group
                .keywords
                .iter()
                .find(|k| lowered.contains(*k))
                .map(|keyword| Classification {
                    intent: group.intent,
                    keyword: Some(*keyword),
                })
        })
        .unwrap_or_else(Classification::fallback)
}
