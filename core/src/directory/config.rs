//! Directory index configuration

use super::fuzzy::FuzzyOptions;
use super::{ALTERNATE_NAMES_FIELD, NAME_FIELD};

/// An alternate-key index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlternateKey {
    pub field: &'static str,
    /// Reject inserts whose value is already indexed under this field
    pub unique: bool,
}

/// A field searched by fuzzy lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextField {
    pub field: &'static str,
    /// Multiplier in (0, 1] applied to matches on this field
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    pub alternate_keys: Vec<AlternateKey>,
    pub text_fields: Vec<TextField>,
    pub fuzzy: FuzzyOptions,
}

impl DirectoryConfig {
    /// Primary name plus non-unique alternate names, names weighted above
    /// alternates in fuzzy search.
    pub fn with_alternate_names(fuzzy: FuzzyOptions) -> Self {
        Self {
            alternate_keys: vec![AlternateKey {
                field: ALTERNATE_NAMES_FIELD,
                unique: false,
            }],
            text_fields: vec![
                TextField {
                    field: NAME_FIELD,
                    weight: 1.0,
                },
                TextField {
                    field: ALTERNATE_NAMES_FIELD,
                    weight: 0.8,
                },
            ],
            fuzzy,
        }
    }

    pub fn alternate_key(&self, field: &str) -> Option<&AlternateKey> {
        self.alternate_keys.iter().find(|k| k.field == field)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::with_alternate_names(FuzzyOptions::default())
    }
}
