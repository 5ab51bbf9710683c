//! Generic indexed directory with exact and fuzzy lookup
//!
//! A [`Directory`] holds named items behind `Rc` and indexes them by
//! primary key plus any configured alternate-key fields. Lookup tries an
//! exact match first, falls back to fuzzy text search, then hands the
//! candidates to a [`ResultAdjuster`] supplied by the caller (place
//! categorization, EX filtering, tier filtering, ...).

mod config;
mod engine;
mod fuzzy;

use std::rc::Rc;

use thiserror::Error;

use crate::types::{NameError, NameKey, Named};

pub use config::{AlternateKey, DirectoryConfig, TextField};
pub use engine::Directory;
pub use fuzzy::{FuzzyOptions, similarity};

/// Field name of the primary key
pub const NAME_FIELD: &str = "name";

/// Field name for alternate display names
pub const ALTERNATE_NAMES_FIELD: &str = "alternateNames";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Duplicate key {0}")]
    DuplicateKey(NameKey),

    #[error("Duplicate {field} value {key}")]
    DuplicateAlternateKey { field: &'static str, key: NameKey },

    #[error("Field {0:?} is not configured as a lookup key")]
    UnknownField(String),
}

/// An item that can be stored in a [`Directory`]
pub trait Keyed: Named {
    /// Normalized values of a lookup field.
    ///
    /// The default only knows the primary name field.
    fn field_keys(&self, field: &str) -> &[NameKey] {
        if field == NAME_FIELD {
            std::slice::from_ref(self.key())
        } else {
            &[]
        }
    }
}

/// A lookup result with its score in (0, 1], higher is better
#[derive(Debug)]
pub struct Scored<T> {
    pub item: Rc<T>,
    pub score: f64,
}

impl<T> Scored<T> {
    pub fn new(item: Rc<T>, score: f64) -> Self {
        Self { item, score }
    }

    /// Result of an exact key match
    pub fn exact(item: Rc<T>) -> Self {
        Self::new(item, 1.0)
    }
}

impl<T> Clone for Scored<T> {
    fn clone(&self) -> Self {
        Self {
            item: Rc::clone(&self.item),
            score: self.score,
        }
    }
}

/// Switches for [`Directory::lookup`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupFlags {
    pub no_exact_lookup: bool,
    pub no_text_search: bool,
}

/// Filters and re-ranks lookup candidates before the final sort
pub trait ResultAdjuster<T> {
    fn adjust(&self, candidates: Vec<Scored<T>>) -> Vec<Scored<T>>;
}

/// Leaves candidates untouched
pub struct NoAdjustment;

impl<T> ResultAdjuster<T> for NoAdjustment {
    fn adjust(&self, candidates: Vec<Scored<T>>) -> Vec<Scored<T>> {
        candidates
    }
}

impl<T, F> ResultAdjuster<T> for F
where
    F: Fn(Vec<Scored<T>>) -> Vec<Scored<T>>,
{
    fn adjust(&self, candidates: Vec<Scored<T>>) -> Vec<Scored<T>> {
        self(candidates)
    }
}
