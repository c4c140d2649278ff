//! Controlled vocabularies and the three membership predicates.
//!
//! The predicates answer different questions and are not interchangeable:
//! [`exact_match`] is a case-sensitive lookup, [`term_contained_in_value`]
//! finds a known code embedded in free text, and [`value_contained_in_term`]
//! treats the catalog value as an abbreviation of a longer label.

use crate::error::{MqaError, Result};
use crate::types::indicator::MatchMode;
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(path: &Path, field: usize) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, field).map_err(|err| match err {
            MqaError::Csv(source) => MqaError::Vocabulary {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Reads comma-separated records and keeps column `field` of each one.
    ///
    /// One record per line: quote characters are literal text. Rows shorter
    /// than `field + 1` and blank cells are skipped. Header rows are kept as
    /// ordinary terms.
    pub fn from_reader<R: Read>(reader: R, field: usize) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(reader);

        let mut terms = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            match record.get(field) {
                Some(term) if !term.is_empty() => terms.push(term.to_string()),
                _ => {}
            }
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

pub fn exact_match(vocabulary: &Vocabulary, value: &str) -> bool {
    vocabulary.terms.iter().any(|term| term == value)
}

pub fn term_contained_in_value(vocabulary: &Vocabulary, value: &str) -> bool {
    let value = value.to_lowercase();
    vocabulary
        .terms
        .iter()
        .any(|term| value.contains(&term.to_lowercase()))
}

pub fn value_contained_in_term(vocabulary: &Vocabulary, value: &str) -> bool {
    let value = value.to_lowercase();
    vocabulary
        .terms
        .iter()
        .any(|term| term.to_lowercase().contains(&value))
}

impl MatchMode {
    pub fn matches(self, vocabulary: &Vocabulary, value: &str) -> bool {
        match self {
            Self::Exact => exact_match(vocabulary, value),
            Self::TermInValue => term_contained_in_value(vocabulary, value),
            Self::ValueInTerm => value_contained_in_term(vocabulary, value),
        }
    }
}
