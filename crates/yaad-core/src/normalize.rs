//! Item-name canonicalization.
//!
//! Folds the many ways a speech recognizer can spell the same item onto one
//! key, so "Meri Khadi" stored today is found when the user asks for "खारी".

use std::collections::HashMap;

use regex::Regex;

use crate::config::VocabularyConfig;
use crate::error::Result;

/// Compiled vocabulary: spelling-variant table plus the possessive-prefix pattern.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    variants: HashMap<String, String>,
    possessive: Option<Regex>,
}

impl NameNormalizer {
    /// Build a normalizer from the `[vocabulary]` config section.
    ///
    /// Spellings are lowercased and trimmed the same way input is, so the table
    /// may be written in any case.
    pub fn new(vocab: &VocabularyConfig) -> Result<Self> {
        let mut variants = HashMap::new();
        for variant in &vocab.variants {
            let canonical = variant.canonical.trim().to_lowercase();
            for spelling in &variant.spellings {
                variants.insert(spelling.trim().to_lowercase(), canonical.clone());
            }
        }

        let prefixes: Vec<String> = vocab
            .possessive_prefixes
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(&p))
            .collect();

        let possessive = if prefixes.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"^(?:{})\s+", prefixes.join("|")))?)
        };

        Ok(Self {
            variants,
            possessive,
        })
    }

    /// Canonical key for a raw item name. Empty input yields an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return name;
        }
        if let Some(canonical) = self.variants.get(&name) {
            return canonical.clone();
        }

        let stripped = match &self.possessive {
            Some(re) => re.replace(&name, "").into_owned(),
            None => name,
        };
        match self.variants.get(&stripped) {
            Some(canonical) => canonical.clone(),
            None => stripped,
        }
    }

    /// Lowercased, trimmed location text as stored.
    pub fn normalize_location(raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}
