// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in expansion vocabularies.
//!
//! Static tables loaded once at process start. Entries are ordered
//! slices rather than maps so expansion output is identical across runs.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Synonym/related-term table keyed by query keyword.
///
/// At most the first three synonyms per keyword are appended during
/// expansion to avoid query bloat.
pub static SYNONYMS: &[(&str, &[&str])] = &[
    // Food & cooking
    ("food", &["recipe", "dish", "meal", "cuisine", "cooking"]),
    ("recipe", &["dish", "meal", "food", "cooking", "preparation"]),
    ("vegetarian", &["plant-based", "vegan", "meatless"]),
    ("cooking", &["preparation", "culinary", "recipe", "kitchen"]),
    ("menu", &["dishes", "options", "selection", "offerings"]),
    ("buffet", &["self-service", "spread", "selection"]),
    // Travel & tourism
    ("travel", &["trip", "journey", "vacation", "tourism", "visit"]),
    ("trip", &["journey", "travel", "vacation", "excursion"]),
    ("vacation", &["holiday", "trip", "travel", "getaway"]),
    ("itinerary", &["schedule", "plan", "agenda", "program"]),
    ("tourist", &["visitor", "traveler", "sightseer"]),
    ("cultural", &["heritage", "historical", "traditional"]),
    // Business & corporate
    ("corporate", &["business", "company", "office", "professional"]),
    ("business", &["corporate", "company", "commercial"]),
    ("gathering", &["meeting", "event", "function", "assembly"]),
    ("professional", &["business", "corporate", "work"]),
    // Documents & management
    ("document", &["file", "pdf", "form", "paper", "report"]),
    ("management", &["administration", "organization", "coordination"]),
    ("plan", &["organize", "schedule", "arrange", "design", "prepare"]),
    ("create", &["make", "build", "generate", "produce"]),
    ("prepare", &["make", "create", "organize", "arrange"]),
    // Actions & processes
    ("organize", &["arrange", "plan", "coordinate", "manage"]),
    ("arrange", &["organize", "plan", "coordinate"]),
    ("schedule", &["plan", "organize", "arrange"]),
    ("coordinate", &["organize", "manage", "arrange"]),
];

/// Persona-to-domain-vocabulary table. A persona string containing the
/// key phrase (case-insensitive) gets the listed domain terms appended.
pub static PERSONA_VOCAB: &[(&str, &[&str])] = &[
    (
        "travel planner",
        &["itinerary", "destination", "accommodation", "sightseeing", "booking"],
    ),
    (
        "food contractor",
        &["catering", "menu", "ingredients", "dietary", "servings"],
    ),
    (
        "hr professional",
        &["onboarding", "compliance", "forms", "signatures", "employees"],
    ),
    (
        "investment analyst",
        &["revenue", "financials", "market", "growth", "risk"],
    ),
    (
        "student",
        &["study", "exam", "concepts", "summary", "revision"],
    ),
    (
        "researcher",
        &["methodology", "literature", "datasets", "benchmarks", "findings"],
    ),
    (
        "journalist",
        &["summary", "facts", "sources", "timeline", "quotes"],
    ),
];

/// Stop words excluded from keyword extraction. Domain-specific terms
/// are deliberately absent.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
        "our", "out", "day", "get", "has", "him", "how", "man", "new", "now", "old", "see", "two",
        "way", "who", "with", "that", "this", "will", "any", "may", "say", "she", "use", "each",
        "which", "their", "time", "work", "first", "been", "call", "find", "long", "down", "right",
        "look", "only", "come", "over", "think", "also", "back", "after", "very", "good", "well",
        "where", "much", "before",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_table_keys_are_unique() {
        let mut seen = HashSet::new();
        for (key, _) in SYNONYMS {
            assert!(seen.insert(*key), "duplicate synonym key: {}", key);
        }
    }

    #[test]
    fn stop_words_filter_common_fillers() {
        assert!(STOP_WORDS.contains("the"));
        assert!(STOP_WORDS.contains("with"));
        assert!(!STOP_WORDS.contains("vegetarian"));
    }
}
