use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Static wrong-term to correct-term mapping, loaded once at startup and
/// read-only afterwards.
///
/// Entries are applied in lexicographic order of the wrong term. The original
/// data format makes no ordering promise, so the order is pinned here to keep
/// recorded positions reproducible across runs when entries overlap.
#[derive(Debug, Clone)]
pub struct ConfusionDictionary {
    entries: BTreeMap<String, String>,
    matcher: AhoCorasick,
}

impl ConfusionDictionary {
    /// Load a confusion dictionary from a text file.
    ///
    /// One `wrong correct` pair per whitespace-separated line. Lines starting
    /// with `#` and blank lines are ignored; lines with fewer than two tokens
    /// are silently skipped. A missing file yields an empty dictionary, which
    /// makes every correction a no-op.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "confusion dictionary not found at {}, substitution disabled",
                path.display()
            );
            return Self::from_entries(std::iter::empty());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read confusion dictionary: {}", path.display()))?;

        let mut pairs = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            if let (Some(wrong), Some(correct)) = (tokens.next(), tokens.next()) {
                pairs.push((wrong.to_string(), correct.to_string()));
            }
        }

        Self::from_entries(pairs)
    }

    /// Build a dictionary from `(wrong, correct)` pairs. Duplicate wrong
    /// terms keep the last pair seen. Empty wrong terms are discarded.
    pub fn from_entries(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let entries: BTreeMap<String, String> = pairs
            .into_iter()
            .filter(|(wrong, _)| !wrong.is_empty())
            .collect();

        let matcher = AhoCorasick::new(entries.keys())
            .context("Failed to build confusion term matcher")?;

        Ok(Self { entries, matcher })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(wrong, correct)` pairs in application order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), c.as_str()))
    }

    pub fn get(&self, wrong: &str) -> Option<&str> {
        self.entries.get(wrong).map(String::as_str)
    }

    /// Apply every entry to `text`, left to right with a forward-only cursor
    /// per entry. Returns the corrected text and the `(wrong, correct,
    /// position)` edits, positions in characters.
    ///
    /// Entries are applied one after another, not simultaneously: a later
    /// entry may match text produced by an earlier entry's replacement, and a
    /// recorded position is relative to the text state at the time of that
    /// match, not to the input. Replicates the sequential-replacement
    /// behavior the rest of the pipeline expects.
    pub fn apply(&self, text: &str) -> (String, Vec<(String, String, usize)>) {
        // No wrong term occurs in the input, so no entry can fire and no
        // replacement can create new match sites.
        if !self.matcher.is_match(text) {
            return (text.to_string(), Vec::new());
        }

        let mut chars: Vec<char> = text.chars().collect();
        let mut edits = Vec::new();

        for (wrong, correct) in &self.entries {
            let wrong_chars: Vec<char> = wrong.chars().collect();
            let correct_chars: Vec<char> = correct.chars().collect();

            let mut cursor = 0;
            while let Some(pos) = find_chars(&chars, &wrong_chars, cursor) {
                edits.push((wrong.clone(), correct.clone(), pos));
                chars.splice(pos..pos + wrong_chars.len(), correct_chars.iter().copied());
                cursor = pos + correct_chars.len();
            }
        }

        (chars.into_iter().collect(), edits)
    }
}

/// Find `needle` in `haystack` starting at `from`, by character index.
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from + needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}
