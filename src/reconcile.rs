use crate::align::{DiffKind, DiffSpan};
use crate::{ErrorCategory, ErrorRecord};
use serde::{Deserialize, Serialize};

/// Characters of context taken on each side of an insertion/deletion point
/// when matching a claim that has no source text to compare against.
const CONTEXT_WINDOW: usize = 5;

/// A phrase-level error claim from a free-form annotator, loosely positioned:
/// the phrase boundaries rarely line up character-for-character with the
/// exact diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseClaim {
    pub original_phrase: String,
    pub corrected_phrase: String,
    pub category: ErrorCategory,
    #[serde(default)]
    pub explanation: String,
}

/// Reconcile exact diff spans against fuzzy phrase claims.
///
/// For each span (in source order) the first unused claim, in claim order,
/// that satisfies one of these rules is consumed:
///
/// 1. the span's source text and the claim's phrase contain one another
///    (either direction, both non-empty);
/// 2. for insert/delete spans only, the claim's phrase and the ±5-character
///    source window around the span's start contain one another.
///
/// A matched claim supplies category and explanation; a `semantic` claim
/// forces `corrected` empty, since it flags the span without prescribing a
/// fix. Spans with no matching claim fall back to a category derived from
/// the span kind. Matching is first-match-wins over an ordered claim list,
/// so identical inputs always reconcile identically.
pub fn reconcile(source: &str, spans: &[DiffSpan], claims: &[PhraseClaim]) -> Vec<ErrorRecord> {
    let source_chars: Vec<char> = source.chars().collect();
    let mut used = vec![false; claims.len()];
    let mut records = Vec::with_capacity(spans.len());

    for span in spans {
        let span_text = span.source_text(source);

        let mut matched = None;
        for (idx, claim) in claims.iter().enumerate() {
            if used[idx] {
                continue;
            }

            if contains_either(&span_text, &claim.original_phrase) {
                used[idx] = true;
                matched = Some(claim);
                break;
            }

            if matches!(span.kind, DiffKind::Insert | DiffKind::Delete) {
                let window = context_window(&source_chars, span.source_start);
                if window.contains(&claim.original_phrase)
                    || claim.original_phrase.contains(&window)
                {
                    used[idx] = true;
                    matched = Some(claim);
                    break;
                }
            }
        }

        let record = match matched {
            Some(claim) => ErrorRecord {
                original: span_text,
                corrected: if claim.category == ErrorCategory::Semantic {
                    String::new()
                } else {
                    span.replacement.clone()
                },
                position: span.source_start,
                category: claim.category,
                explanation: claim.explanation.clone(),
            },
            None => {
                let (category, explanation) = match span.kind {
                    DiffKind::Replace => (ErrorCategory::Typo, ""),
                    DiffKind::Delete => (ErrorCategory::Redundant, "extraneous content"),
                    DiffKind::Insert => (ErrorCategory::Missing, "missing content"),
                    DiffKind::Equal => (ErrorCategory::Unknown, ""),
                };
                ErrorRecord {
                    original: span_text,
                    corrected: span.replacement.clone(),
                    position: span.source_start,
                    category,
                    explanation: explanation.to_string(),
                }
            }
        };
        records.push(record);
    }

    records
}

fn contains_either(span_text: &str, phrase: &str) -> bool {
    !span_text.is_empty() && !phrase.is_empty()
        && (phrase.contains(span_text) || span_text.contains(phrase))
}

fn context_window(source: &[char], position: usize) -> String {
    let start = position.saturating_sub(CONTEXT_WINDOW);
    let end = (position + CONTEXT_WINDOW).min(source.len());
    source[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align, changes};

    fn claim(phrase: &str, fix: &str, category: ErrorCategory, why: &str) -> PhraseClaim {
        PhraseClaim {
            original_phrase: phrase.to_string(),
            corrected_phrase: fix.to_string(),
            category,
            explanation: why.to_string(),
        }
    }

    #[test]
    fn test_claim_supplies_category_and_explanation() {
        let source = "这就是生或啊";
        let spans = changes(align(source, "这就是生活啊"));
        let claims = vec![claim(
            "生或",
            "生活",
            ErrorCategory::Typo,
            "或 confused with 活",
        )];

        let records = reconcile(source, &spans, &claims);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, ErrorCategory::Typo);
        assert_eq!(records[0].explanation, "或 confused with 活");
        assert_eq!(records[0].original, "或");
        assert_eq!(records[0].corrected, "活");
        assert_eq!(records[0].position, 4);
    }

    #[test]
    fn test_semantic_claim_blanks_correction() {
        let source = "今天新情很好";
        let spans = changes(align(source, "今天心情很好"));
        let claims = vec![claim("新情", "心情", ErrorCategory::Semantic, "odd wording")];

        let records = reconcile(source, &spans, &claims);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, ErrorCategory::Semantic);
        assert_eq!(records[0].corrected, "");
        assert_eq!(records[0].original, "新");
    }

    #[test]
    fn test_claim_consumed_at_most_once() {
        let source = "新新气象又新情";
        let target = "欣欣气象又心情";
        let spans = changes(align(source, target));
        assert!(spans.len() >= 2);

        let claims = vec![claim("新", "欣", ErrorCategory::Typo, "shared claim")];
        let records = reconcile(source, &spans, &claims);

        let matched: Vec<_> = records
            .iter()
            .filter(|r| r.explanation == "shared claim")
            .collect();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_first_claim_in_order_wins() {
        let source = "这就是生或啊";
        let spans = changes(align(source, "这就是生活啊"));
        let claims = vec![
            claim("或", "活", ErrorCategory::Grammar, "first"),
            claim("或", "活", ErrorCategory::Typo, "second"),
        ];

        let records = reconcile(source, &spans, &claims);
        assert_eq!(records[0].category, ErrorCategory::Grammar);
        assert_eq!(records[0].explanation, "first");
    }

    #[test]
    fn test_context_window_matches_deletion() {
        let source = "今天好好天气";
        let target = "今天好天气";
        let spans = changes(align(source, target));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, DiffKind::Delete);

        // The claim phrase does not overlap the deleted character itself,
        // only the window around the deletion point.
        let claims = vec![claim(
            "天气",
            "天气",
            ErrorCategory::Redundant,
            "duplicated word",
        )];
        let records = reconcile(source, &spans, &claims);
        assert_eq!(records[0].category, ErrorCategory::Redundant);
        assert_eq!(records[0].explanation, "duplicated word");
    }

    #[test]
    fn test_unmatched_spans_take_kind_defaults() {
        let source = "句子有多的字少字";
        let target = "句子有字少了字";
        let spans = changes(align(source, target));

        let records = reconcile(source, &spans, &[]);
        assert_eq!(records.len(), spans.len());
        for record in &records {
            match record.category {
                ErrorCategory::Typo => assert!(record.explanation.is_empty()),
                ErrorCategory::Redundant => assert_eq!(record.explanation, "extraneous content"),
                ErrorCategory::Missing => assert_eq!(record.explanation, "missing content"),
                other => panic!("unexpected default category {}", other),
            }
        }
    }
}
