use crate::align::{align, changes};
use crate::confusion::ConfusionDictionary;
use crate::reconcile::{reconcile, PhraseClaim};
use crate::{CorrectError, CorrectionResult, ErrorCategory, ErrorRecord};
use serde::Deserialize;

/// The raw shapes a corrector backend may hand back, as a closed union.
/// Every backend is adapted into exactly one of these; the normalizer
/// matches exhaustively instead of sniffing shapes at runtime.
#[derive(Debug, Clone)]
pub enum ModelOutput {
    /// Corrected text plus `(original, corrected, position)` edit tuples.
    /// The shape of classic statistical and dictionary correctors.
    Edits {
        target: String,
        edits: Vec<(String, String, usize)>,
    },
    /// A loosely-typed result object: already close to [`CorrectionResult`]
    /// but with optional category/explanation per entry.
    Loose(LooseResult),
    /// Corrected text plus phrase-level claims from a generative model,
    /// needing diff alignment to become position-exact.
    Claims {
        target: String,
        claims: Vec<PhraseClaim>,
    },
}

/// Result-object shape with untyped error entries.
#[derive(Debug, Clone, Deserialize)]
pub struct LooseResult {
    #[serde(default)]
    pub source: Option<String>,
    pub target: String,
    #[serde(default)]
    pub errors: Vec<LooseError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LooseError {
    pub original: String,
    pub corrected: String,
    pub position: usize,
    #[serde(default)]
    pub category: Option<ErrorCategory>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ModelOutput {
    /// Parse a raw model response from JSON into one of the three shapes.
    ///
    /// An object carrying `claims` is the phrase-claim shape, one carrying
    /// `edits` is the tuple shape, anything else must parse as the loose
    /// result shape. Missing required fields fail with
    /// [`CorrectError::InvalidModelOutput`].
    pub fn from_json(value: serde_json::Value) -> Result<Self, CorrectError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CorrectError::InvalidModelOutput("expected a JSON object".into()))?;

        if obj.contains_key("claims") {
            #[derive(Deserialize)]
            struct ClaimsShape {
                target: String,
                claims: Vec<PhraseClaim>,
            }
            let shape: ClaimsShape = serde_json::from_value(value)
                .map_err(|e| CorrectError::InvalidModelOutput(e.to_string()))?;
            Ok(ModelOutput::Claims {
                target: shape.target,
                claims: shape.claims,
            })
        } else if obj.contains_key("edits") {
            #[derive(Deserialize)]
            struct EditsShape {
                target: String,
                edits: Vec<(String, String, usize)>,
            }
            let shape: EditsShape = serde_json::from_value(value)
                .map_err(|e| CorrectError::InvalidModelOutput(e.to_string()))?;
            Ok(ModelOutput::Edits {
                target: shape.target,
                edits: shape.edits,
            })
        } else {
            let loose: LooseResult = serde_json::from_value(value)
                .map_err(|e| CorrectError::InvalidModelOutput(e.to_string()))?;
            Ok(ModelOutput::Loose(loose))
        }
    }
}

/// An error entry before categories and explanations are filled in.
struct PendingRecord {
    original: String,
    corrected: String,
    position: usize,
    category: Option<ErrorCategory>,
    explanation: Option<String>,
}

impl From<ErrorRecord> for PendingRecord {
    fn from(record: ErrorRecord) -> Self {
        PendingRecord {
            original: record.original,
            corrected: record.corrected,
            position: record.position,
            category: Some(record.category),
            explanation: Some(record.explanation),
        }
    }
}

/// Coerce one model's raw output into a canonical [`CorrectionResult`].
///
/// Every produced record carries a category (untyped entries default to
/// `typo`; classic correctors only ever produce typo-class edits) and a
/// non-empty explanation. A generated explanation is `"'{o}' should be
/// '{c}'"` when both sides are single characters, otherwise the generic
/// `"word/phrase error"`.
///
/// When a confusion dictionary is supplied it runs over the already-produced
/// target and its edits join the list as untyped entries, before the
/// defaulting pass; they are re-tagged the same way as any other untyped
/// edit.
pub fn normalize(
    source: &str,
    raw: ModelOutput,
    confusion: Option<&ConfusionDictionary>,
) -> Result<CorrectionResult, CorrectError> {
    let (mut target, mut pending) = match raw {
        ModelOutput::Edits { target, edits } => {
            let pending = edits.into_iter().map(|(original, corrected, position)| {
                PendingRecord {
                    original,
                    corrected,
                    position,
                    category: None,
                    explanation: None,
                }
            });
            (target, pending.collect::<Vec<_>>())
        }
        ModelOutput::Loose(loose) => {
            if let Some(loose_source) = &loose.source {
                if loose_source != source {
                    return Err(CorrectError::InvalidModelOutput(format!(
                        "result source {:?} does not match the text being corrected",
                        loose_source
                    )));
                }
            }
            let pending = loose.errors.into_iter().map(|e| PendingRecord {
                original: e.original,
                corrected: e.corrected,
                position: e.position,
                category: e.category,
                explanation: e.explanation,
            });
            (loose.target, pending.collect())
        }
        ModelOutput::Claims { target, claims } => {
            let spans = changes(align(source, &target));
            let records = reconcile(source, &spans, &claims);
            (target, records.into_iter().map(PendingRecord::from).collect())
        }
    };

    if let Some(dict) = confusion {
        let (corrected_target, edits) = dict.apply(&target);
        target = corrected_target;
        pending.extend(edits.into_iter().map(|(original, corrected, position)| {
            PendingRecord {
                original,
                corrected,
                position,
                category: None,
                explanation: None,
            }
        }));
    }

    let mut errors: Vec<ErrorRecord> = pending
        .into_iter()
        .map(|p| {
            let explanation = match p.explanation {
                Some(text) if !text.is_empty() => text,
                _ => generate_explanation(&p.original, &p.corrected),
            };
            ErrorRecord {
                category: p.category.unwrap_or(ErrorCategory::Typo),
                explanation,
                original: p.original,
                corrected: p.corrected,
                position: p.position,
            }
        })
        .collect();

    errors.sort_by_key(|e| e.position);

    Ok(CorrectionResult {
        source: source.to_string(),
        target,
        errors,
    })
}

fn generate_explanation(original: &str, corrected: &str) -> String {
    if original.chars().count() == 1 && corrected.chars().count() == 1 {
        format!("'{}' should be '{}'", original, corrected)
    } else {
        "word/phrase error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_tuples_default_to_typo() {
        let raw = ModelOutput::Edits {
            target: "今天心情很好".to_string(),
            edits: vec![("新".to_string(), "心".to_string(), 2)],
        };
        let result = normalize("今天新情很好", raw, None).unwrap();

        assert_eq!(result.target, "今天心情很好");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, ErrorCategory::Typo);
        assert_eq!(result.errors[0].explanation, "'新' should be '心'");
    }

    #[test]
    fn test_multichar_edit_gets_generic_explanation() {
        let raw = ModelOutput::Edits {
            target: "今天心情很好".to_string(),
            edits: vec![("新情".to_string(), "心情".to_string(), 2)],
        };
        let result = normalize("今天新情很好", raw, None).unwrap();
        assert_eq!(result.errors[0].explanation, "word/phrase error");
    }

    #[test]
    fn test_loose_shape_keeps_supplied_fields() {
        let loose = LooseResult {
            source: Some("这就是生或啊".to_string()),
            target: "这就是生活啊".to_string(),
            errors: vec![
                LooseError {
                    original: "或".to_string(),
                    corrected: "活".to_string(),
                    position: 4,
                    category: Some(ErrorCategory::Grammar),
                    explanation: Some("verb misuse".to_string()),
                },
                LooseError {
                    original: "或".to_string(),
                    corrected: "活".to_string(),
                    position: 4,
                    category: None,
                    explanation: None,
                },
            ],
        };
        let result = normalize("这就是生或啊", ModelOutput::Loose(loose), None).unwrap();

        assert_eq!(result.errors[0].category, ErrorCategory::Grammar);
        assert_eq!(result.errors[0].explanation, "verb misuse");
        assert_eq!(result.errors[1].category, ErrorCategory::Typo);
        assert_eq!(result.errors[1].explanation, "'或' should be '活'");
    }

    #[test]
    fn test_loose_source_mismatch_is_invalid() {
        let loose = LooseResult {
            source: Some("别的句子".to_string()),
            target: "别的句子".to_string(),
            errors: vec![],
        };
        let err = normalize("这就是生或啊", ModelOutput::Loose(loose), None).unwrap_err();
        assert!(matches!(err, CorrectError::InvalidModelOutput(_)));
    }

    #[test]
    fn test_claims_shape_runs_full_reconciliation() {
        let raw = ModelOutput::Claims {
            target: "今天心情很好".to_string(),
            claims: vec![PhraseClaim {
                original_phrase: "新情".to_string(),
                corrected_phrase: "心情".to_string(),
                category: ErrorCategory::Typo,
                explanation: "新 confused with 心".to_string(),
            }],
        };
        let result = normalize("今天新情很好", raw, None).unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].position, 2);
        assert_eq!(result.errors[0].explanation, "新 confused with 心");
    }

    #[test]
    fn test_confusion_post_pass_merges_and_retags() {
        let dict = ConfusionDictionary::from_entries([(
            "生或".to_string(),
            "生活".to_string(),
        )])
        .unwrap();
        let raw = ModelOutput::Edits {
            target: "这就是生或啊".to_string(),
            edits: vec![],
        };
        let result = normalize("这就是生或啊", raw, Some(&dict)).unwrap();

        assert_eq!(result.target, "这就是生活啊");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, ErrorCategory::Typo);
        assert_eq!(result.errors[0].original, "生或");
        assert_eq!(result.errors[0].explanation, "word/phrase error");
    }

    #[test]
    fn test_positions_anchor_into_source() {
        let raw = ModelOutput::Claims {
            target: "这就是生活啊".to_string(),
            claims: vec![],
        };
        let result = normalize("这就是生或啊", raw, None).unwrap();
        assert!(!result.errors.is_empty());
        for error in &result.errors {
            assert!(error.position_valid(&result.source), "{:?}", error);
        }
    }

    #[test]
    fn test_errors_sorted_by_position() {
        let raw = ModelOutput::Edits {
            target: "xx".to_string(),
            edits: vec![
                ("b".to_string(), "x".to_string(), 5),
                ("a".to_string(), "x".to_string(), 1),
            ],
        };
        let result = normalize("zazzzb", raw, None).unwrap();
        assert_eq!(result.errors[0].position, 1);
        assert_eq!(result.errors[1].position, 5);
    }

    #[test]
    fn test_from_json_shapes() {
        let edits = serde_json::json!({
            "target": "今天心情很好",
            "edits": [["新", "心", 2]],
        });
        assert!(matches!(
            ModelOutput::from_json(edits).unwrap(),
            ModelOutput::Edits { .. }
        ));

        let claims = serde_json::json!({
            "target": "今天心情很好",
            "claims": [{
                "original_phrase": "新情",
                "corrected_phrase": "心情",
                "category": "typo",
                "explanation": "wrong character",
            }],
        });
        assert!(matches!(
            ModelOutput::from_json(claims).unwrap(),
            ModelOutput::Claims { .. }
        ));

        let loose = serde_json::json!({
            "source": "今天新情很好",
            "target": "今天心情很好",
            "errors": [{"original": "新", "corrected": "心", "position": 2}],
        });
        assert!(matches!(
            ModelOutput::from_json(loose).unwrap(),
            ModelOutput::Loose(_)
        ));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let missing_target = serde_json::json!({"edits": []});
        assert!(matches!(
            ModelOutput::from_json(missing_target).unwrap_err(),
            CorrectError::InvalidModelOutput(_)
        ));

        let not_an_object = serde_json::json!(["今天心情很好"]);
        assert!(matches!(
            ModelOutput::from_json(not_an_object).unwrap_err(),
            CorrectError::InvalidModelOutput(_)
        ));
    }
}
