use crate::{CorrectError, CorrectionResult, ErrorRecord};
use std::collections::HashMap;

/// Combine several models' results for the same source into one deduplicated,
/// position-sorted result.
///
/// Callers supply results in model order, weakest to strongest. The merged
/// target starts as the first model's target and is overridden by the last
/// model's target when more than one model participated and at least one
/// error survived. Last-wins is deliberate policy inherited from the original
/// service, not a voting scheme; revisit only with that history in mind.
///
/// Duplicate errors are keyed by `(position, original, corrected)`; the
/// record with the longer non-whitespace explanation wins, ties keeping the
/// first seen. The final list is stably sorted by position, so same-position
/// records keep input order.
pub fn merge(results: &[CorrectionResult]) -> Result<CorrectionResult, CorrectError> {
    let first = results.first().ok_or(CorrectError::EmptyMergeInput)?;

    let mut merged: Vec<ErrorRecord> = Vec::new();
    let mut seen: HashMap<(usize, String, String), usize> = HashMap::new();

    for result in results {
        for error in &result.errors {
            let key = (
                error.position,
                error.original.clone(),
                error.corrected.clone(),
            );
            match seen.get(&key) {
                Some(&idx) => {
                    if explanation_weight(error) > explanation_weight(&merged[idx]) {
                        log::debug!(
                            "merge: replacing explanation for {:?} at {}",
                            error.original,
                            error.position
                        );
                        merged[idx] = error.clone();
                    }
                }
                None => {
                    seen.insert(key, merged.len());
                    merged.push(error.clone());
                }
            }
        }
    }

    merged.sort_by_key(|e| e.position);

    let target = if results.len() > 1 && !merged.is_empty() {
        results[results.len() - 1].target.clone()
    } else {
        first.target.clone()
    };

    Ok(CorrectionResult {
        source: first.source.clone(),
        target,
        errors: merged,
    })
}

/// Merge per-model batches index by index.
///
/// `per_model[m]` is model m's result list for the same ordered batch of
/// texts. Lists may be ragged when a model partially failed upstream; a
/// missing index simply contributes nothing for that text.
pub fn merge_batch(
    per_model: &[Vec<CorrectionResult>],
) -> Result<Vec<CorrectionResult>, CorrectError> {
    if per_model.is_empty() {
        return Err(CorrectError::EmptyMergeInput);
    }

    let batch_len = per_model.iter().map(Vec::len).max().unwrap_or(0);

    (0..batch_len)
        .map(|i| {
            let slice: Vec<CorrectionResult> = per_model
                .iter()
                .filter_map(|results| results.get(i).cloned())
                .collect();
            merge(&slice)
        })
        .collect()
}

fn explanation_weight(record: &ErrorRecord) -> usize {
    record
        .explanation
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}
