use super::Corrector;
use crate::merge::merge_batch;
use crate::{CorrectError, CorrectionResult};
use rayon::prelude::*;

/// Ordered collection of named correctors, registered weakest to strongest.
///
/// The registry is a plain owned value: the composition layer builds it once
/// and passes it down by reference. Registration order matters because the
/// merge policy lets the last (strongest) model's target win.
#[derive(Default)]
pub struct CorrectorRegistry {
    correctors: Vec<Box<dyn Corrector>>,
}

impl CorrectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, corrector: Box<dyn Corrector>) {
        self.correctors.push(corrector);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Corrector> {
        self.correctors
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.correctors.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.correctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correctors.is_empty()
    }

    /// Run every registered corrector over the batch and merge per text.
    ///
    /// Correctors run in parallel; the gathered per-model lists keep
    /// registration order, and each text's results are reassembled at its
    /// original index. A failing corrector is logged and excluded rather
    /// than aborting the ensemble; the whole call fails only when zero
    /// correctors produced a usable result.
    pub fn correct_ensemble(
        &self,
        texts: &[String],
    ) -> Result<Vec<CorrectionResult>, CorrectError> {
        let per_model: Vec<Vec<CorrectionResult>> = self
            .correctors
            .par_iter()
            .filter_map(|corrector| match corrector.correct_batch(texts) {
                Ok(results) => Some(results),
                Err(e) => {
                    log::warn!(
                        "corrector '{}' failed and is excluded from the ensemble: {}",
                        corrector.name(),
                        e
                    );
                    None
                }
            })
            .collect();

        if per_model.is_empty() {
            return Err(CorrectError::NoUsableResult);
        }

        merge_batch(&per_model)
    }
}
