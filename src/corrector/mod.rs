pub mod registry;

use crate::confusion::ConfusionDictionary;
use crate::normalize::{normalize, ModelOutput};
use crate::{CorrectError, CorrectionResult};
use rayon::prelude::*;

/// A correction backend: given text, return corrected text plus zero or more
/// claimed errors, already normalized into a [`CorrectionResult`].
///
/// Implementors must be `Send + Sync` so the registry can fan a batch out
/// across threads. Backends that block on I/O should enforce their own
/// timeout and surface failures as errors; the ensemble treats a failed
/// corrector as absent.
pub trait Corrector: Send + Sync {
    fn name(&self) -> &str;

    fn correct(&self, text: &str) -> Result<CorrectionResult, CorrectError>;

    /// Correct a batch. Results come back in input order.
    fn correct_batch(&self, texts: &[String]) -> Result<Vec<CorrectionResult>, CorrectError> {
        texts.par_iter().map(|text| self.correct(text)).collect()
    }
}

/// In-process corrector backed solely by the confusion dictionary.
///
/// The dictionary is consumed natively here, so no confusion post-pass is
/// applied on top; its edits enter the pipeline as ordinary untyped tuples.
pub struct ConfusionCorrector {
    dictionary: ConfusionDictionary,
}

impl ConfusionCorrector {
    pub const NAME: &'static str = "confusion";

    pub fn new(dictionary: ConfusionDictionary) -> Self {
        Self { dictionary }
    }
}

impl Corrector for ConfusionCorrector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn correct(&self, text: &str) -> Result<CorrectionResult, CorrectError> {
        let (target, edits) = self.dictionary.apply(text);
        normalize(text, ModelOutput::Edits { target, edits }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    fn corrector() -> ConfusionCorrector {
        let dictionary = ConfusionDictionary::from_entries([
            ("新情".to_string(), "心情".to_string()),
            ("生或".to_string(), "生活".to_string()),
        ])
        .unwrap();
        ConfusionCorrector::new(dictionary)
    }

    #[test]
    fn test_correct_single_text() {
        let result = corrector().correct("今天新情很好").unwrap();
        assert_eq!(result.target, "今天心情很好");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].position, 2);
        assert_eq!(result.errors[0].category, ErrorCategory::Typo);
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let texts = vec![
            "这就是生或啊".to_string(),
            "没有错误".to_string(),
            "今天新情很好".to_string(),
        ];
        let results = corrector().correct_batch(&texts).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].target, "这就是生活啊");
        assert_eq!(results[1].target, "没有错误");
        assert!(results[1].errors.is_empty());
        assert_eq!(results[2].target, "今天心情很好");
    }
}
