//! Dataset format: `{dataset_name, version, test_cases: [{id, difficulty,
//! input, expected}]}`. Schema of `input`/`expected` is
//! agent-specific, so both are generic over the case type the caller
//! supplies.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// A case's declared difficulty band, used for per-difficulty accuracy
/// breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One dataset entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase<Input, Expected> {
    pub id: String,
    pub difficulty: Difficulty,
    pub input: Input,
    pub expected: Expected,
}

/// An ordered sequence of cases against which a [`crate::evaluator::Subject`]
/// is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<Input, Expected> {
    pub dataset_name: String,
    pub version: String,
    pub test_cases: Vec<TestCase<Input, Expected>>,
}

impl<Input, Expected> Dataset<Input, Expected>
where
    Input: for<'de> Deserialize<'de>,
    Expected: for<'de> Deserialize<'de>,
{
    /// Parses a dataset from its JSON file representation.
    ///
    /// # Errors
    /// Returns [`EvalError::DatasetParse`] if `json` does not match the
    /// declared shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EvalError::DatasetParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn parses_well_formed_dataset() {
        let json = r#"{
            "dataset_name": "invoice_matcher_smoke",
            "version": "1",
            "test_cases": [
                {"id": "c1", "difficulty": "easy", "input": {}, "expected": {}}
            ]
        }"#;
        let dataset: Dataset<Value, Value> = Dataset::from_json(json).expect("valid dataset");
        assert_eq!(dataset.dataset_name, "invoice_matcher_smoke");
        assert_eq!(dataset.test_cases.len(), 1);
        assert_eq!(dataset.test_cases[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn rejects_malformed_json() {
        let result: Result<Dataset<Value, Value>> = Dataset::from_json("not json");
        assert!(result.is_err());
    }
}
