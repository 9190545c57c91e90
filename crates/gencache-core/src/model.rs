use serde::{Deserialize, Serialize};

/// How a single generation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "text")]
pub enum GenerationOutcome {
    Generated(String),
    Failed(String),
}

/// A generation outcome about to be appended to the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGeneration {
    pub run_id: String,
    pub prompt: String,
    pub outcome: GenerationOutcome,
}

impl NewGeneration {
    pub fn generated(
        run_id: impl Into<String>,
        prompt: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            prompt: prompt.into(),
            outcome: GenerationOutcome::Generated(text.into()),
        }
    }

    pub fn failed(
        run_id: impl Into<String>,
        prompt: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            prompt: prompt.into(),
            outcome: GenerationOutcome::Failed(error.into()),
        }
    }

    /// Column values for `generated_text` and `error`.
    pub(crate) fn columns(&self) -> (Option<&str>, Option<&str>) {
        match &self.outcome {
            GenerationOutcome::Generated(t) => (Some(t.as_str()), None),
            GenerationOutcome::Failed(e) => (None, Some(e.as_str())),
        }
    }
}

/// One row of the `generations` table, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation_id: i64,
    pub run_id: String,
    pub prompt: String,
    pub generated_text: Option<String>,
    pub error: Option<String>,
}

impl GenerationRecord {
    /// `None` when the row has both or neither of `generated_text` and `error`
    /// (possible for rows written with raw SQL).
    pub fn outcome(&self) -> Option<GenerationOutcome> {
        match (&self.generated_text, &self.error) {
            (Some(t), None) => Some(GenerationOutcome::Generated(t.clone())),
            (None, Some(e)) => Some(GenerationOutcome::Failed(e.clone())),
            _ => None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome(), Some(GenerationOutcome::Generated(_)))
    }

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            generation_id: row.get(0)?,
            run_id: row.get(1)?,
            prompt: row.get(2)?,
            generated_text: row.get(3)?,
            error: row.get(4)?,
        })
    }
}

/// Aggregate counts for one cache database file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub generations: u64,
    pub runs: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// A database file found in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFile {
    pub name: String,
    pub bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: Option<&str>, error: Option<&str>) -> GenerationRecord {
        GenerationRecord {
            generation_id: 1,
            run_id: "run-1".into(),
            prompt: "p".into(),
            generated_text: text.map(String::from),
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_outcome_requires_exactly_one_field() {
        assert_eq!(
            record(Some("ok"), None).outcome(),
            Some(GenerationOutcome::Generated("ok".into()))
        );
        assert_eq!(
            record(None, Some("boom")).outcome(),
            Some(GenerationOutcome::Failed("boom".into()))
        );
        assert_eq!(record(None, None).outcome(), None);
        assert_eq!(record(Some("ok"), Some("boom")).outcome(), None);
    }

    #[test]
    fn test_new_generation_columns() {
        let ok = NewGeneration::generated("r", "p", "hello");
        assert_eq!(ok.columns(), (Some("hello"), None));

        let bad = NewGeneration::failed("r", "p", "rate limited");
        assert_eq!(bad.columns(), (None, Some("rate limited")));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let v = serde_json::to_value(GenerationOutcome::Failed("timeout".into())).unwrap();
        assert_eq!(v, serde_json::json!({"status": "failed", "text": "timeout"}));
    }
}
