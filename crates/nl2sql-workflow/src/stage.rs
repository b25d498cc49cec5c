use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Etapas por las que pasa una petición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Received,
    RetrievingExamples,
    AssemblingPrompt,
    GeneratingSql,
    Executing,
    Complete,
    Failed,
}

impl QueryStage {
    /// Etapa siguiente en el camino feliz. `Complete` y `Failed` son
    /// terminales.
    pub fn next(self) -> Option<QueryStage> {
        match self {
            QueryStage::Received => Some(QueryStage::RetrievingExamples),
            QueryStage::RetrievingExamples => Some(QueryStage::AssemblingPrompt),
            QueryStage::AssemblingPrompt => Some(QueryStage::GeneratingSql),
            QueryStage::GeneratingSql => Some(QueryStage::Executing),
            QueryStage::Executing => Some(QueryStage::Complete),
            QueryStage::Complete | QueryStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryStage::Received => "received",
            QueryStage::RetrievingExamples => "retrieving_examples",
            QueryStage::AssemblingPrompt => "assembling_prompt",
            QueryStage::GeneratingSql => "generating_sql",
            QueryStage::Executing => "executing",
            QueryStage::Complete => "complete",
            QueryStage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QueryStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "received" => Ok(QueryStage::Received),
            "retrieving_examples" => Ok(QueryStage::RetrievingExamples),
            "assembling_prompt" => Ok(QueryStage::AssemblingPrompt),
            "generating_sql" => Ok(QueryStage::GeneratingSql),
            "executing" => Ok(QueryStage::Executing),
            "complete" => Ok(QueryStage::Complete),
            "failed" => Ok(QueryStage::Failed),
            other => Err(format!("etapa desconocida: {}", other)),
        }
    }
}

impl Default for QueryStage {
    fn default() -> Self {
        QueryStage::Received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_ends_in_complete() {
        let mut stage = QueryStage::default();
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(stage, QueryStage::Complete);
        assert!(QueryStage::Failed.is_terminal());
    }

    #[test]
    fn display_and_parse_agree() {
        for s in [QueryStage::Received, QueryStage::GeneratingSql, QueryStage::Failed] {
            assert_eq!(s.to_string().parse::<QueryStage>().unwrap(), s);
        }
        assert!("bogus".parse::<QueryStage>().is_err());
    }
}
