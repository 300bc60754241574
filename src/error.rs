//! `EngineError` (§7): the error taxonomy at the library boundary. Kept
//! distinct from `anyhow::Error` so callers that embed this crate can
//! `match` on a specific failure mode instead of pattern-matching
//! formatted text; the CLI converts to `anyhow::Error` at the last
//! moment via the `From` impl below.
use crate::catalog::id::ObjectId;
use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// A catalog query failed or a row didn't decode as expected.
    Extraction {
        query: &'static str,
        field: &'static str,
        source: sqlx::Error,
    },
    /// The sorter found a dependency cycle it could not break.
    Cycle {
        stable_ids: Vec<String>,
        edges: Vec<(ObjectId, ObjectId)>,
    },
    /// A change has no valid SQL representation.
    Unrepresentable { change: String },
    /// The source cluster no longer matches the fingerprint recorded on the plan.
    FingerprintMismatch { expected: String, actual: String },
    /// The source cluster already matches the target; there is nothing to apply.
    AlreadyApplied,
    /// A statement failed while applying a plan.
    SqlExecution {
        statement: String,
        source: sqlx::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Extraction {
                query,
                field,
                source,
            } => write!(
                f,
                "extraction failed: query `{query}`, field `{field}`: {source}"
            ),
            EngineError::Cycle { stable_ids, edges } => write!(
                f,
                "unbreakable dependency cycle among [{}], edges: {:?}",
                stable_ids.join(", "),
                edges
            ),
            EngineError::Unrepresentable { change } => {
                write!(f, "no SQL representation for change: {change}")
            }
            EngineError::FingerprintMismatch { expected, actual } => write!(
                f,
                "source has drifted since the plan was built: expected fingerprint {expected}, found {actual}"
            ),
            EngineError::AlreadyApplied => {
                write!(f, "source already matches target; nothing to apply")
            }
            EngineError::SqlExecution { statement, source } => {
                write!(f, "failed to execute statement `{statement}`: {source}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Extraction { source, .. } => Some(source),
            EngineError::SqlExecution { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<EngineError> for anyhow::Error {
    fn from(err: EngineError) -> Self {
        anyhow::Error::new(err)
    }
}
