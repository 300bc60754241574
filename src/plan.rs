//! The `Plan` artifact (§6): the JSON contract between `plan` and `apply`.
//!
//! A plan freezes the statements computed from one `(source, target)`
//! pair along with the fingerprints of both sides at the moment the
//! plan was built. `apply` re-fingerprints the target before running a
//! single statement and refuses to proceed if it has drifted - the plan
//! is a promise about a specific starting state, not just a script.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const PLAN_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterFingerprint {
    pub url: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total: usize,
    pub creates: usize,
    pub alters: usize,
    pub drops: usize,
    #[serde(rename = "byObjectType")]
    pub by_object_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub source: ClusterFingerprint,
    pub target: ClusterFingerprint,
    #[serde(rename = "stableIds")]
    pub stable_ids: Vec<String>,
    #[serde(rename = "sqlHash")]
    pub sql_hash: String,
    pub statements: Vec<String>,
    pub stats: PlanStats,
}

impl Plan {
    /// Build a plan from the ordered statements and the stable ids of
    /// every migration step that produced them, alongside both
    /// clusters' fingerprints.
    pub fn new(
        role: Option<String>,
        source: ClusterFingerprint,
        target: ClusterFingerprint,
        stable_ids: Vec<String>,
        statements: Vec<String>,
        stats: PlanStats,
    ) -> Self {
        let sql_hash = hash_statements(&statements);
        Self {
            version: PLAN_VERSION,
            role,
            source,
            target,
            stable_ids,
            sql_hash,
            statements,
            stats,
        }
    }

    /// A plan is empty when it has no statements to run - the two
    /// clusters already match (modulo the active object filter).
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Hash the statements in the order they'll execute. Two plans with the
/// same statements in a different order hash differently - order is
/// part of what `apply` promises to reproduce.
pub fn hash_statements(statements: &[String]) -> String {
    let mut hasher = Sha256::new();
    for statement in statements {
        hasher.update(statement.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
