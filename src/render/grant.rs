//! SQL rendering for grant operations

use crate::catalog::id::{DependsOn, ObjectId};
use crate::diff::operations::GrantOperation;
use crate::render::{RenderedSql, SqlRenderer};

impl SqlRenderer for GrantOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            GrantOperation::Grant { grant } => {
                vec![RenderedSql::new(
                    crate::render::sql::render_grant_statement(grant),
                )]
            }
            GrantOperation::Revoke { grant } => {
                vec![RenderedSql::new(
                    crate::render::sql::render_revoke_statement(grant),
                )]
            }
        }
    }

    fn db_object_id(&self) -> ObjectId {
        match self {
            GrantOperation::Grant { grant } => grant.id(),
            GrantOperation::Revoke { grant } => grant.id(),
        }
    }
}
