//! SQL rendering for constraint operations

use crate::catalog::id::ObjectId;
use crate::diff::operations::ConstraintOperation;
use crate::render::{RenderedSql, SqlRenderer};

impl SqlRenderer for ConstraintOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ConstraintOperation::Create(constraint) => {
                vec![RenderedSql::new(
                    crate::render::sql::render_create_constraint(constraint),
                )]
            }
            ConstraintOperation::Drop(identifier) => {
                vec![RenderedSql::new(
                    crate::render::sql::render_drop_constraint(
                        &identifier.schema,
                        &identifier.table,
                        &identifier.name,
                    ),
                )]
            }
            ConstraintOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> ObjectId {
        match self {
            ConstraintOperation::Create(constraint) => constraint.id(),
            ConstraintOperation::Drop(identifier) => identifier.to_db_object_id(),
            ConstraintOperation::Comment(comment_op) => comment_op.db_object_id(),
        }
    }
}
