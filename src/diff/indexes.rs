use crate::catalog::index::Index;
use crate::diff::comment_utils;
use crate::diff::operations::{IndexOperation, IndexTarget, MigrationStep};

/// Compare two index states and generate migration steps
pub fn diff(old: Option<&Index>, new: Option<&Index>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(new_index)) => {
            let mut steps = vec![MigrationStep::Index(IndexOperation::Create(
                new_index.clone(),
            ))];

            // Add comment if present
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &new_index.comment,
                IndexTarget {
                    schema: new_index.schema.clone(),
                    name: new_index.name.clone(),
                },
            ) {
                steps.push(MigrationStep::Index(IndexOperation::Comment(comment_op)));
            }

            // Set clustering if new index should be clustered
            if new_index.is_clustered {
                steps.push(MigrationStep::Index(IndexOperation::Cluster {
                    table_schema: new_index.table_schema.clone(),
                    table_name: new_index.table_name.clone(),
                    index_schema: new_index.schema.clone(),
                    index_name: new_index.name.clone(),
                }));
            }

            steps
        }
        (Some(old_index), None) => {
            let mut steps = Vec::new();

            // If the index being dropped is clustered, unset clustering first
            if old_index.is_clustered {
                steps.push(MigrationStep::Index(IndexOperation::SetWithoutCluster {
                    schema: old_index.table_schema.clone(),
                    name: old_index.table_name.clone(),
                }));
            }

            steps.push(MigrationStep::Index(IndexOperation::Drop {
                schema: old_index.schema.clone(),
                name: old_index.name.clone(),
            }));

            steps
        }
        (Some(old_index), Some(new_index)) => {
            let mut steps = Vec::new();

            // For indexes, most structural changes require a drop and recreate
            // Only comments, clustering, and validity can be changed without recreating
            if indexes_structurally_different(old_index, new_index) {
                // Handle clustering state for old index if it was clustered
                if old_index.is_clustered {
                    steps.push(MigrationStep::Index(IndexOperation::SetWithoutCluster {
                        schema: old_index.table_schema.clone(),
                        name: old_index.table_name.clone(),
                    }));
                }

                // Drop old index
                steps.push(MigrationStep::Index(IndexOperation::Drop {
                    schema: old_index.schema.clone(),
                    name: old_index.name.clone(),
                }));

                // Create new index
                steps.push(MigrationStep::Index(IndexOperation::Create(
                    new_index.clone(),
                )));

                // Add comment if present on new index
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &new_index.comment,
                    IndexTarget {
                        schema: new_index.schema.clone(),
                        name: new_index.name.clone(),
                    },
                ) {
                    steps.push(MigrationStep::Index(IndexOperation::Comment(comment_op)));
                }

                // Set clustering if new index should be clustered
                if new_index.is_clustered {
                    steps.push(MigrationStep::Index(IndexOperation::Cluster {
                        table_schema: new_index.table_schema.clone(),
                        table_name: new_index.table_name.clone(),
                        index_schema: new_index.schema.clone(),
                        index_name: new_index.name.clone(),
                    }));
                }
            } else {
                // Handle clustering changes without recreating the index
                if old_index.is_clustered && !new_index.is_clustered {
                    steps.push(MigrationStep::Index(IndexOperation::SetWithoutCluster {
                        schema: new_index.table_schema.clone(),
                        name: new_index.table_name.clone(),
                    }));
                } else if !old_index.is_clustered && new_index.is_clustered {
                    steps.push(MigrationStep::Index(IndexOperation::Cluster {
                        table_schema: new_index.table_schema.clone(),
                        table_name: new_index.table_name.clone(),
                        index_schema: new_index.schema.clone(),
                        index_name: new_index.name.clone(),
                    }));
                }

                // Handle invalid indexes that need reindexing
                if old_index.is_valid && !new_index.is_valid {
                    // Index became invalid - generate a REINDEX operation
                    // Use CONCURRENTLY by default for safety (allows reads during reindex)
                    steps.push(MigrationStep::Index(IndexOperation::Reindex {
                        schema: new_index.schema.clone(),
                        name: new_index.name.clone(),
                        concurrently: true,
                    }));
                }
                // Note: If index goes from invalid to valid, it was already fixed manually
                // so no operation is needed

                // Handle comment changes
                let comment_ops =
                    comment_utils::handle_comment_diff(Some(old_index), Some(new_index), || {
                        IndexTarget {
                            schema: new_index.schema.clone(),
                            name: new_index.name.clone(),
                        }
                    });
                for comment_op in comment_ops {
                    steps.push(MigrationStep::Index(IndexOperation::Comment(comment_op)));
                }
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}

/// Check if two indexes are structurally different (requiring drop/recreate)
fn indexes_structurally_different(old: &Index, new: &Index) -> bool {
    // Check basic properties
    if old.name != new.name
        || old.table_schema != new.table_schema
        || old.table_name != new.table_name
        || old.index_type != new.index_type
        || old.is_unique != new.is_unique
        || old.predicate != new.predicate
        || old.tablespace != new.tablespace
        || old.storage_parameters != new.storage_parameters
        || old.include_columns != new.include_columns
    {
        return true;
    }

    // Check if columns are different
    if old.columns.len() != new.columns.len() {
        return true;
    }

    for (old_col, new_col) in old.columns.iter().zip(new.columns.iter()) {
        if old_col.expression != new_col.expression
            || old_col.collation != new_col.collation
            || old_col.opclass != new_col.opclass
            || old_col.ordering != new_col.ordering
            || old_col.nulls_ordering != new_col.nulls_ordering
        {
            return true;
        }
    }

    false
}
