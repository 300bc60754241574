use crate::catalog::aggregate::Aggregate;
use crate::diff::comment_utils;
use crate::diff::operations::{AggregateIdentifier, AggregateOperation, MigrationStep};

/// Diff a single aggregate function
pub fn diff(old: Option<&Aggregate>, new: Option<&Aggregate>) -> Vec<MigrationStep> {
    match (old, new) {
        // CREATE new aggregate
        (None, Some(new_aggregate)) => {
            vec![MigrationStep::Aggregate(AggregateOperation::Create {
                aggregate: Box::new(new_aggregate.clone()),
            })]
        }

        // DROP old aggregate
        (Some(old_aggregate), None) => {
            let identifier = AggregateIdentifier::new(
                old_aggregate.schema.clone(),
                old_aggregate.name.clone(),
                old_aggregate.arguments.clone(),
            );
            vec![MigrationStep::Aggregate(AggregateOperation::Drop {
                identifier,
            })]
        }

        // REPLACE or comment-only changes
        (Some(old_aggregate), Some(new_aggregate)) => {
            let mut steps = Vec::new();

            if aggregates_differ_structurally(old_aggregate, new_aggregate) {
                // Structural changes require replacement
                steps.push(MigrationStep::Aggregate(AggregateOperation::Replace {
                    old_aggregate: Box::new(old_aggregate.clone()),
                    new_aggregate: Box::new(new_aggregate.clone()),
                }));
            } else {
                // Only comments might have changed
                let comment_ops = comment_utils::handle_comment_diff(
                    Some(old_aggregate),
                    Some(new_aggregate),
                    || AggregateIdentifier::from_aggregate(new_aggregate),
                );
                for comment_op in comment_ops {
                    steps.push(MigrationStep::Aggregate(AggregateOperation::Comment(
                        comment_op,
                    )));
                }
            }

            steps
        }

        // No change
        (None, None) => vec![],
    }
}

/// Check if two aggregates differ in their structural properties
/// (everything except comments)
fn aggregates_differ_structurally(old: &Aggregate, new: &Aggregate) -> bool {
    // Compare the complete aggregate definitions - this handles all structural changes
    old.definition != new.definition
}
