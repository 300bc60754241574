//! Diff enum, composite, and range types.
//!
//! Each custom type kind gets its own comparison function since their
//! catalog representations (`EnumType`, `CompositeType`, `RangeType`)
//! diverged after the generic `CustomType` model was split by `typtype`.
//! All three still render through the shared `TypeOperation` so
//! `CREATE TYPE` / `DROP TYPE` / comment SQL stays uniform.
use crate::catalog::composite_type::CompositeType;
use crate::catalog::enum_type::EnumType;
use crate::catalog::range_type::RangeType;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, TypeIdentifier, TypeOperation};

fn type_id(schema: &str, name: &str) -> TypeIdentifier {
    TypeIdentifier {
        schema: schema.to_string(),
        name: name.to_string(),
    }
}

pub fn diff_enum(old: Option<&EnumType>, new: Option<&EnumType>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let values: Vec<String> = n.values.iter().map(|v| format!("'{}'", v.name)).collect();
            let mut steps = vec![MigrationStep::Type(TypeOperation::Create {
                schema: n.schema.clone(),
                name: n.name.clone(),
                kind: "ENUM".to_string(),
                definition: format!("({})", values.join(", ")),
            })];
            if let Some(comment_op) =
                comment_utils::handle_comment_creation(&n.comment, type_id(&n.schema, &n.name))
            {
                steps.push(MigrationStep::Type(TypeOperation::Comment(comment_op)));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Type(TypeOperation::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            let old_values: Vec<&String> = o.values.iter().map(|v| &v.name).collect();
            let new_values: Vec<&String> = n.values.iter().map(|v| &v.name).collect();

            if old_values == new_values {
                comment_utils::handle_comment_diff(Some(o), Some(n), || {
                    type_id(&n.schema, &n.name)
                })
                .into_iter()
                .map(|op| MigrationStep::Type(TypeOperation::Comment(op)))
                .collect()
            } else if old_values.iter().all(|v| new_values.contains(v)) {
                // Postgres allows adding enum values but never removing or reordering them.
                let added: Vec<&String> = n
                    .values
                    .iter()
                    .map(|v| &v.name)
                    .filter(|v| !old_values.contains(v))
                    .collect();

                if added.is_empty() {
                    return vec![
                        MigrationStep::Type(TypeOperation::Drop {
                            schema: o.schema.clone(),
                            name: o.name.clone(),
                        }),
                        diff_enum(None, Some(n)).remove(0),
                    ];
                }

                let mut steps = Vec::new();
                let mut after = o
                    .values
                    .iter()
                    .max_by(|a, b| {
                        a.sort_order
                            .partial_cmp(&b.sort_order)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|v| v.name.clone());

                for value in &added {
                    let clause = after
                        .as_ref()
                        .map(|v| format!(" AFTER '{}'", v))
                        .unwrap_or_default();
                    steps.push(MigrationStep::Type(TypeOperation::Alter {
                        schema: n.schema.clone(),
                        name: n.name.clone(),
                        action: "ADD VALUE".to_string(),
                        definition: format!("'{}'{}", value, clause),
                    }));
                    after = Some((*value).clone());
                }

                steps.extend(
                    comment_utils::handle_comment_diff(Some(o), Some(n), || {
                        type_id(&n.schema, &n.name)
                    })
                    .into_iter()
                    .map(|op| MigrationStep::Type(TypeOperation::Comment(op))),
                );
                steps
            } else {
                // Values removed or reordered - no ALTER TYPE for that, drop and recreate.
                vec![
                    MigrationStep::Type(TypeOperation::Drop {
                        schema: o.schema.clone(),
                        name: o.name.clone(),
                    }),
                    diff_enum(None, Some(n)).remove(0),
                ]
            }
        }
        (None, None) => Vec::new(),
    }
}

pub fn diff_composite(
    old: Option<&CompositeType>,
    new: Option<&CompositeType>,
) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let attrs: Vec<String> = n
                .attributes
                .iter()
                .map(|a| format!("{} {}", a.name, a.type_name))
                .collect();
            let mut steps = vec![MigrationStep::Type(TypeOperation::Create {
                schema: n.schema.clone(),
                name: n.name.clone(),
                kind: "COMPOSITE".to_string(),
                definition: format!("({})", attrs.join(", ")),
            })];
            if let Some(comment_op) =
                comment_utils::handle_comment_creation(&n.comment, type_id(&n.schema, &n.name))
            {
                steps.push(MigrationStep::Type(TypeOperation::Comment(comment_op)));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Type(TypeOperation::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            let old_attrs: Vec<(&String, &String)> = o
                .attributes
                .iter()
                .map(|a| (&a.name, &a.type_name))
                .collect();
            let new_attrs: Vec<(&String, &String)> = n
                .attributes
                .iter()
                .map(|a| (&a.name, &a.type_name))
                .collect();

            if old_attrs != new_attrs {
                return vec![
                    MigrationStep::Type(TypeOperation::Drop {
                        schema: o.schema.clone(),
                        name: o.name.clone(),
                    }),
                    diff_composite(None, Some(n)).remove(0),
                ];
            }

            comment_utils::handle_comment_diff(Some(o), Some(n), || type_id(&n.schema, &n.name))
                .into_iter()
                .map(|op| MigrationStep::Type(TypeOperation::Comment(op)))
                .collect()
        }
        (None, None) => Vec::new(),
    }
}

pub fn diff_range(old: Option<&RangeType>, new: Option<&RangeType>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Type(TypeOperation::Create {
                schema: n.schema.clone(),
                name: n.name.clone(),
                kind: "RANGE".to_string(),
                definition: format!("(SUBTYPE = {})", n.subtype_name),
            })];
            if let Some(comment_op) =
                comment_utils::handle_comment_creation(&n.comment, type_id(&n.schema, &n.name))
            {
                steps.push(MigrationStep::Type(TypeOperation::Comment(comment_op)));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Type(TypeOperation::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.subtype_name != n.subtype_name || o.subtype_schema != n.subtype_schema {
                return vec![
                    MigrationStep::Type(TypeOperation::Drop {
                        schema: o.schema.clone(),
                        name: o.name.clone(),
                    }),
                    diff_range(None, Some(n)).remove(0),
                ];
            }

            comment_utils::handle_comment_diff(Some(o), Some(n), || type_id(&n.schema, &n.name))
                .into_iter()
                .map(|op| MigrationStep::Type(TypeOperation::Comment(op)))
                .collect()
        }
        (None, None) => Vec::new(),
    }
}
