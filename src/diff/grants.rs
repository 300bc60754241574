//! Diff grants between catalogs.
//!
//! A grant's stable id already encodes `(grantee, object, privilege)`, so
//! the diff is a plain set comparison keyed by `id()`: present only in
//! `new` is a GRANT, present only in `old` is a REVOKE. Changed
//! `with_grant_option` on an otherwise-identical id is revoke-then-grant
//! rather than an in-place ALTER (Postgres has no `ALTER GRANT`).
use crate::catalog::grant::{Grant, GranteeType};
use crate::catalog::id::DependsOn;
use crate::diff::operations::{GrantOperation, MigrationStep};
use std::collections::BTreeMap;

/// Owner grants are implicit in PostgreSQL and never appear as an
/// explicit `GRANT`/`REVOKE` in the rendered migration.
fn is_owner_grant(grant: &Grant) -> bool {
    match &grant.grantee {
        GranteeType::Role(role_name) => role_name == &grant.object_owner,
        GranteeType::Public => false,
    }
}

pub fn diff_grants(old_grants: &[Grant], new_grants: &[Grant]) -> Vec<MigrationStep> {
    let mut old_map = BTreeMap::new();
    let mut new_map = BTreeMap::new();

    for grant in old_grants {
        if !is_owner_grant(grant) {
            old_map.insert(grant.id(), grant);
        }
    }
    for grant in new_grants {
        if !is_owner_grant(grant) {
            new_map.insert(grant.id(), grant);
        }
    }

    let all_ids: std::collections::BTreeSet<_> =
        old_map.keys().chain(new_map.keys()).cloned().collect();

    all_ids
        .into_iter()
        .filter_map(|id| match (old_map.get(&id), new_map.get(&id)) {
            (None, Some(new)) => Some(MigrationStep::Grant(GrantOperation::Grant {
                grant: (*new).clone(),
            })),
            (Some(old), None) => Some(MigrationStep::Grant(GrantOperation::Revoke {
                grant: (*old).clone(),
            })),
            (Some(old), Some(new)) if old.with_grant_option != new.with_grant_option => {
                Some(MigrationStep::Grant(GrantOperation::Grant {
                    grant: (*new).clone(),
                }))
            }
            _ => None,
        })
        .collect()
}
