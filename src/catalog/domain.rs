//! src/catalog/domain
//! Fetches PostgreSQL domains (`pg_type.typtype = 'd'`) via pg_catalog.

use anyhow::Result;
use sqlx::{PgConnection, Row};
use tracing::debug;

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};
use super::utils::DependencyBuilder;

/// A CHECK constraint on a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCheckConstraint {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone)]
pub struct Domain {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub base_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub collation: Option<String>,
    pub check_constraints: Vec<DomainCheckConstraint>,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for Domain {
    fn id(&self) -> ObjectId {
        ObjectId::Domain {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for Domain {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Domain>> {
    debug!("fetching domains");
    let domain_rows = sqlx::query(
        r#"
        SELECT
            t.oid AS oid,
            n.nspname AS schema,
            t.typname AS name,
            pg_get_userbyid(t.typowner) AS owner,
            format_type(t.typbasetype, t.typtypmod) AS base_type,
            t.typnotnull AS not_null,
            pg_get_expr(t.typdefaultbin, 0) AS default_expr,
            CASE
                WHEN t.typcollation != 0 AND t.typcollation != (
                    SELECT oid FROM pg_collation WHERE collname = 'default'
                ) THEN (SELECT collname FROM pg_collation WHERE oid = t.typcollation)
                ELSE NULL
            END AS collation,
            d.description AS comment,
            CASE
                WHEN bt.typelem != 0 THEN elem_btn.nspname
                ELSE btn.nspname
            END AS base_type_schema,
            CASE
                WHEN bt.typelem != 0 THEN elem_bt.typname
                ELSE bt.typname
            END AS base_type_name,
            ext_types.extname IS NOT NULL AS is_base_type_extension,
            ext_types.extname AS base_type_extension_name,
            CASE
                WHEN bt.typelem != 0 THEN elem_bt.typtype::text
                ELSE bt.typtype::text
            END AS base_type_typtype
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        LEFT JOIN pg_type bt ON t.typbasetype = bt.oid
        LEFT JOIN pg_namespace btn ON bt.typnamespace = btn.oid
        LEFT JOIN pg_type elem_bt ON bt.typelem = elem_bt.oid AND bt.typelem != 0
        LEFT JOIN pg_namespace elem_btn ON elem_bt.typnamespace = elem_btn.oid
        LEFT JOIN pg_description d ON d.objoid = t.oid AND d.objsubid = 0
        LEFT JOIN (
            SELECT DISTINCT dep.objid AS type_oid, e.extname
            FROM pg_depend dep
            JOIN pg_extension e ON dep.refobjid = e.oid
            WHERE dep.deptype = 'e'
        ) ext_types ON ext_types.type_oid = COALESCE(NULLIF(bt.typelem, 0::oid), bt.oid)
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype = 'd'
          AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let check_rows = sqlx::query(
        r#"
        SELECT
            t.oid AS domain_oid,
            con.conname AS constraint_name,
            pg_get_constraintdef(con.oid, true) AS expression
        FROM pg_constraint con
        JOIN pg_type t ON con.contypid = t.oid
        JOIN pg_namespace n ON t.typnamespace = n.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype = 'd'
          AND con.contype = 'c'
        ORDER BY t.oid, con.conname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut constraints_by_domain: std::collections::HashMap<u32, Vec<DomainCheckConstraint>> =
        std::collections::HashMap::new();
    for row in check_rows {
        let domain_oid: u32 = row.get::<i64, _>("domain_oid") as u32;
        constraints_by_domain
            .entry(domain_oid)
            .or_default()
            .push(DomainCheckConstraint {
                name: row.get("constraint_name"),
                expression: row.get("expression"),
            });
    }

    let mut domains = Vec::new();
    for row in domain_rows {
        let schema: String = row.get("schema");
        let oid: u32 = row.get::<i64, _>("oid") as u32;
        let base_type_schema: Option<String> = row.get("base_type_schema");
        let base_type_name: Option<String> = row.get("base_type_name");
        let base_type_typtype: Option<String> = row.get("base_type_typtype");
        let is_base_type_extension: bool = row.get("is_base_type_extension");
        let base_type_extension_name: Option<String> = row.get("base_type_extension_name");

        let mut builder = DependencyBuilder::new(schema.clone());
        builder.add_type_dependency(
            base_type_schema,
            base_type_name,
            base_type_typtype,
            is_base_type_extension,
            base_type_extension_name,
        );

        domains.push(Domain {
            schema,
            name: row.get("name"),
            owner: row.get("owner"),
            base_type: row.get("base_type"),
            not_null: row.get("not_null"),
            default: row.get("default_expr"),
            collation: row.get("collation"),
            check_constraints: constraints_by_domain.remove(&oid).unwrap_or_default(),
            comment: row.get("comment"),
            depends_on: builder.build(),
        });
    }

    Ok(domains)
}
