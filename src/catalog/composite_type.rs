//! src/catalog/composite_type
//! Fetches `CREATE TYPE ... AS (...)` composite types (`pg_type.typtype = 'c'`)
//! that aren't a table/view's implicit row type.
use anyhow::Result;
use sqlx::{PgConnection, Row};

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};
use super::utils::{DependencyBuilder, is_system_schema};

#[derive(Debug, Clone)]
pub struct CompositeAttribute {
    pub name: String,
    pub type_name: String,
    pub type_schema: Option<String>,
    pub raw_type_name: Option<String>,
    pub attndims: i32,
}

#[derive(Debug, Clone)]
pub struct CompositeType {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub attributes: Vec<CompositeAttribute>,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for CompositeType {
    fn id(&self) -> ObjectId {
        ObjectId::CompositeType {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for CompositeType {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<CompositeType>> {
    let type_rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema,
            t.typname AS name,
            pg_get_userbyid(t.typowner) AS owner,
            d.description AS comment
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = t.oid AND d.objsubid = 0
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype = 'c'
          AND NOT EXISTS (
            SELECT 1 FROM pg_class c
            WHERE c.reltype = t.oid AND c.relkind IN ('r', 'v', 'm', 'S', 'f')
          )
          AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let attr_rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema,
            t.typname AS type_name,
            a.attname AS attr_name,
            format_type(a.atttypid, a.atttypmod) AS attr_type,
            tn.nspname AS attr_type_schema,
            attr_t.typname AS attr_type_name,
            COALESCE(a.attndims, 0)::int AS attndims
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        JOIN pg_class c ON t.typrelid = c.oid
        JOIN pg_attribute a ON c.oid = a.attrelid
        LEFT JOIN pg_type attr_t ON a.atttypid = attr_t.oid
        LEFT JOIN pg_namespace tn ON attr_t.typnamespace = tn.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype = 'c'
          AND a.attnum > 0
          AND NOT a.attisdropped
        ORDER BY n.nspname, t.typname, a.attnum
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut attrs_by_type: std::collections::HashMap<(String, String), Vec<CompositeAttribute>> =
        std::collections::HashMap::new();
    for row in attr_rows {
        let schema: String = row.get("schema");
        let type_name: String = row.get("type_name");
        attrs_by_type
            .entry((schema, type_name))
            .or_default()
            .push(CompositeAttribute {
                name: row.get("attr_name"),
                type_name: row.get("attr_type"),
                type_schema: row.get("attr_type_schema"),
                raw_type_name: row.get("attr_type_name"),
                attndims: row.get("attndims"),
            });
    }

    let mut types = Vec::new();
    for row in type_rows {
        let schema: String = row.get("schema");
        let name: String = row.get("name");
        let attributes = attrs_by_type
            .remove(&(schema.clone(), name.clone()))
            .unwrap_or_default();

        let mut builder = DependencyBuilder::new(schema.clone());
        for attr in &attributes {
            if let (Some(type_schema), Some(raw_type_name)) =
                (&attr.type_schema, &attr.raw_type_name)
                && !is_system_schema(type_schema)
            {
                let base_type_name = if attr.attndims > 0 {
                    raw_type_name.trim_start_matches('_').to_string()
                } else {
                    raw_type_name.clone()
                };
                builder.add_custom_type(Some(type_schema.clone()), Some(base_type_name));
            }
        }

        types.push(CompositeType {
            schema,
            name,
            owner: row.get("owner"),
            attributes,
            comment: row.get("comment"),
            depends_on: builder.build(),
        });
    }

    Ok(types)
}
