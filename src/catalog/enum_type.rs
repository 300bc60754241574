//! src/catalog/enum_type
//! Fetches `CREATE TYPE ... AS ENUM` types (`pg_type.typtype = 'e'`).
use anyhow::Result;
use sqlx::{PgConnection, Row};

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub sort_order: f32,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub values: Vec<EnumValue>,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for EnumType {
    fn id(&self) -> ObjectId {
        ObjectId::Enum {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for EnumType {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<EnumType>> {
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
          AND t.typtype = 'e'
          AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let value_rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema,
            t.typname AS type_name,
            e.enumlabel AS value,
            e.enumsortorder AS sort_order
        FROM pg_enum e
        JOIN pg_type t ON e.enumtypid = t.oid
        JOIN pg_namespace n ON t.typnamespace = n.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
        ORDER BY n.nspname, t.typname, e.enumsortorder
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut values_by_type: std::collections::HashMap<(String, String), Vec<EnumValue>> =
        std::collections::HashMap::new();
    for row in value_rows {
        let schema: String = row.get("schema");
        let type_name: String = row.get("type_name");
        values_by_type
            .entry((schema, type_name))
            .or_default()
            .push(EnumValue {
                name: row.get("value"),
                sort_order: row.get("sort_order"),
            });
    }

    let mut enums = Vec::new();
    for row in type_rows {
        let schema: String = row.get("schema");
        let name: String = row.get("name");
        let values = values_by_type
            .remove(&(schema.clone(), name.clone()))
            .unwrap_or_default();
        let depends_on = super::utils::DependencyBuilder::new(schema.clone()).build();

        enums.push(EnumType {
            schema,
            name,
            owner: row.get("owner"),
            values,
            comment: row.get("comment"),
            depends_on,
        });
    }

    Ok(enums)
}
