//! src/catalog/range_type
//! Fetches `CREATE TYPE ... AS RANGE` types (`pg_type.typtype = 'r'`).
use anyhow::Result;
use sqlx::{PgConnection, Row};

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};
use super::utils::{DependencyBuilder, is_system_schema};

#[derive(Debug, Clone)]
pub struct RangeType {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub subtype_schema: Option<String>,
    pub subtype_name: String,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for RangeType {
    fn id(&self) -> ObjectId {
        ObjectId::Range {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for RangeType {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<RangeType>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema,
            t.typname AS name,
            pg_get_userbyid(t.typowner) AS owner,
            stn.nspname AS subtype_schema,
            st.typname AS subtype_name,
            d.description AS comment
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        JOIN pg_range r ON r.rngtypid = t.oid
        JOIN pg_type st ON r.rngsubtype = st.oid
        JOIN pg_namespace stn ON st.typnamespace = stn.oid
        LEFT JOIN pg_description d ON d.objoid = t.oid AND d.objsubid = 0
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype = 'r'
          AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut ranges = Vec::new();
    for row in rows {
        let schema: String = row.get("schema");
        let subtype_schema: Option<String> = row.get("subtype_schema");
        let subtype_name: String = row.get("subtype_name");

        let mut builder = DependencyBuilder::new(schema.clone());
        if let Some(sub_schema) = &subtype_schema
            && !is_system_schema(sub_schema)
        {
            builder.add_custom_type(Some(sub_schema.clone()), Some(subtype_name.clone()));
        }

        ranges.push(RangeType {
            schema,
            name: row.get("name"),
            owner: row.get("owner"),
            subtype_schema,
            subtype_name,
            comment: row.get("comment"),
            depends_on: builder.build(),
        });
    }

    Ok(ranges)
}
