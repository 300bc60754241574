//! src/catalog/schema
//! Fetches schemas (`pg_namespace`) from a live cluster.
use anyhow::Result;
use sqlx::{PgConnection, Row};

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub owner: String,
    pub comment: Option<String>,
}

impl DependsOn for Schema {
    fn id(&self) -> ObjectId {
        ObjectId::Schema {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &[]
    }
}

impl Commentable for Schema {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Schema>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS name,
            pg_get_userbyid(n.nspowner) AS owner,
            d.description AS comment
        FROM pg_namespace n
        LEFT JOIN pg_description d ON d.objoid = n.oid AND d.objsubid = 0
        WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_temp\_%'
          AND n.nspname NOT LIKE 'pg\_toast\_temp\_%'
        ORDER BY n.nspname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Schema {
            name: row.get("name"),
            owner: row.get("owner"),
            comment: row.get("comment"),
        })
        .collect())
}
