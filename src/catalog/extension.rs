//! src/catalog/extension
use anyhow::Result;
use sqlx::{PgConnection, Row};
use tracing::debug;

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub schema: String,
    pub version: String,
    pub relocatable: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for Extension {
    fn id(&self) -> ObjectId {
        ObjectId::Extension {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for Extension {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Extension>> {
    debug!("fetching extensions");
    let rows = sqlx::query(
        r#"
        SELECT
            e.extname AS name,
            n.nspname AS schema,
            e.extversion AS version,
            e.extrelocatable AS relocatable,
            d.description AS comment
        FROM pg_extension e
        JOIN pg_namespace n ON e.extnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = e.oid AND d.objsubid = 0
        WHERE e.extname NOT IN ('plpgsql')
        ORDER BY e.extname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in rows {
        let schema: String = row.get("schema");
        let mut depends_on = Vec::new();
        if schema != "public" {
            depends_on.push(ObjectId::Schema {
                name: schema.clone(),
            });
        }

        result.push(Extension {
            name: row.get("name"),
            schema,
            version: row.get("version"),
            relocatable: row.get("relocatable"),
            comment: row.get("comment"),
            depends_on,
        });
    }

    Ok(result)
}
