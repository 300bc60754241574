//! src/catalog/sequence
use anyhow::Result;
use sqlx::{PgConnection, Row};
use tracing::debug;

use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};
use super::utils::DependencyBuilder;

#[derive(Debug, Clone)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub data_type: String,
    pub start_value: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub increment: i64,
    pub cycle: bool,
    pub owned_by: Option<String>,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for Sequence {
    fn id(&self) -> ObjectId {
        ObjectId::Sequence {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for Sequence {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Sequence>> {
    debug!("fetching sequences");
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema_name,
            c.relname AS sequence_name,
            pg_get_userbyid(c.relowner) AS owner,
            t.typname AS data_type,
            COALESCE(seq.seqstart, 1) AS start_value,
            COALESCE(seq.seqmin, 1) AS min_value,
            COALESCE(seq.seqmax, 9223372036854775807) AS max_value,
            COALESCE(seq.seqincrement, 1) AS increment_by,
            COALESCE(seq.seqcycle, false) AS cycle,
            CASE
                WHEN d.objid IS NOT NULL AND d.refobjid IS NOT NULL THEN
                    ref_n.nspname || '.' || ref_c.relname || '.' || ref_a.attname
            END AS owned_by,
            comment_d.description AS comment
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_sequence seq ON seq.seqrelid = c.oid
        LEFT JOIN pg_type t ON seq.seqtypid = t.oid
        LEFT JOIN pg_depend d ON d.objid = c.oid
            AND d.classid = 'pg_class'::regclass
            AND d.objsubid = 0
            AND d.refclassid = 'pg_class'::regclass
            AND d.refobjsubid > 0
            AND d.deptype = 'a'
        LEFT JOIN pg_class ref_c ON d.refobjid = ref_c.oid
        LEFT JOIN pg_namespace ref_n ON ref_c.relnamespace = ref_n.oid
        LEFT JOIN pg_attribute ref_a ON ref_a.attrelid = ref_c.oid AND ref_a.attnum = d.refobjsubid
        LEFT JOIN pg_description comment_d ON comment_d.objoid = c.oid AND comment_d.objsubid = 0
        WHERE c.relkind = 'S'
            AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
            AND NOT EXISTS (
                SELECT 1 FROM pg_depend ext_dep
                WHERE ext_dep.objid = c.oid AND ext_dep.deptype = 'e'
            )
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut sequences = Vec::new();
    for row in rows {
        let schema: String = row.get("schema_name");
        let raw_data_type: String = row
            .get::<Option<String>, _>("data_type")
            .unwrap_or_else(|| "integer".to_string());
        let data_type = match raw_data_type.as_str() {
            "int4" => "integer".to_string(),
            "int8" => "bigint".to_string(),
            "int2" => "smallint".to_string(),
            _ => raw_data_type,
        };

        // Ownership of a SERIAL-backed sequence is handled as an ALTER SEQUENCE OWNED BY
        // step, not as a dependency edge: making the sequence depend on its owning table
        // would create a cycle with the table's column default depending on the sequence.
        let depends_on = DependencyBuilder::new(schema.clone()).build();

        sequences.push(Sequence {
            schema,
            name: row.get("sequence_name"),
            owner: row.get("owner"),
            data_type,
            start_value: row.get("start_value"),
            min_value: row.get("min_value"),
            max_value: row.get("max_value"),
            increment: row.get("increment_by"),
            cycle: row.get("cycle"),
            owned_by: row.get("owned_by"),
            comment: row.get("comment"),
            depends_on,
        });
    }

    Ok(sequences)
}
