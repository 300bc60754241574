//! src/catalog/view.rs
//! Fetch views and their dependencies via pg_depend + pg_rewrite
use super::comments::Commentable;
use super::id::{DependsOn, ObjectId};
use super::utils::is_system_schema;
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use sqlx::postgres::types::Oid;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewColumn {
    pub name: String,
    pub type_: Option<String>,
}

#[derive(Debug, Clone)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub definition: String,
    pub columns: Vec<ViewColumn>,
    pub security_invoker: bool,
    pub security_barrier: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl DependsOn for View {
    fn id(&self) -> ObjectId {
        ObjectId::View {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for View {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

struct RawView {
    view_oid: Oid,
    schema: String,
    name: String,
    owner: String,
    definition: String,
    security_invoker: bool,
    security_barrier: bool,
    comment: Option<String>,
}

fn normalize_type(data_type: &str, udt_name: &str) -> String {
    if data_type == "ARRAY" {
        match udt_name {
            "_int4" => "integer[]".to_string(),
            "_text" => "text[]".to_string(),
            "_varchar" => "character varying[]".to_string(),
            "_bool" => "boolean[]".to_string(),
            _ => format!("{}[]", udt_name.trim_start_matches('_')),
        }
    } else {
        data_type.to_string()
    }
}

/// Fetch all non-system views, then populate `depends_on` via pg_depend.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<View>> {
    let rows = sqlx::query(
        r#"
        SELECT
          c.oid AS view_oid,
          n.nspname AS schema,
          c.relname AS name,
          pg_get_userbyid(c.relowner) AS owner,
          pg_catalog.pg_get_viewdef(c.oid, true) AS definition,
          COALESCE((
              SELECT option_value = 'true' FROM pg_options_to_table(c.reloptions)
              WHERE option_name = 'security_invoker'
          ), false) AS security_invoker,
          COALESCE((
              SELECT option_value = 'true' FROM pg_options_to_table(c.reloptions)
              WHERE option_name = 'security_barrier'
          ), false) AS security_barrier,
          d.description AS comment
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = c.oid AND d.objsubid = 0
        WHERE c.relkind = 'v'
          AND n.nspname NOT IN ('pg_catalog','information_schema', 'pg_toast')
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let raw: Vec<RawView> = rows
        .into_iter()
        .map(|row| RawView {
            view_oid: row.get("view_oid"),
            schema: row.get("schema"),
            name: row.get("name"),
            owner: row.get("owner"),
            definition: row.get("definition"),
            security_invoker: row.get("security_invoker"),
            security_barrier: row.get("security_barrier"),
            comment: row.get("comment"),
        })
        .collect();

    let column_rows = sqlx::query(
        r#"
        SELECT
            table_schema AS schema,
            table_name AS table_name,
            column_name AS name,
            data_type AS data_type,
            udt_name AS udt_name
        FROM information_schema.columns
        WHERE table_schema NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
          AND table_schema NOT LIKE 'pg\_temp\_%'
          AND table_name IN (
              SELECT table_name FROM information_schema.views
              WHERE table_schema NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
                AND table_schema NOT LIKE 'pg\_temp\_%'
          )
        ORDER BY ordinal_position
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut columns_by_view: HashMap<(String, String), Vec<ViewColumn>> = HashMap::new();
    for col in column_rows {
        let schema: String = col.get("schema");
        let table_name: String = col.get("table_name");
        let data_type: String = col.get("data_type");
        let udt_name: String = col.get("udt_name");
        columns_by_view
            .entry((schema, table_name))
            .or_default()
            .push(ViewColumn {
                name: col.get("name"),
                type_: Some(normalize_type(&data_type, &udt_name)),
            });
    }

    let mut views: Vec<View> = raw
        .iter()
        .map(|r| {
            let key = (r.schema.clone(), r.name.clone());
            let columns = columns_by_view.remove(&key).unwrap_or_default();

            View {
                schema: r.schema.clone(),
                name: r.name.clone(),
                owner: r.owner.clone(),
                definition: r.definition.clone(),
                columns,
                security_invoker: r.security_invoker,
                security_barrier: r.security_barrier,
                comment: r.comment.clone(),
                depends_on: Vec::new(),
            }
        })
        .collect();

    let mut oid_to_idx: HashMap<Oid, usize> = HashMap::with_capacity(raw.len());
    let view_oids: Vec<Oid> = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            oid_to_idx.insert(r.view_oid, i);
            r.view_oid
        })
        .collect();

    let deps = sqlx::query(
        r#"
        SELECT
          r.ev_class AS view_oid,
          cls.relkind::text AS cls_relkind,
          cls_n.nspname AS cls_schema,
          cls.relname AS cls_name,
          typ.typname AS typ_name,
          typ_n.nspname AS typ_schema,
          (
            SELECT e.extname
            FROM pg_depend typ_dep
            JOIN pg_extension e ON typ_dep.refobjid = e.oid
            WHERE typ_dep.objid = typ.oid AND typ_dep.deptype = 'e'
            LIMIT 1
          ) AS typ_extension_name,
          proc.proname AS proc_name,
          proc_n.nspname AS proc_schema,
          (
            SELECT e.extname
            FROM pg_depend proc_dep
            JOIN pg_extension e ON proc_dep.refobjid = e.oid
            WHERE proc_dep.objid = proc.oid AND proc_dep.deptype = 'e'
            LIMIT 1
          ) AS proc_extension_name
        FROM pg_rewrite r
        JOIN pg_depend d ON d.classid = 'pg_rewrite'::regclass::oid AND d.objid = r.oid
        LEFT JOIN pg_class cls ON d.refclassid = 'pg_class'::regclass::oid AND d.refobjid = cls.oid
        LEFT JOIN pg_namespace cls_n ON cls.relnamespace = cls_n.oid
        LEFT JOIN pg_type typ ON d.refclassid = 'pg_type'::regclass::oid AND d.refobjid = typ.oid
        LEFT JOIN pg_namespace typ_n ON typ.typnamespace = typ_n.oid
        LEFT JOIN pg_proc proc ON d.refclassid = 'pg_proc'::regclass::oid AND d.refobjid = proc.oid
        LEFT JOIN pg_namespace proc_n ON proc.pronamespace = proc_n.oid
        WHERE r.ev_class = ANY($1)
        "#,
    )
    .bind(&view_oids)
    .fetch_all(&mut *conn)
    .await?;

    for d in deps {
        let view_oid: Oid = d.get("view_oid");
        if let Some(&idx) = oid_to_idx.get(&view_oid) {
            let view_id = views[idx].id();
            let v = &mut views[idx].depends_on;

            let cls_relkind: Option<String> = d.get("cls_relkind");
            if let Some(relkind) = cls_relkind.as_deref() {
                let cls_schema: Option<String> = d.get("cls_schema");
                let cls_name: Option<String> = d.get("cls_name");
                let dep = match relkind {
                    "r" | "p" => ObjectId::Table {
                        schema: cls_schema.unwrap(),
                        name: cls_name.unwrap(),
                    },
                    "v" | "m" => ObjectId::View {
                        schema: cls_schema.unwrap(),
                        name: cls_name.unwrap(),
                    },
                    _ => continue,
                };
                if dep != view_id {
                    v.push(dep);
                }
                continue;
            }

            let typ_name: Option<String> = d.get("typ_name");
            let typ_schema: Option<String> = d.get("typ_schema");
            if let (Some(name), Some(ns)) = (typ_name, typ_schema) {
                if !is_system_schema(&ns) {
                    let typ_extension_name: Option<String> = d.get("typ_extension_name");
                    if let Some(ext_name) = typ_extension_name {
                        v.push(ObjectId::Extension { name: ext_name });
                    } else {
                        let base_type_name = if name.starts_with('_') {
                            name.trim_start_matches('_').to_string()
                        } else {
                            name
                        };
                        v.push(ObjectId::Enum {
                            schema: ns,
                            name: base_type_name,
                        });
                    }
                }
                continue;
            }

            let proc_name: Option<String> = d.get("proc_name");
            let proc_schema: Option<String> = d.get("proc_schema");
            if let (Some(name), Some(ns)) = (proc_name, proc_schema)
                && !is_system_schema(&ns)
            {
                let proc_extension_name: Option<String> = d.get("proc_extension_name");
                if let Some(ext_name) = proc_extension_name {
                    v.push(ObjectId::Extension { name: ext_name });
                } else {
                    v.push(ObjectId::Function {
                        schema: ns,
                        name,
                        arguments: String::new(),
                    });
                }
            }
        }
    }

    for view in &mut views {
        let unique_deps: HashSet<_> = view.depends_on.drain(..).collect();
        view.depends_on.extend(unique_deps);

        if view.schema != "public" {
            view.depends_on.push(ObjectId::Schema {
                name: view.schema.clone(),
            });
        }
    }

    Ok(views)
}
