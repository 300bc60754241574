//! Fetch grants/privileges from PostgreSQL system catalogs.
//!
//! Per §3.1, a grant is not its own catalog entity kind; it's a
//! `(grantee, object, privilege)` triple, one row per privilege rather
//! than grouped, so each can be independently diffed and ordered by the
//! sorter via `ObjectId::Grant`.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;

use super::id::{DependsOn, ObjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GranteeType {
    Role(String),
    Public,
}

impl GranteeType {
    fn as_str(&self) -> &str {
        match self {
            GranteeType::Role(name) => name,
            GranteeType::Public => "PUBLIC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    Table { schema: String, name: String },
    View { schema: String, name: String },
    Schema { name: String },
    Function { schema: String, name: String },
    Sequence { schema: String, name: String },
    Type { schema: String, name: String },
}

impl ObjectType {
    pub fn db_object_id(&self) -> ObjectId {
        match self {
            ObjectType::Table { schema, name } => ObjectId::Table {
                schema: schema.clone(),
                name: name.clone(),
            },
            ObjectType::View { schema, name } => ObjectId::View {
                schema: schema.clone(),
                name: name.clone(),
            },
            ObjectType::Schema { name } => ObjectId::Schema { name: name.clone() },
            ObjectType::Function { schema, name } => ObjectId::Function {
                schema: schema.clone(),
                name: name.clone(),
                arguments: String::new(),
            },
            ObjectType::Sequence { schema, name } => ObjectId::Sequence {
                schema: schema.clone(),
                name: name.clone(),
            },
            // Not carrying typtype here; see diff::operations::types::type_object_id
            // for the same simplification.
            ObjectType::Type { schema, name } => ObjectId::Enum {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    /// The schema this object's grant is scoped to, for filtering
    /// purposes. For a schema-level grant, that's the schema itself.
    pub fn schema(&self) -> &str {
        match self {
            ObjectType::Table { schema, .. }
            | ObjectType::View { schema, .. }
            | ObjectType::Function { schema, .. }
            | ObjectType::Sequence { schema, .. }
            | ObjectType::Type { schema, .. } => schema,
            ObjectType::Schema { name } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grant {
    pub grantee: GranteeType,
    pub object: ObjectType,
    pub privilege: String,
    pub with_grant_option: bool,
    pub object_owner: String,
    depends_on: [ObjectId; 1],
}

impl Grant {
    fn new(
        grantee: GranteeType,
        object: ObjectType,
        privilege: String,
        with_grant_option: bool,
        object_owner: String,
    ) -> Self {
        let depends_on = [object.db_object_id()];
        Self {
            grantee,
            object,
            privilege,
            with_grant_option,
            object_owner,
            depends_on,
        }
    }
}

impl DependsOn for Grant {
    fn id(&self) -> ObjectId {
        ObjectId::Grant {
            grantee: self.grantee.as_str().to_string(),
            object: Box::new(self.object.db_object_id()),
            privilege: self.privilege.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let mut grants = Vec::new();
    grants.extend(fetch_table_privileges(&mut *conn).await?);
    grants.extend(fetch_view_privileges(&mut *conn).await?);
    grants.extend(fetch_schema_privileges(&mut *conn).await?);
    grants.extend(fetch_function_privileges(&mut *conn).await?);
    grants.extend(fetch_sequence_privileges(&mut *conn).await?);
    grants.extend(fetch_type_privileges(&mut *conn).await?);
    Ok(grants)
}

fn grantee_of(raw: &str) -> GranteeType {
    if raw == "PUBLIC" {
        GranteeType::Public
    } else {
        GranteeType::Role(raw.to_string())
    }
}

async fn fetch_table_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            c.relname as table_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        JOIN pg_roles owner_role ON c.relowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(c.relacl, acldefault('r', c.relowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND c.relkind = 'r'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let schema: String = row.get("schema_name");
            let table: String = row.get("table_name");
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::Table { schema, name: table },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}

async fn fetch_view_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            c.relname as view_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        JOIN pg_roles owner_role ON c.relowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(c.relacl, acldefault('r', c.relowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND c.relkind IN ('v', 'm')
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let schema: String = row.get("schema_name");
            let view: String = row.get("view_name");
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::View { schema, name: view },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}

async fn fetch_schema_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_namespace n
        JOIN pg_roles owner_role ON n.nspowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(n.nspacl, acldefault('n', n.nspowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast', 'public')
          AND NOT n.nspname LIKE 'pg_temp_%'
          AND NOT n.nspname LIKE 'pg_toast_temp_%'
        ORDER BY n.nspname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::Schema {
                    name: row.get("schema_name"),
                },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}

async fn fetch_function_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            p.proname as function_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_proc p
        JOIN pg_namespace n ON p.pronamespace = n.oid
        JOIN pg_roles owner_role ON p.proowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(p.proacl, acldefault('f', p.proowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep WHERE dep.objid = p.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, p.proname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let schema: String = row.get("schema_name");
            let name: String = row.get("function_name");
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::Function { schema, name },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}

async fn fetch_sequence_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            c.relname as sequence_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        JOIN pg_roles owner_role ON c.relowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(c.relacl, acldefault('S', c.relowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND c.relkind = 'S'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let schema: String = row.get("schema_name");
            let name: String = row.get("sequence_name");
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::Sequence { schema, name },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}

async fn fetch_type_privileges(conn: &mut PgConnection) -> Result<Vec<Grant>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname as schema_name,
            t.typname as type_name,
            CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END as grantee,
            acl.privilege_type as privilege_type,
            acl.is_grantable as is_grantable,
            owner_role.rolname as object_owner
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        JOIN pg_roles owner_role ON t.typowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(t.typacl, acldefault('T', t.typowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND t.typtype IN ('e', 'd', 'c')
          AND NOT EXISTS (
              SELECT 1 FROM pg_class c
              WHERE c.relname = t.typname
                AND c.relnamespace = t.typnamespace
                AND c.relkind IN ('r', 'v', 'm', 'S')
          )
          AND NOT t.typname LIKE '\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname, grantee, acl.privilege_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let schema: String = row.get("schema_name");
            let name: String = row.get("type_name");
            Grant::new(
                grantee_of(&row.get::<String, _>("grantee")),
                ObjectType::Type { schema, name },
                row.get("privilege_type"),
                row.get("is_grantable"),
                row.get("object_owner"),
            )
        })
        .collect())
}
