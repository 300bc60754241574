use anyhow::Result;
use sqlx::PgConnection;
use sqlx::Row;
use sqlx::postgres::types::Oid;
use std::collections::HashMap;

use super::comments::Commentable;
use super::id::{ObjectId, DependsOn};
use super::utils::{DependencyBuilder, is_system_schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Procedure,
    Aggregate,
}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub data_type: String,
    pub mode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub schema: String,
    pub name: String,
    /// Identity argument list as reported by `pg_get_function_identity_arguments`,
    /// used to disambiguate overloaded functions/procedures.
    pub arguments: String,
    pub kind: FunctionKind,
    pub parameters: Vec<FunctionParam>,
    pub return_type: Option<String>,
    pub language: String,
    pub definition: String,
    pub volatility: String,
    pub is_strict: bool,
    pub security_type: String,
    pub comment: Option<String>,
    pub depends_on: Vec<ObjectId>,
}

impl Function {
    pub fn id(&self) -> ObjectId {
        ObjectId::Function {
            schema: self.schema.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

impl DependsOn for Function {
    fn id(&self) -> ObjectId {
        ObjectId::Function {
            schema: self.schema.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
        }
    }

    fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

impl Commentable for Function {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Populate function dependencies using pg_depend.
///
/// **Important limitation**: PostgreSQL does NOT record table/view/sequence references
/// from function bodies in pg_depend. This is a fundamental PostgreSQL limitation that
/// affects all procedural languages (SQL, PL/pgSQL, etc.).
///
/// This function currently only captures:
/// - Type dependencies from function parameters and return types
/// - Dependencies that PostgreSQL explicitly records in pg_depend
///
/// For function body dependencies (tables/views/sequences referenced in the code),
/// use file-based dependencies via `-- require:` comments in schema files.
async fn populate_function_dependencies(
    functions: &mut [Function],
    conn: &mut PgConnection,
) -> Result<()> {
    // Query dependencies for all functions in our list by schema/name
    // This is less efficient than querying by OID, but simpler for now
    for function in functions.iter_mut() {
        let deps = sqlx::query(
            r#"
            SELECT DISTINCT
                d.refclassid,
                d.refobjid,

                -- Table or view reference
                cls.relkind::text AS cls_relkind,
                cls_n.nspname AS cls_schema,
                cls.relname AS cls_name,

                -- Type reference
                typ.typname AS typ_name,
                typ_n.nspname AS typ_schema,

                -- Function reference
                proc.proname AS proc_name,
                proc_n.nspname AS proc_schema,
                pg_catalog.pg_get_function_identity_arguments(proc.oid) AS proc_args,

                -- Sequence reference
                seq_cls.relname AS seq_name,
                seq_n.nspname AS seq_schema

            FROM pg_proc p
            JOIN pg_depend d ON d.objid = p.oid

            -- Table/view reference
            LEFT JOIN pg_class cls
                ON d.refclassid = 'pg_class'::regclass::oid
                AND d.refobjid = cls.oid
                AND cls.relkind IN ('r', 'v', 'm', 'p') -- tables, views, materialized views, partitioned tables
            LEFT JOIN pg_namespace cls_n ON cls.relnamespace = cls_n.oid

            -- Type reference
            LEFT JOIN pg_type typ
                ON d.refclassid = 'pg_type'::regclass::oid
                AND d.refobjid = typ.oid
            LEFT JOIN pg_namespace typ_n ON typ.typnamespace = typ_n.oid

            -- Function reference
            LEFT JOIN pg_proc proc
                ON d.refclassid = 'pg_proc'::regclass::oid
                AND d.refobjid = proc.oid
                AND proc.oid != p.oid  -- Don't include self-references
            LEFT JOIN pg_namespace proc_n ON proc.pronamespace = proc_n.oid

            -- Sequence reference
            LEFT JOIN pg_class seq_cls
                ON d.refclassid = 'pg_class'::regclass::oid
                AND d.refobjid = seq_cls.oid
                AND seq_cls.relkind = 'S' -- sequences
            LEFT JOIN pg_namespace seq_n ON seq_cls.relnamespace = seq_n.oid

            WHERE p.pronamespace = (SELECT oid FROM pg_namespace WHERE nspname = $1)
                AND p.proname = $2
                AND d.deptype = 'n'  -- normal dependencies
                AND d.refclassid IN (
                    'pg_class'::regclass::oid,    -- tables, views, sequences
                    'pg_type'::regclass::oid,     -- types
                    'pg_proc'::regclass::oid      -- functions
                )
            "#,
        )
        .bind(&function.schema)
        .bind(&function.name)
        .fetch_all(&mut *conn)
        .await?;

        for dep in deps {
            let function_id = function.id();

            let cls_relkind: Option<String> = dep.get("cls_relkind");
            let cls_schema: Option<String> = dep.get("cls_schema");
            let cls_name: Option<String> = dep.get("cls_name");
            let typ_schema: Option<String> = dep.get("typ_schema");
            let typ_name: Option<String> = dep.get("typ_name");
            let proc_schema: Option<String> = dep.get("proc_schema");
            let proc_name: Option<String> = dep.get("proc_name");
            let proc_args: Option<String> = dep.get("proc_args");
            let seq_schema: Option<String> = dep.get("seq_schema");
            let seq_name: Option<String> = dep.get("seq_name");

            // Table or view dependency
            if let Some(relkind) = cls_relkind.as_deref() {
                if let (Some(schema), Some(name)) = (cls_schema, cls_name) {
                    // Skip system schemas
                    if is_system_schema(&schema) {
                        continue;
                    }

                    let dep_id = match relkind {
                        "r" | "p" => ObjectId::Table { schema, name },
                        "v" | "m" => ObjectId::View { schema, name },
                        "S" => ObjectId::Sequence { schema, name },
                        _ => continue,
                    };

                    if dep_id != function_id && !function.depends_on.contains(&dep_id) {
                        function.depends_on.push(dep_id);
                    }
                }
                continue;
            }

            // Type dependency (beyond what DependencyBuilder already added)
            if let (Some(typ_schema), Some(typ_name)) = (typ_schema, typ_name) {
                if !is_system_schema(&typ_schema) {
                    let dep_id = ObjectId::Enum {
                        schema: typ_schema,
                        name: typ_name,
                    };
                    if !function.depends_on.contains(&dep_id) {
                        function.depends_on.push(dep_id);
                    }
                }
                continue;
            }

            // Function dependency
            if let (Some(proc_schema), Some(proc_name)) = (proc_schema, proc_name) {
                if !is_system_schema(&proc_schema) {
                    let dep_id = ObjectId::Function {
                        schema: proc_schema,
                        name: proc_name,
                        arguments: proc_args.unwrap_or_default(),
                    };
                    if dep_id != function_id && !function.depends_on.contains(&dep_id) {
                        function.depends_on.push(dep_id);
                    }
                }
                continue;
            }

            // Sequence dependency
            if let (Some(seq_schema), Some(seq_name)) = (seq_schema, seq_name)
                && !is_system_schema(&seq_schema)
            {
                let dep_id = ObjectId::Sequence {
                    schema: seq_schema,
                    name: seq_name,
                };
                if !function.depends_on.contains(&dep_id) {
                    function.depends_on.push(dep_id);
                }
            }
        }
    }

    Ok(())
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Function>> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname AS schema,
            p.proname AS name,
            p.oid AS func_oid,
            p.prokind::text AS kind,
            pg_catalog.pg_get_function_result(p.oid) AS return_type,
            pg_catalog.pg_get_function_identity_arguments(p.oid) AS arguments,
            pg_catalog.pg_get_functiondef(p.oid) AS definition,
            l.lanname AS language,
            p.provolatile::text AS volatility,
            p.proisstrict AS is_strict,
            p.prosecdef AS security_definer,
            p.proretset AS returns_set,
            p.pronargs AS num_args,
            ret_type.typname AS return_type_name,
            ret_ns.nspname AS return_type_schema,
            d.description AS comment
        FROM pg_proc p
        JOIN pg_namespace n ON p.pronamespace = n.oid
        JOIN pg_language l ON p.prolang = l.oid
        LEFT JOIN pg_type ret_type ON p.prorettype = ret_type.oid
        LEFT JOIN pg_namespace ret_ns ON ret_type.typnamespace = ret_ns.oid
        LEFT JOIN pg_description d ON d.objoid = p.oid AND d.objsubid = 0
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
        -- Exclude functions that belong to extensions
        AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = p.oid
            AND dep.deptype = 'e'
        )
        ORDER BY n.nspname, p.proname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    // Query function parameter types with proper schema information
    let param_rows = sqlx::query(
        r#"
        SELECT
            p.oid AS func_oid,
            t.typname AS type_name,
            tn.nspname AS type_schema,
            pg_catalog.format_type(t.oid, NULL) AS formatted_type,
            COALESCE(p.proargnames[param_num], '') AS param_name,
            p.proargmodes[param_num - 1] AS param_mode
        FROM pg_proc p
        JOIN pg_namespace n ON p.pronamespace = n.oid
        CROSS JOIN LATERAL unnest(p.proargtypes) WITH ORDINALITY AS param_types(type_oid, param_num)
        JOIN pg_type t ON param_types.type_oid = t.oid
        JOIN pg_namespace tn ON t.typnamespace = tn.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
        -- Exclude functions that belong to extensions
        AND NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = p.oid
            AND dep.deptype = 'e'
        )
        ORDER BY p.oid, param_types.param_num
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    // Group parameters by function OID
    let mut params_by_function: HashMap<Oid, Vec<FunctionParam>> = HashMap::new();
    for param in param_rows {
        let func_oid: Oid = param.get("func_oid");
        let type_name: String = param.get("type_name");
        let type_schema: String = param.get("type_schema");
        let formatted_type: String = param.get("formatted_type");
        let param_name: String = param.get("param_name");
        let param_mode: Option<i8> = param.get("param_mode");

        let param_name = if param_name.is_empty() {
            None
        } else {
            Some(param_name)
        };

        // Build qualified type name for custom types
        let data_type = if is_system_schema(&type_schema) {
            formatted_type
        } else {
            format!("{}.{}", type_schema, type_name)
        };

        params_by_function
            .entry(func_oid)
            .or_default()
            .push(FunctionParam {
                name: param_name,
                data_type,
                mode: param_mode.map(|m| match m as u8 as char {
                    'i' => "IN".to_string(),
                    'o' => "OUT".to_string(),
                    'b' => "INOUT".to_string(),
                    'v' => "VARIADIC".to_string(),
                    't' => "TABLE".to_string(),
                    _ => "IN".to_string(),
                }),
            });
    }

    // Process results into functions
    let mut functions = Vec::new();
    for row in rows {
        let schema: String = row.get("schema");
        let name: String = row.get("name");
        let func_oid: Oid = row.get("func_oid");
        let kind_code: String = row.get("kind");
        let return_type_raw: Option<String> = row.get("return_type");
        let arguments: String = row.get("arguments");
        let definition: String = row.get("definition");
        let language: String = row.get("language");
        let volatility_code: String = row.get("volatility");
        let is_strict_flag: bool = row.get("is_strict");
        let security_definer: bool = row.get("security_definer");
        let num_args: i16 = row.get("num_args");
        let return_type_name: Option<String> = row.get("return_type_name");
        let return_type_schema: Option<String> = row.get("return_type_schema");
        let comment: Option<String> = row.get("comment");

        // Get parameters for this function
        let parameters = params_by_function.remove(&func_oid).unwrap_or_default();

        // Check if this function has OUT/INOUT parameters that we don't support yet
        if parameters.len() as i16 != num_args {
            return Err(anyhow::anyhow!(
                "Function {}.{} has OUT/INOUT parameters which are not yet supported. \
                 Found {} IN parameters but function has {} total parameters.",
                schema,
                name,
                parameters.len(),
                num_args
            ));
        }

        // Determine function kind
        let kind = match kind_code.as_str() {
            "p" => FunctionKind::Procedure,
            "a" => FunctionKind::Aggregate,
            _ => FunctionKind::Function,
        };

        // Parse the return type
        let return_type = if kind == FunctionKind::Procedure {
            None
        } else {
            return_type_raw
        };

        // Build basic dependencies using DependencyBuilder (schema + custom types)
        let mut builder = DependencyBuilder::new(schema.clone());

        // Add dependencies for parameter types that are custom types
        for param in &parameters {
            if let Some((param_schema, param_name)) = param.data_type.split_once('.')
                && !is_system_schema(param_schema)
            {
                builder
                    .add_custom_type(Some(param_schema.to_string()), Some(param_name.to_string()));
            }
        }

        // Add dependency for return type if it's a custom type
        if let (Some(ret_name), Some(ret_schema)) = (&return_type_name, &return_type_schema)
            && !is_system_schema(ret_schema)
        {
            builder.add_custom_type(Some(ret_schema.clone()), Some(ret_name.clone()));
        }

        let depends_on = builder.build();

        let security_type = if security_definer {
            "DEFINER".to_string()
        } else {
            "INVOKER".to_string()
        };

        functions.push(Function {
            schema,
            name,
            arguments,
            kind,
            parameters,
            return_type,
            language,
            definition, // Use complete definition from pg_get_functiondef()
            volatility: match volatility_code.as_str() {
                "i" => "IMMUTABLE".to_string(),
                "s" => "STABLE".to_string(),
                _ => "VOLATILE".to_string(),
            },
            is_strict: is_strict_flag,
            security_type,
            comment,
            depends_on,
        });
    }

    // Phase 2: Populate comprehensive dependencies using pg_depend
    // This adds dependencies on tables, views, other functions, sequences, etc.
    if !functions.is_empty() {
        populate_function_dependencies(&mut functions, conn).await?;
    }

    Ok(functions)
}
