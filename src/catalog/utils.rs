use crate::catalog::id::ObjectId;

/// Helper to check if a schema name is a system schema.
/// Used for dependency tracking to avoid tracking dependencies on system objects.
pub fn is_system_schema(schema: &str) -> bool {
    matches!(schema, "pg_catalog" | "information_schema" | "pg_toast")
        || schema.starts_with("pg_temp_")
}

/// Builder for constructing dependency lists for database objects.
/// Provides consistent dependency tracking across all catalog object types.
pub struct DependencyBuilder {
    deps: Vec<ObjectId>,
}

impl DependencyBuilder {
    /// Create a new dependency builder with the object's parent schema as the first dependency.
    /// All schema-scoped objects depend on their containing schema.
    pub fn new(schema: String) -> Self {
        Self {
            deps: vec![ObjectId::Schema { name: schema }],
        }
    }

    /// Create a dependency builder for a cluster-scoped object (no parent schema).
    pub fn cluster_scoped() -> Self {
        Self { deps: Vec::new() }
    }

    /// Add a custom type dependency if the type is not a system type.
    #[allow(dead_code)]
    pub fn add_custom_type(&mut self, type_schema: Option<String>, type_name: Option<String>) {
        if let (Some(schema), Some(name)) = (type_schema, type_name)
            && !is_system_schema(&schema)
        {
            self.deps.push(ObjectId::Enum { schema, name });
        }
    }

    /// Add a type or extension dependency based on whether the type is extension-provided.
    ///
    /// For array types, `type_name` must already be resolved to the element type name
    /// (not the array type name), typically via `pg_type.typelem` in the calling query.
    pub fn add_type_or_extension(
        &mut self,
        type_schema: Option<String>,
        type_name: Option<String>,
        is_extension: bool,
        extension_name: Option<String>,
    ) {
        if is_extension {
            if let Some(ext_name) = extension_name {
                self.deps.push(ObjectId::Extension { name: ext_name });
            }
        } else if let (Some(schema), Some(name)) = (type_schema, type_name)
            && !is_system_schema(&schema)
        {
            self.deps.push(ObjectId::Enum { schema, name });
        }
    }

    /// Add a type dependency with proper distinction between domains, enums, composites
    /// and ranges via `typtype` ('d', 'e', 'c', 'r').
    pub fn add_type_dependency(
        &mut self,
        type_schema: Option<String>,
        type_name: Option<String>,
        typtype: Option<String>,
        is_extension: bool,
        extension_name: Option<String>,
    ) {
        if is_extension {
            if let Some(ext_name) = extension_name {
                self.deps.push(ObjectId::Extension { name: ext_name });
            }
        } else if let (Some(schema), Some(name)) = (type_schema, type_name)
            && !is_system_schema(&schema)
        {
            match typtype.as_deref() {
                Some("d") => self.deps.push(ObjectId::Domain { schema, name }),
                Some("c") => self.deps.push(ObjectId::CompositeType { schema, name }),
                Some("r") => self.deps.push(ObjectId::Range { schema, name }),
                _ => self.deps.push(ObjectId::Enum { schema, name }),
            }
        }
    }

    /// Add an arbitrary already-resolved dependency.
    pub fn add(&mut self, id: ObjectId) {
        self.deps.push(id);
    }

    /// Build the final dependency list.
    pub fn build(self) -> Vec<ObjectId> {
        self.deps
    }
}
