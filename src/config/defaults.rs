use crate::config::types::*;

// ObjectInclude can derive Default since it's just two empty Vecs

impl Default for ObjectExclude {
    fn default() -> Self {
        Self {
            schemas: vec!["pg_*".to_string(), "information_schema".to_string()],
            tables: vec![],
        }
    }
}
