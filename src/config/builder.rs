use crate::config::{merge::Merge, types::*};
use anyhow::{Result, anyhow};

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let source_url = self
            .config_input
            .source_url
            .clone()
            .or_else(|| std::env::var("SOURCE_DATABASE_URL").ok())
            .ok_or_else(|| {
                anyhow!("no source database URL given (use --source-url or SOURCE_DATABASE_URL)")
            })?;

        let target_url = self
            .config_input
            .target_url
            .clone()
            .or_else(|| std::env::var("TARGET_DATABASE_URL").ok())
            .ok_or_else(|| {
                anyhow!("no target database URL given (use --target-url or TARGET_DATABASE_URL)")
            })?;

        let role = self
            .config_input
            .role
            .clone()
            .or_else(|| std::env::var("PGALIGN_ROLE").ok());

        Ok(Config {
            source_url,
            target_url,
            role,
            objects: self.resolve_objects(),
        })
    }

    fn resolve_objects(&self) -> Objects {
        let defaults = Objects {
            include: ObjectInclude::default(),
            exclude: ObjectExclude::default(),
        };
        let obj_input = self.config_input.objects.as_ref();

        let include = obj_input
            .and_then(|o| o.include.as_ref())
            .map(|i| ObjectInclude {
                schemas: i.schemas.as_ref().cloned().unwrap_or_default(),
                tables: i.tables.as_ref().cloned().unwrap_or_default(),
            })
            .unwrap_or(defaults.include);

        let exclude = obj_input
            .and_then(|o| o.exclude.as_ref())
            .map(|e| ObjectExclude {
                schemas: e
                    .schemas
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.exclude.schemas.clone()),
                tables: e
                    .tables
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.exclude.tables.clone()),
            })
            .unwrap_or(defaults.exclude);

        Objects { include, exclude }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
