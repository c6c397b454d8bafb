#![allow(dead_code)]

use http_cmd::config::{ConfigFile, RawCategory, RawConfigFile, RawExec, RawServerSection};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                server: RawServerSection::default(),
                categories: Vec::new(),
            },
        }
    }

    pub fn with_category(mut self, category: RawCategory) -> Self {
        self.config.categories.push(category);
        self
    }

    pub fn catalog_prefix(mut self, prefix: &str) -> Self {
        self.config.server.catalog_prefix = Some(prefix.to_string());
        self
    }

    pub fn run_prefix(mut self, prefix: &str) -> Self {
        self.config.server.run_prefix = Some(prefix.to_string());
        self
    }

    pub fn default_timeout(mut self, secs: i64) -> Self {
        self.config.server.timeout = Some(secs);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawCategory`.
pub struct CategoryBuilder {
    category: RawCategory,
}

impl CategoryBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            category: RawCategory {
                name: name.to_string(),
                description: None,
                execs: None,
                exec: vec![],
            },
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.category.description = Some(text.to_string());
        self
    }

    pub fn exec(mut self, exec: RawExec) -> Self {
        self.category.exec.push(exec);
        self
    }

    pub fn build(self) -> RawCategory {
        self.category
    }
}

/// Builder for `RawExec`.
pub struct ExecBuilder {
    exec: RawExec,
}

impl ExecBuilder {
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            exec: RawExec {
                name: name.to_string(),
                command: command.to_string(),
                description: None,
                timeout: None,
            },
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.exec.description = Some(text.to_string());
        self
    }

    pub fn timeout(mut self, secs: i64) -> Self {
        self.exec.timeout = Some(secs);
        self
    }

    pub fn build(self) -> RawExec {
        self.exec
    }
}
