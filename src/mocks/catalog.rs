// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use super::{MockSchema, ScriptedMock};
use crate::config::MocksConfig;
use crate::errors::{ConfigError, MockError, ValidationError};
use crate::observability::messages::mock::MockSchemaSelected;
use crate::observability::messages::StructuredLog;

/// Every mock schema defined in the configuration, by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockCatalog {
    schemas: BTreeMap<String, BTreeMap<String, ScriptedMock>>,
}

impl MockCatalog {
    /// Convert the mock section of the configuration.
    ///
    /// Entries without exactly one outcome are rejected, all of them at once.
    pub fn from_config(cfg: &MocksConfig) -> Result<Self, ConfigError> {
        let mut schemas = BTreeMap::new();
        let mut problems = Vec::new();

        for (schema, flows) in &cfg.schemas {
            let mut entries = BTreeMap::new();
            for (flow, entry) in flows {
                match ScriptedMock::from_config(entry) {
                    Some(mock) => {
                        entries.insert(flow.clone(), mock);
                    }
                    None => problems.push(ValidationError::AmbiguousMockOutcome {
                        schema: schema.clone(),
                        flow: flow.clone(),
                    }),
                }
            }
            schemas.insert(schema.clone(), entries);
        }

        if problems.is_empty() {
            Ok(Self { schemas })
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    /// Build the schema called `name`.
    pub fn load_schema(&self, name: &str) -> Result<MockSchema, MockError> {
        let entries = self
            .schemas
            .get(name)
            .ok_or_else(|| MockError::UnknownSchema {
                name: name.to_string(),
                available: self.names(),
            })?;

        let schema = entries
            .iter()
            .fold(MockSchema::new(name), |schema, (flow, mock)| {
                schema.with_scripted(flow.clone(), mock.clone())
            });

        MockSchemaSelected {
            schema: name,
            entries: schema.len(),
        }
        .log();
        Ok(schema)
    }

    /// Resolve an optional selection; no selection means no overrides.
    pub fn select(&self, selection: Option<&str>) -> Result<Option<MockSchema>, MockError> {
        selection.map(|name| self.load_schema(name)).transpose()
    }
}
