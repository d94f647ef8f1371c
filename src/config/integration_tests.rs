// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::config::{load_and_validate_config, load_config, DebugMode, LogFormat};
    use crate::errors::{ConfigError, ValidationError};
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    /// The bundled YAML configuration loads and validates
    #[test]
    fn test_bundled_yaml_config() {
        let config = load_and_validate_config("configs/flowline.yaml").unwrap();

        assert_eq!(config.logging.format, LogFormat::Compact);
        let schemas: Vec<&String> = config.mocks.schemas.keys().collect();
        assert_eq!(schemas, vec!["happy_path", "host_down", "no_capacity"]);
        assert_eq!(
            config.mocks.schemas["happy_path"]["mandelboxCreateFlow"].delay_ms,
            2000
        );
        assert_eq!(
            config.debug.triggers["mandelboxFlowStart"].mode,
            DebugMode::Redact
        );
    }

    /// The TOML flavour carries the same happy path
    #[test]
    fn test_bundled_toml_config() {
        let yaml = load_and_validate_config("configs/flowline.yaml").unwrap();
        let toml = load_and_validate_config("configs/flowline.toml").unwrap();

        assert_eq!(toml.logging.format, LogFormat::Pretty);
        assert_eq!(
            toml.mocks.schemas["happy_path"],
            yaml.mocks.schemas["happy_path"]
        );
    }

    #[test]
    fn test_invalid_file_reports_every_problem() {
        let file = write_config(
            ".yaml",
            r#"
mocks:
  schemas:
    broken:
      mandelboxCreateFlow:
        delay_ms: 999999999
        success: {}
        failure: {}
debug:
  triggers:
    authFlowSuccess:
      message: "Logged in"
      mode: pick
"#,
        );

        match load_and_validate_config(file.path()) {
            Err(ConfigError::Invalid(problems)) => {
                assert_eq!(problems.len(), 3);
                assert!(problems.contains(&ValidationError::AmbiguousMockOutcome {
                    schema: "broken".to_string(),
                    flow: "mandelboxCreateFlow".to_string(),
                }));
                assert!(problems
                    .iter()
                    .any(|p| matches!(p, ValidationError::MockDelayTooLong { .. })));
                assert!(problems
                    .iter()
                    .any(|p| matches!(p, ValidationError::DebugRuleWithoutFields { .. })));
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_documents_surface_parser_errors() {
        let yaml = write_config(".yml", "logging: [not, a, map]\n");
        assert!(matches!(load_config(yaml.path()), Err(ConfigError::Yaml(_))));

        let toml = write_config(".toml", "[logging\nlevel = 1\n");
        assert!(matches!(load_config(toml.path()), Err(ConfigError::Toml(_))));

        let json = write_config(".json", "{}");
        assert!(matches!(
            load_config(json.path()),
            Err(ConfigError::UnsupportedFormat { ref extension }) if extension == "json"
        ));
    }
}
