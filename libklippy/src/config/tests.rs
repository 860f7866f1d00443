use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();

    // Verify default output settings
    assert_eq!(config.output.format, OutputFormat::Pretty);
    assert_eq!(config.output.color, ColorChoice::Auto);

    // Verify default registry and network settings
    assert_eq!(config.registry.default, "https://registry-1.docker.io");
    assert_eq!(config.network.timeout, None);

    assert_eq!(config.log.level, "warn");
}

#[test]
fn test_from_str_empty_yaml() {
    let yaml = "";
    let config = Config::from_yaml_str(yaml).unwrap();
    // Should be equivalent to default
    assert_eq!(config, Config::default());
}

#[test]
fn test_from_str_partial_yaml() {
    let yaml = r#"
output:
  format: json
network:
  timeout: 60
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    // Check specified values
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.network.timeout, Some(60));

    // Check that other values are still default
    assert_eq!(config.output.color, ColorChoice::Auto);
    assert_eq!(config.registry.default, DEFAULT_REGISTRY);
    assert_eq!(config.log.level, "warn");
}

#[test]
fn test_from_str_full_yaml() {
    let yaml = r#"
registry:
  default: "https://mirror.example.com"
network:
  timeout: 10
output:
  format: yaml
  color: never
log:
  level: debug
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.registry.default, "https://mirror.example.com");
    assert_eq!(config.network.timeout, Some(10));
    assert_eq!(config.output.format, OutputFormat::Yaml);
    assert_eq!(config.output.color, ColorChoice::Never);
    assert_eq!(config.log.level, "debug");
}

#[test]
fn test_from_str_invalid_yaml() {
    let yaml = "output: { format: invalid }";
    let result = Config::from_yaml_str(yaml);
    assert!(matches!(result.unwrap_err(), KlippyError::Config { .. }));
}

#[test]
fn test_from_str_unknown_field() {
    // config-rs should ignore unknown fields
    let yaml = "unknown_field: true";
    let result = Config::from_yaml_str(yaml);
    assert!(result.is_ok());
}

#[test]
fn test_load_without_path_is_default() {
    let config = Config::load(None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "output:\n  color: always\nnetwork:\n  timeout: 5").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.output.color, ColorChoice::Always);
    assert_eq!(config.network.timeout, Some(5));
}

#[test]
fn test_load_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    match Config::load(Some(&path)).unwrap_err() {
        KlippyError::Config { path: Some(p), .. } => assert!(p.ends_with("missing.yaml")),
        other => panic!("Expected Config error with path, got {:?}", other),
    }
}

#[test]
fn test_output_format_from_str() {
    assert_eq!("pretty".parse::<OutputFormat>(), Ok(OutputFormat::Pretty));
    assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
    assert!("table".parse::<OutputFormat>().is_err());
}

#[test]
fn test_color_choice_from_str() {
    assert_eq!("auto".parse::<ColorChoice>(), Ok(ColorChoice::Auto));
    assert_eq!("Always".parse::<ColorChoice>(), Ok(ColorChoice::Always));
    assert_eq!("never".parse::<ColorChoice>(), Ok(ColorChoice::Never));
    assert!("sometimes".parse::<ColorChoice>().is_err());
}
