//! Integration tests for configuration loading and the error-handling switch

use faces_core::config::{ConfigLoader, ProjectStage, ERROR_PAGE_PARAM};
use faces_core::exception::ErrorHandlingSettings;
use faces_core::Application;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_from_file_drives_error_handling() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("faces.toml");
    fs::write(
        &config_file,
        r#"
project_stage = "Development"
default_locale = "de"

[error_handling]
builtin = false

[init_params]
"javax.faces.PROJECT_STAGE" = "Development"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.project_stage, ProjectStage::Development);
    assert_eq!(config.default_locale, "de");

    let app = Application::new(config);
    let settings = ErrorHandlingSettings::resolve(&app);
    assert!(!settings.use_builtin);
    assert!(!settings.collects_errors());
}

#[test]
fn test_workspace_file_layering() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("faces.toml"),
        r#"
project_stage = "SystemTest"

[error_handling]
error_page = "/oops.xhtml"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.project_stage, ProjectStage::SystemTest);
    assert_eq!(
        config.error_handling.error_page.as_deref(),
        Some("/oops.xhtml")
    );

    let settings = ErrorHandlingSettings::resolve(&Application::new(config));
    assert!(settings.error_page_present);
}

#[test]
fn test_init_param_error_page_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("faces.toml");
    fs::write(&config_file, "project_stage = \"Development\"\n").unwrap();

    let mut config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(ErrorHandlingSettings::resolve(&Application::new(config.clone())).collects_errors());

    config
        .init_params
        .insert(ERROR_PAGE_PARAM.to_string(), "/error.xhtml".to_string());
    let settings = ErrorHandlingSettings::resolve(&Application::new(config));
    assert!(settings.error_page_present);
    assert!(!settings.collects_errors());
}

#[test]
fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("faces.toml");
    fs::write(&config_file, "project_stage = \"Staging\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&config_file).is_err());
}
