use blogsmith::load_config::{load_config, require_env, MIN_IMAGES_ENV};
use blogsmith_core::model::PhotoSource;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
#[serial]
fn test_load_config_full_file() {
    env::remove_var(MIN_IMAGES_ENV);
    let file = config_file(
        r#"
output_dir: ./tmp/posts
blogs_file: ./tmp/blogs.yaml
image_provider: pexels
openai_base_url: http://localhost:4000/v1
generation:
  model: gpt-4o-mini
  min_images: 6
"#,
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.output_dir, PathBuf::from("./tmp/posts"));
    assert_eq!(config.blogs_file, PathBuf::from("./tmp/blogs.yaml"));
    assert_eq!(config.image_provider, PhotoSource::Pexels);
    assert_eq!(config.openai_base_url, "http://localhost:4000/v1");
    assert_eq!(config.settings.model, "gpt-4o-mini");
    assert_eq!(config.settings.min_images, 6);
}

#[test]
#[serial]
fn test_load_config_defaults() {
    env::remove_var(MIN_IMAGES_ENV);
    let file = config_file("output_dir: ./out\n");

    let config = load_config(file.path()).expect("Minimal config should load");

    assert_eq!(config.blogs_file, PathBuf::from("blogs.yaml"));
    assert_eq!(config.image_provider, PhotoSource::Unsplash);
    assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(config.settings.model, "gpt-4o");
    assert_eq!(config.settings.min_images, 4);
}

#[test]
#[serial]
fn test_min_images_env_overrides_file() {
    let file = config_file("output_dir: ./out\ngeneration:\n  min_images: 2\n");

    env::set_var(MIN_IMAGES_ENV, "5");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.settings.min_images, 5);

    env::set_var(MIN_IMAGES_ENV, "lots");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.settings.min_images, 2);

    env::remove_var(MIN_IMAGES_ENV);
}

#[test]
#[serial]
fn test_unknown_image_provider_is_rejected() {
    let file = config_file("output_dir: ./out\nimage_provider: flickr\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("unknown image provider"));
}

#[test]
fn test_missing_file_and_bad_yaml_fail() {
    assert!(load_config("/definitely/not/here.yaml").is_err());

    let file = config_file("output_dir: [unclosed\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_require_env_treats_blank_as_missing() {
    env::set_var("BLOGSMITH_TEST_SECRET", "   ");
    let err = require_env("BLOGSMITH_TEST_SECRET").unwrap_err();
    assert_eq!(err.to_string(), "BLOGSMITH_TEST_SECRET missing in environment");

    env::set_var("BLOGSMITH_TEST_SECRET", "s3cret");
    assert_eq!(require_env("BLOGSMITH_TEST_SECRET").unwrap(), "s3cret");
    env::remove_var("BLOGSMITH_TEST_SECRET");
}
