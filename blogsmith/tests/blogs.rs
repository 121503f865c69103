use blogsmith::blogs::{BlogRecord, BlogStore, BlogStoreError};
use blogsmith_core::model::BrandVoice;
use std::fs;

fn record(id: &str) -> BlogRecord {
    BlogRecord {
        id: id.to_string(),
        name: format!("{id} blog"),
        site_url: format!("https://{id}.example/"),
        username: "editor".to_string(),
        app_password: "xxxx yyyy zzzz".to_string(),
        accept_invalid_certs: false,
        brand_voice: BrandVoice::default(),
    }
}

#[test]
fn test_missing_store_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = BlogStore::load(dir.path().join("blogs.yaml")).unwrap();
    assert!(store.blogs().is_empty());
}

#[test]
fn test_add_save_reload_remove() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("blogs.yaml");

    let mut store = BlogStore::load(&path).unwrap();
    store.add(record("coffee")).unwrap();
    store.add(record("gym")).unwrap();
    store.save().unwrap();

    let mut reloaded = BlogStore::load(&path).unwrap();
    assert_eq!(reloaded.blogs().len(), 2);
    let coffee = reloaded.get("coffee").unwrap();
    assert_eq!(coffee.api_base(), "https://coffee.example/wp-json/wp/v2");

    let removed = reloaded.remove("coffee").unwrap();
    assert_eq!(removed.id, "coffee");
    reloaded.save().unwrap();
    assert_eq!(BlogStore::load(&path).unwrap().blogs().len(), 1);
}

#[test]
fn test_duplicate_and_unknown_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = BlogStore::load(dir.path().join("blogs.yaml")).unwrap();
    store.add(record("coffee")).unwrap();

    assert!(matches!(
        store.add(record("coffee")),
        Err(BlogStoreError::Duplicate { .. })
    ));
    let err = store.get("tea").unwrap_err();
    assert!(matches!(err, BlogStoreError::NotFound { ref id } if id == "tea"));
    assert!(store.remove("tea").is_err());
}

#[test]
fn test_brand_voice_is_read_from_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blogs.yaml");
    fs::write(
        &path,
        r#"
blogs:
  - id: coffee
    name: Bean There
    site_url: https://coffee.example
    username: editor
    app_password: abcd
    accept_invalid_certs: true
    brand_voice:
      name: Bean There
      description: Neighbourhood roastery
      tone: warm
      values: [craft, community]
"#,
    )
    .unwrap();

    let store = BlogStore::load(&path).unwrap();
    let blog = store.get("coffee").unwrap();
    assert!(blog.accept_invalid_certs);
    assert_eq!(blog.brand_voice.name, "Bean There");
    assert_eq!(blog.brand_voice.values, vec!["craft", "community"]);
    assert!(blog.brand_voice.avoid.is_empty());
}

#[test]
fn test_corrupt_store_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blogs.yaml");
    fs::write(&path, "blogs: {not: [a list").unwrap();
    assert!(matches!(
        BlogStore::load(&path),
        Err(BlogStoreError::Format(_))
    ));
}
