use catalogue_match::FileDiscovery;

use crate::common::test_helpers::*;

#[tokio::test]
async fn test_recursive_discovery_skips_other_extensions() {
    let temp_dir = create_catalogue_dir(4, 1).await.unwrap();

    let files = FileDiscovery::new()
        .discover_files(temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 5);
    assert!(files.iter().all(|f| f.extension().unwrap() == "xml"));
}

#[tokio::test]
async fn test_uppercase_extension_is_found() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    create_test_file(&temp_dir.path().join("LOUD.XML"), "<a/>")
        .await
        .unwrap();

    let files = FileDiscovery::new()
        .discover_files(temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_max_depth_limits_walk() {
    let temp_dir = create_catalogue_dir(4, 0).await.unwrap();

    // files in batch_a sit at depth 1, batch_b/nested is one level deeper
    let files = FileDiscovery::new()
        .with_max_depth(Some(1))
        .discover_files(temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.parent().unwrap().ends_with("batch_a")));
}

#[tokio::test]
async fn test_include_patterns() {
    let temp_dir = create_catalogue_dir(4, 2).await.unwrap();

    let files = FileDiscovery::new()
        .with_include_patterns(vec!["**/broken*.xml".to_string()])
        .unwrap()
        .discover_files(temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
}

#[test]
fn test_invalid_glob_is_config_error() {
    let result = FileDiscovery::new().with_exclude_patterns(vec!["[unclosed".to_string()]);

    assert!(matches!(
        result,
        Err(catalogue_match::CatalogueError::Config(_))
    ));
}
