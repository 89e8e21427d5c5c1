use super::*;

#[test]
fn source_names_must_be_plain_file_names() {
    assert_eq!(validate_source_name("2.gif").unwrap(), "2.gif");
    assert!(validate_source_name("").is_err());
    assert!(validate_source_name("..").is_err());
    assert!(validate_source_name("../secret.gif").is_err());
    assert!(validate_source_name("a/b.gif").is_err());
    assert!(validate_source_name("a\\b.gif").is_err());
}

#[test]
fn dir_store_reads_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("2.gif"), b"GIF89a").unwrap();

    let store = DirSourceStore::new(dir.path());
    assert_eq!(&*store.load("2.gif").unwrap(), b"GIF89a");
}

#[test]
fn dir_store_missing_file_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirSourceStore::new(dir.path());
    assert!(matches!(
        store.load("nope.gif"),
        Err(AvatarGifError::SourceNotFound(_))
    ));
}

#[test]
fn dir_store_rejects_traversal_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirSourceStore::new(dir.path().join("sub"));
    assert!(matches!(
        store.load("../2.gif"),
        Err(AvatarGifError::Validation(_))
    ));
}

#[test]
fn in_memory_store_round_trip() {
    let store = InMemorySourceStore::new().with("3.gif", vec![1u8, 2, 3]);
    assert_eq!(&*store.load("3.gif").unwrap(), &[1, 2, 3]);
    assert!(matches!(
        store.load("2.gif"),
        Err(AvatarGifError::SourceNotFound(_))
    ));
}

#[cfg(unix)]
#[test]
fn dir_store_directory_entry_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("2.gif")).unwrap();
    let store = DirSourceStore::new(dir.path());
    assert!(matches!(
        store.load("2.gif"),
        Err(AvatarGifError::SourceNotFound(_))
    ));
}

#[test]
fn dir_store_file_removed_after_construction_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("2.gif");
    std::fs::write(&path, b"GIF89a").unwrap();
    let store = DirSourceStore::new(dir.path());
    assert!(store.load("2.gif").is_ok());

    std::fs::remove_file(&path).unwrap();
    let err = store.load("2.gif").unwrap_err();
    assert!(matches!(err, AvatarGifError::SourceNotFound(_)));
    assert_eq!(err.kind(), "source_not_found");
}

#[test]
fn dir_store_missing_root_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirSourceStore::new(dir.path().join("absent"));
    assert!(matches!(
        store.load("2.gif"),
        Err(AvatarGifError::SourceNotFound(_))
    ));
}
