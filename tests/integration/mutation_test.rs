//! Integration tests for folder and document mutations.

mod helpers;

use std::sync::Arc;

use bytes::Bytes;
use chrono::{TimeZone, Utc};

use damfs_core::error::ErrorKind;
use damfs_core::types::{DamPath, NodeId, OverwriteMode, TimeKind};
use damfs_repository::Node;

fn path(s: &str) -> DamPath {
    DamPath::parse(s)
}

#[tokio::test]
async fn test_folder_rename_moves_path() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a/b/c").await;

    dam.repository.resolve(&path("/a/b/c")).await.unwrap();
    let b = dam.repository.resolve(&path("/a/b")).await.unwrap();
    let renamed = b.rename(&dam.repository, "z").await.unwrap();
    assert_eq!(renamed.path_segment(), "z");

    let err = dam.repository.resolve(&path("/a/b")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(dam.repository.exists(&path("/a/z")).await.unwrap());
    assert!(dam.repository.exists(&path("/a/z/c")).await.unwrap());
    assert_eq!(dam.repository.cache_stats().await.generation, 1);
}

#[tokio::test]
async fn test_create_collision_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a/b").await;
    dam.seed_document("/a/doc.txt", "x").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();

    let err = a.create_folder(&dam.repository, "b").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);

    let err = a
        .create_document(&dam.repository, "doc.txt", Bytes::from("y"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);

    let err = a.create_folder(&dam.repository, "doc.txt").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_create_folder_and_document() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();

    let folder = a.create_folder(&dam.repository, "new").await.unwrap();
    assert_eq!(folder.parent_id(), Some(a.id()));

    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    let document = a
        .create_document(&dam.repository, "notes.md", Bytes::from("# hi"))
        .await
        .unwrap();
    assert_eq!(document.folder_id(), a.id());
    assert_eq!(document.size(), 4);

    let names: Vec<String> = a
        .children(&dam.repository, 0, None)
        .await
        .unwrap()
        .iter()
        .map(|n| n.path_segment().to_string())
        .collect();
    assert_eq!(names, ["new", "notes.md"]);
}

#[tokio::test]
async fn test_document_rename_keeps_folder_caches() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    let document = dam.repository.resolve(&path("/a/doc.txt")).await.unwrap();

    let renamed = document.rename(&dam.repository, "new.txt").await.unwrap();
    assert_eq!(renamed.path_segment(), "new.txt");
    assert_eq!(renamed.id(), document.id());

    assert_eq!(a.invalidation_count(), 1);
    assert_eq!(dam.repository.cache_stats().await.generation, 0);
    let again = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    assert!(Arc::ptr_eq(&a, &again));

    assert!(dam.repository.exists(&path("/a/new.txt")).await.unwrap());
    assert!(!dam.repository.exists(&path("/a/doc.txt")).await.unwrap());
}

#[tokio::test]
async fn test_document_rename_collision() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/one.txt", "1").await;
    dam.seed_document("/a/two.txt", "2").await;
    let one = dam.repository.resolve(&path("/a/one.txt")).await.unwrap();

    let err = one.rename(&dam.repository, "two.txt").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_move_document_between_folders() {
    let dam = helpers::TestDam::new().await;
    let id = dam.seed_document("/a/doc.txt", "x").await;
    dam.seed_folder("/b").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    let b = dam.repository.resolve_folder(&path("/b")).await.unwrap();

    let document = dam.repository.resolve(&path("/a/doc.txt")).await.unwrap();
    let moved = document
        .move_to(&dam.repository, &path("/b"), None, OverwriteMode::None)
        .await
        .unwrap();

    assert_eq!(moved.parent_id(), Some(b.id()));
    assert_eq!(a.invalidation_count(), 1);
    assert_eq!(b.invalidation_count(), 1);

    let found = dam.repository.resolve(&path("/b/doc.txt")).await.unwrap();
    assert_eq!(found.as_document().unwrap().id(), id);
    assert!(!dam.repository.exists(&path("/a/doc.txt")).await.unwrap());
}

#[tokio::test]
async fn test_move_document_with_new_name() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    dam.seed_folder("/b").await;

    let document = dam.repository.resolve(&path("/a/doc.txt")).await.unwrap();
    let moved = document
        .move_to(
            &dam.repository,
            &path("/b"),
            Some("renamed.txt"),
            OverwriteMode::None,
        )
        .await
        .unwrap();

    let landed = dam.repository.path_of(&moved).await.unwrap();
    assert_eq!(landed.to_string(), "/b/renamed.txt");
}

#[tokio::test]
async fn test_move_folder_into_descendant_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a/b/c").await;

    let a = dam.repository.resolve(&path("/a")).await.unwrap();
    let err = a
        .move_to(&dam.repository, &path("/a/b/c"), None, OverwriteMode::None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let err = a
        .move_to(&dam.repository, &path("/a"), None, OverwriteMode::None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_move_folder_keeps_subtree() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/k/deep.txt", "deep").await;
    dam.seed_folder("/b").await;

    let k = dam.repository.resolve(&path("/a/k")).await.unwrap();
    let moved = k
        .move_to(&dam.repository, &path("/b"), None, OverwriteMode::None)
        .await
        .unwrap();

    assert_eq!(moved.path_segment(), "k");
    assert!(dam.repository.exists(&path("/b/k/deep.txt")).await.unwrap());
    assert!(!dam.repository.exists(&path("/a/k")).await.unwrap());
}

#[tokio::test]
async fn test_collision_without_overwrite_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/x.txt", "from a").await;
    dam.seed_document("/b/x.txt", "from b").await;

    let source = dam.repository.resolve(&path("/a/x.txt")).await.unwrap();
    let err = source
        .move_to(&dam.repository, &path("/b"), None, OverwriteMode::None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);

    let err = source
        .copy_to(&dam.repository, &path("/b"), None, OverwriteMode::None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
    assert!(dam.repository.exists(&path("/a/x.txt")).await.unwrap());
}

#[tokio::test]
async fn test_replace_target_overwrites_occupant() {
    let dam = helpers::TestDam::new().await;
    let source_id = dam.seed_document("/a/x.txt", "from a").await;
    let occupant_id = dam.seed_document("/b/x.txt", "from b").await;

    let source = dam.repository.resolve(&path("/a/x.txt")).await.unwrap();
    source
        .move_to(&dam.repository, &path("/b"), None, OverwriteMode::ReplaceTarget)
        .await
        .unwrap();

    let landed = dam.repository.resolve(&path("/b/x.txt")).await.unwrap();
    let landed = landed.as_document().unwrap();
    assert_eq!(landed.id(), source_id);
    assert_ne!(landed.id(), occupant_id);
    assert_eq!(
        landed.read(&dam.repository).await.unwrap(),
        Bytes::from("from a")
    );
    assert!(!dam.repository.exists(&path("/a/x.txt")).await.unwrap());
}

#[tokio::test]
async fn test_copy_document_onto_itself_with_replace_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/x.txt", "x").await;

    let source = dam.repository.resolve(&path("/a/x.txt")).await.unwrap();
    let err = source
        .copy_to(&dam.repository, &path("/a"), None, OverwriteMode::ReplaceTarget)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert!(dam.repository.exists(&path("/a/x.txt")).await.unwrap());
}

#[tokio::test]
async fn test_integrate_document_clones_data() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/x.txt", "from a").await;
    let occupant_id = dam.seed_document("/b/x.txt", "from b").await;

    let source = dam.repository.resolve(&path("/a/x.txt")).await.unwrap();
    let copy = source
        .copy_to(
            &dam.repository,
            &path("/b"),
            None,
            OverwriteMode::IntegrateIntoTarget,
        )
        .await
        .unwrap();

    let copy = copy.as_document().unwrap();
    assert_eq!(copy.id(), occupant_id);
    assert_eq!(copy.read(&dam.repository).await.unwrap(), Bytes::from("from a"));
    assert!(dam.repository.exists(&path("/a/x.txt")).await.unwrap());
}

#[tokio::test]
async fn test_integrate_sibling_folder() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/src/k").await;
    dam.seed_document("/src/y.txt", "y").await;
    dam.seed_folder("/dst").await;

    let dst = dam.repository.resolve_folder(&path("/dst")).await.unwrap();
    let src = dam.repository.resolve(&path("/src")).await.unwrap();
    let result = src
        .move_to(
            &dam.repository,
            &DamPath::root(),
            Some("dst"),
            OverwriteMode::IntegrateIntoTarget,
        )
        .await
        .unwrap();

    assert_eq!(result.id(), NodeId::Folder(dst.id()));
    assert_eq!(dst.invalidation_count(), 2);
    assert!(!dam.repository.exists(&path("/src")).await.unwrap());
    assert!(dam.repository.exists(&path("/dst/k")).await.unwrap());
    assert!(dam.repository.exists(&path("/dst/y.txt")).await.unwrap());
}

#[tokio::test]
async fn test_integrate_nested_folder() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/dst/src/k").await;
    dam.seed_document("/dst/src/y.txt", "y").await;

    let src = dam.repository.resolve(&path("/dst/src")).await.unwrap();
    let dst = dam.repository.resolve_folder(&path("/dst")).await.unwrap();
    src.move_to(
        &dam.repository,
        &DamPath::root(),
        Some("dst"),
        OverwriteMode::IntegrateIntoTarget,
    )
    .await
    .unwrap();

    assert_eq!(dst.invalidation_count(), 3);
    assert!(!dam.repository.exists(&path("/dst/src")).await.unwrap());
    assert!(dam.repository.exists(&path("/dst/k")).await.unwrap());
    assert!(dam.repository.exists(&path("/dst/y.txt")).await.unwrap());
}

#[tokio::test]
async fn test_integrate_folder_into_document_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a/x").await;
    dam.seed_document("/b/x", "file").await;

    let folder = dam.repository.resolve(&path("/a/x")).await.unwrap();
    let err = folder
        .move_to(
            &dam.repository,
            &path("/b"),
            None,
            OverwriteMode::IntegrateIntoTarget,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_copy_folder_recursively() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/src/k/deep.txt", "deep").await;
    dam.seed_document("/src/y.txt", "y").await;

    let src = dam.repository.resolve(&path("/src")).await.unwrap();
    let copy = src
        .copy_to(
            &dam.repository,
            &DamPath::root(),
            Some("copy"),
            OverwriteMode::None,
        )
        .await
        .unwrap();
    assert_ne!(copy.id(), src.id());

    let deep = dam
        .repository
        .resolve(&path("/copy/k/deep.txt"))
        .await
        .unwrap();
    assert_eq!(
        deep.as_document()
            .unwrap()
            .read(&dam.repository)
            .await
            .unwrap(),
        Bytes::from("deep")
    );
    assert!(dam.repository.exists(&path("/copy/y.txt")).await.unwrap());
    assert!(dam.repository.exists(&path("/src/k/deep.txt")).await.unwrap());
}

#[tokio::test]
async fn test_delete_folder_and_document() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/b/doc.txt", "x").await;
    dam.seed_document("/a/keep.txt", "k").await;

    let document = dam.repository.resolve(&path("/a/keep.txt")).await.unwrap();
    document.delete(&dam.repository).await.unwrap();
    assert!(!dam.repository.exists(&path("/a/keep.txt")).await.unwrap());
    assert_eq!(dam.repository.cache_stats().await.generation, 0);

    let b = dam.repository.resolve(&path("/a/b")).await.unwrap();
    b.delete(&dam.repository).await.unwrap();
    assert!(!dam.repository.exists(&path("/a/b")).await.unwrap());
    assert!(!dam.repository.exists(&path("/a/b/doc.txt")).await.unwrap());
    assert_eq!(dam.repository.cache_stats().await.generation, 1);
}

#[tokio::test]
async fn test_root_is_immutable() {
    let dam = helpers::TestDam::new().await;
    let root = Node::Folder(dam.repository.root().await.unwrap());

    let err = root.delete(&dam.repository).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);
    let err = root.rename(&dam.repository, "top").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);
}

#[tokio::test]
async fn test_set_time() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let folder = dam.repository.resolve(&path("/a")).await.unwrap();
    let err = folder
        .set_time(&dam.repository, TimeKind::Modified, when)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);

    let document = dam.repository.resolve(&path("/a/doc.txt")).await.unwrap();
    document
        .set_time(&dam.repository, TimeKind::Modified, when)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_read_only_refuses_mutations() {
    let dam = helpers::TestDam::read_only().await;
    dam.seed_document("/a/doc.txt", "x").await;

    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    let err = a.create_folder(&dam.repository, "b").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);

    let document = dam.repository.resolve(&path("/a/doc.txt")).await.unwrap();
    let err = document.delete(&dam.repository).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);
    let err = document
        .rename(&dam.repository, "other.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);

    assert!(dam.repository.exists(&path("/a/doc.txt")).await.unwrap());
}

#[tokio::test]
async fn test_copy_folder_replacing_itself_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/x/keep.txt", "keep").await;

    let x = dam.repository.resolve(&path("/a/x")).await.unwrap();
    let err = x
        .copy_to(
            &dam.repository,
            &path("/a"),
            Some("x"),
            OverwriteMode::ReplaceTarget,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert!(dam.repository.exists(&path("/a/x/keep.txt")).await.unwrap());
}

#[tokio::test]
async fn test_move_folder_replacing_its_parent_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/x/x/keep.txt", "keep").await;

    let inner = dam.repository.resolve(&path("/x/x")).await.unwrap();
    let err = inner
        .move_to(
            &dam.repository,
            &DamPath::root(),
            Some("x"),
            OverwriteMode::ReplaceTarget,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert!(dam.repository.exists(&path("/x/x/keep.txt")).await.unwrap());
}

#[tokio::test]
async fn test_document_replacing_its_folder_is_refused() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/x/x", "inside").await;
    let document = dam.repository.resolve(&path("/x/x")).await.unwrap();

    let err = document
        .move_to(
            &dam.repository,
            &DamPath::root(),
            None,
            OverwriteMode::ReplaceTarget,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let err = document
        .copy_to(
            &dam.repository,
            &DamPath::root(),
            None,
            OverwriteMode::ReplaceTarget,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    assert!(dam.repository.exists(&path("/x/x")).await.unwrap());
}

#[tokio::test]
async fn test_replace_target_folder_with_folder() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/k/new.txt", "new").await;
    dam.seed_document("/b/k/old.txt", "old").await;

    let k = dam.repository.resolve(&path("/a/k")).await.unwrap();
    k.move_to(&dam.repository, &path("/b"), None, OverwriteMode::ReplaceTarget)
        .await
        .unwrap();

    assert!(dam.repository.exists(&path("/b/k/new.txt")).await.unwrap());
    assert!(!dam.repository.exists(&path("/b/k/old.txt")).await.unwrap());
    assert!(!dam.repository.exists(&path("/a/k")).await.unwrap());
}
