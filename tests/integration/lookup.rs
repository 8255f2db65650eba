use extenv::test_utils::ArchiveFixture;

use crate::helpers::{Workspace, jar_location};

#[test]
fn test_parents_before_self() {
    let ws = Workspace::new();
    let common = ws.common();
    let a = ws.plugin(ArchiveFixture::new("a.jar").entry("shared.txt", "a").entry("a-only.txt", "a"));
    let manager = ws.manager();

    let env = manager.get_environment(&a).unwrap();
    assert_eq!(env.resolve_symbol("shared.txt").unwrap().to_string(), jar_location(&common, "shared.txt"));
    assert_eq!(env.resolve_symbol("a-only.txt").unwrap().to_string(), jar_location(&a, "a-only.txt"));
    assert!(env.resolve_symbol("nowhere.txt").is_none());
}

#[test]
fn test_provider_content_visible_before_own() {
    let ws = Workspace::new();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None).entry("org/example/Api.class", "e"));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None).entry("org/example/Api.class", "a"));
    let manager = ws.manager();

    let env = manager.get_environment(&a).unwrap();
    assert_eq!(
        env.resolve_symbol("org/example/Api.class").unwrap().to_string(),
        jar_location(&e, "org/example/Api.class")
    );
}

#[test]
fn test_enumeration_with_one_dependency() {
    let ws = Workspace::new();
    let common = ws.common();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None).entry("shared.txt", "e"));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None).entry("shared.txt", "a"));
    let manager = ws.manager();

    let env = manager.get_environment(&a).unwrap();
    let found: Vec<String> = env.enumerate_resource_locations("shared.txt").iter().map(ToString::to_string).collect();
    assert_eq!(
        found,
        vec![jar_location(&common, "shared.txt"), jar_location(&e, "shared.txt"), jar_location(&a, "shared.txt")]
    );
}

#[test]
fn test_flat_combination_diamond_lists_provider_once() {
    let ws = Workspace::new();
    let common = ws.common();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None).entry("shared.txt", "e"));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None).entry("shared.txt", "a"));
    let b = ws.plugin(ArchiveFixture::new("b.jar").requires("ext1", None).entry("shared.txt", "b"));
    let manager = ws.manager();

    let env = manager.get_environment_for(&[a.clone(), b.clone()]).unwrap();
    let found: Vec<String> = env.enumerate_resource_locations("shared.txt").iter().map(ToString::to_string).collect();
    assert_eq!(
        found,
        vec![
            jar_location(&common, "shared.txt"),
            jar_location(&e, "shared.txt"),
            jar_location(&a, "shared.txt"),
            jar_location(&b, "shared.txt"),
        ]
    );

    assert_eq!(env.artifacts(), &[a.clone(), b.clone()]);
    assert_eq!(env.parents().len(), 2);
    assert!(std::sync::Arc::ptr_eq(&env.parents()[1], &manager.get_environment(&e).unwrap()));
}

#[test]
fn test_flat_combination_excludes_member_providers() {
    let ws = Workspace::new();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None).entry("e.txt", "e"));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None));
    let manager = ws.manager();

    let env = manager.get_environment_for(&[a.clone(), e.clone()]).unwrap();
    assert_eq!(env.parents().len(), 1);
    assert_eq!(env.artifacts(), &[a, e.clone()]);
    assert_eq!(env.resolve_symbol("e.txt").unwrap().to_string(), jar_location(&e, "e.txt"));
}

#[test]
fn test_flat_combinations_are_not_cached() {
    let ws = Workspace::new();
    let a = ws.plugin(ArchiveFixture::new("a.jar"));
    let b = ws.plugin(ArchiveFixture::new("b.jar"));
    let manager = ws.manager();

    let first = manager.get_environment_for(&[a.clone(), b.clone()]).unwrap();
    let second = manager.get_environment_for(&[a.clone(), b.clone()]).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    assert!(!manager.cache().contains(a.id()));
}
