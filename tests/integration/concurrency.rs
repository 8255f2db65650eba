use std::sync::Arc;
use std::thread;

use extenv::environment::Environment;
use extenv::manager::EnvironmentManager;
use extenv::manifest::ArchiveMetadataReader;
use extenv::test_utils::{ArchiveFixture, CountingReader};

use crate::helpers::Workspace;

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_use_builds_once() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None));

    let reader = Arc::new(CountingReader::new(ArchiveMetadataReader::new()));
    let manager = ws.manager().with_reader(reader.clone());

    let envs: Vec<Arc<Environment>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS).map(|_| scope.spawn(|| manager.get_environment(&a).unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(reader.reads_of(&a), 1);
    assert!(envs.iter().all(|env| Arc::ptr_eq(env, &envs[0])));
}

#[test]
fn test_siblings_sharing_a_provider() {
    let ws = Workspace::new();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None));
    let b = ws.plugin(ArchiveFixture::new("b.jar").requires("ext1", None));

    // Sequentially
    let manager = ws.manager();
    assert!(manager.get_environment(&a).is_ok());
    assert!(manager.get_environment(&b).is_ok());

    // Concurrently, on a fresh manager
    let manager: EnvironmentManager = ws.manager();
    let (env_a, env_b) = thread::scope(|scope| {
        let ha = scope.spawn(|| manager.get_environment(&a).unwrap());
        let hb = scope.spawn(|| manager.get_environment(&b).unwrap());
        (ha.join().unwrap(), hb.join().unwrap())
    });

    let env_e = manager.get_environment(&e).unwrap();
    assert!(Arc::ptr_eq(&env_a.parents()[1], &env_e));
    assert!(Arc::ptr_eq(&env_b.parents()[1], &env_e));
}

#[test]
fn test_concurrent_mixed_artifacts() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("util.jar").provides("util", None));
    ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    let plugins: Vec<_> = (0..8)
        .map(|i| ws.plugin(ArchiveFixture::new(format!("p{i}.jar")).requires("xml", None)))
        .collect();

    let manager = Arc::new(ws.manager());
    let handles: Vec<_> = plugins
        .iter()
        .cloned()
        .map(|plugin| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.get_environment(&plugin).unwrap())
        })
        .collect();

    let envs: Vec<Arc<Environment>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let xml_env = &envs[0].parents()[1];
    assert!(envs.iter().all(|env| Arc::ptr_eq(&env.parents()[1], xml_env)));
    // 8 plugins + xml + util
    assert_eq!(manager.cache().len(), 10);
}
