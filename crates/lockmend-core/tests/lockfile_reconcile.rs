//! End-to-end reconciliation over a realistic yarn.lock on disk.

use lockmend_core::yarn::{apply_advisories, parse_audit, LockEntry, LOCKFILE_NAME};
use lockmend_core::{Lockfile, MissingPackage, Range, Report, Version};
use std::fs;

const LOCK: &str = r#"# This file is generated by running "yarn install" inside your project.
# Manual changes might be lost - proceed with caution!

__metadata:
  version: 6
  cacheKey: 8

"app@workspace:.":
  version: 0.0.0-use.local
  resolution: "app@workspace:."
  dependencies:
    debug: ^4.1.0
    minimist: ^1.2.0
  languageName: unknown
  linkType: soft

"debug@npm:^4.1.0":
  version: 4.1.1
  resolution: "debug@npm:4.1.1"
  dependencies:
    ms: ^2.1.1
  checksum: 1e681f5cce
  languageName: node
  linkType: hard

"debug@npm:^4.3.1":
  version: 4.3.4
  resolution: "debug@npm:4.3.4"
  dependencies:
    ms: 2.1.2
  peerDependenciesMeta:
    supports-color:
      optional: true
  checksum: 3dbad3f94e
  languageName: node
  linkType: hard

"minimist@npm:^1.2.0":
  version: 1.2.5
  resolution: "minimist@npm:1.2.5"
  checksum: 86706ce5b3
  languageName: node
  linkType: hard

"ms@npm:2.1.2, ms@npm:^2.1.1":
  version: 2.1.2
  resolution: "ms@npm:2.1.2"
  checksum: 673cdb2c31
  languageName: node
  linkType: hard
"#;

fn write_lock() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(LOCKFILE_NAME);
    fs::write(&path, LOCK).unwrap();
    (dir, path)
}

#[test]
fn test_fix_then_save_removes_package_from_disk() {
    let (_dir, path) = write_lock();
    let mut lock = Lockfile::read_from(&path).unwrap();
    let mut report = Report::new();

    lock.fix(
        "minimist",
        &Range::parse(">=1.2.6").unwrap(),
        MissingPackage::Fail,
        &mut report,
    )
    .unwrap();
    assert!(lock.try_save(&path).unwrap());

    let saved = fs::read_to_string(&path).unwrap();
    assert!(!saved.contains("minimist@npm"));
    assert!(saved.contains("__metadata"));
    assert!(saved.contains("app@workspace:."));

    let reloaded = Lockfile::read_from(&path).unwrap();
    assert_eq!(reloaded.len(), 4);
}

#[test]
fn test_clean_run_leaves_file_untouched() {
    let (_dir, path) = write_lock();
    let mut lock = Lockfile::read_from(&path).unwrap();
    let mut report = Report::new();

    lock.fix(
        "minimist",
        &Range::parse(">=1.2.0").unwrap(),
        MissingPackage::Fail,
        &mut report,
    )
    .unwrap();

    assert!(!lock.try_save(&path).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), LOCK);
}

#[test]
fn test_shrink_twice_is_byte_identical() {
    let (_dir, path) = write_lock();
    let mut lock = Lockfile::read_from(&path).unwrap();
    let mut report = Report::new();
    lock.shrink(&mut report).unwrap();
    assert!(lock.try_save(&path).unwrap());
    let first = fs::read_to_string(&path).unwrap();

    let mut again = Lockfile::read_from(&path).unwrap();
    let before = again.content_hash().unwrap();
    again.shrink(&mut Report::new()).unwrap();
    assert!(!again.is_dirty());
    assert_eq!(again.content_hash().unwrap(), before);
    assert!(!again.try_save(&path).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), first);

    let merged = again
        .get("debug@npm:^4.1.0, debug@npm:^4.3.1")
        .expect("debug descriptors merged");
    assert_eq!(merged.version, "4.3.4");
    assert!(merged.fields.contains_key("peerDependenciesMeta"));
}

#[test]
fn test_audit_round_over_lockfile() {
    let audit = concat!(
        r#"{"value":"minimist","children":{"ID":1097678,"Vulnerable Versions":"<1.2.6"}}"#,
        "\n",
        r#"{"value":"debug","children":{"ID":"debug (deprecation)","Vulnerable Versions":"*"}}"#,
        "\n",
    );
    let advisories = parse_audit(audit, &Version::new(4, 0, 2)).unwrap();

    let (_dir, path) = write_lock();
    let mut lock = Lockfile::read_from(&path).unwrap();
    let mut report = Report::new();
    apply_advisories(&mut lock, &advisories, &mut report).unwrap();

    assert_eq!(report.resets, vec!["minimist"]);
    assert!(report.unpatched.is_empty());
    assert!(lock.contains_package("debug"));
    assert!(!lock.contains_package("minimist"));
}

#[test]
fn test_inserted_entries_are_serialized_in_key_order() {
    let mut lock = Lockfile::from_entries([("b@npm:^1.0.0", LockEntry::new("1.0.0"))]);
    lock.insert("a@npm:^1.0.0", LockEntry::new("1.0.1"));

    let yaml = lock.to_yaml().unwrap();
    assert!(yaml.find("a@npm").unwrap() < yaml.find("b@npm").unwrap());
    assert!(lock.is_dirty());
}
