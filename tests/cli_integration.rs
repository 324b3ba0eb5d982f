#![cfg(feature = "cli")]

use std::path::Path;
use std::process::Command;

use iavldump::codec::{CommitId, CommitInfo, StoreInfo, encode_latest_version};
use iavldump::inspect;
use iavldump::store::LevelDbStore;
use iavldump::tree::{NodeBody, TreeNode};
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_iavldump").to_string()
}

fn write_db(path: &Path, records: &[(Vec<u8>, Vec<u8>)]) {
    let mut opts = rusty_leveldb::Options::default();
    opts.create_if_missing = true;
    let mut db = rusty_leveldb::DB::open(path, opts).unwrap();
    for (key, value) in records {
        db.put(key, value).unwrap();
    }
    db.flush().unwrap();
}

fn fixture() -> Vec<(Vec<u8>, Vec<u8>)> {
    let info = CommitInfo {
        version: 3,
        store_infos: vec![StoreInfo {
            name: "bank".to_string(),
            commit_id: CommitId {
                version: 3,
                hash: vec![0xAB, 0xCD],
            },
        }],
    };
    let leaf = TreeNode {
        height: 0,
        size: 1,
        version: 3,
        key: b"abc".to_vec(),
        body: NodeBody::Leaf {
            value: b"xyz".to_vec(),
        },
    };
    vec![
        (b"s/3".to_vec(), info.encode()),
        (b"s/k:bank/n\x01".to_vec(), leaf.encode()),
        (b"s/k:bank/r".to_vec(), vec![0xAB, 0xCD]),
        (b"s/latest".to_vec(), encode_latest_version(3)),
    ]
}

const FIXTURE_OUTPUT: &str = "\
Block:  3
  bank           : ABCD
bank:node:01
  height    : 0
  size      : 1
  version   : 3
  key       : abc
  left  hash:\x20
  right hash:\x20
  value     : xyz

bank:root:
  root hash : ABCD

s/latest: 3
";

#[test]
fn cli_prints_every_record() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("application.db");
    write_db(&db, &fixture());

    let out = Command::new(bin()).arg(&db).output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), FIXTURE_OUTPUT);
}

#[test]
fn cli_default_path_is_relative_to_cwd() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("data").join("application.db");
    std::fs::create_dir_all(db.parent().unwrap()).unwrap();
    write_db(&db, &fixture());

    let out = Command::new(bin()).current_dir(dir.path()).output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), FIXTURE_OUTPUT);
}

#[test]
fn cli_json_stats_on_stderr() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("application.db");
    write_db(&db, &fixture());

    let out = Command::new(bin()).arg("--json").arg(&db).output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    let start = stderr.find('{').expect("no JSON on stderr");
    let stats: serde_json::Value = serde_json::from_str(&stderr[start..]).unwrap();
    assert_eq!(stats["records"], 4);
    assert_eq!(stats["nodes"], 1);
    assert_eq!(stats["roots"], 1);
    assert_eq!(stats["node_errors"], 0);
}

#[test]
fn cli_missing_store_fails_without_output() {
    let dir = tempdir().unwrap();
    let out = Command::new(bin())
        .arg(dir.path().join("nope.db"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot open store"));
}

#[test]
fn cli_malformed_keeper_key_exits_nonzero() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("application.db");
    let mut records = fixture();
    records.push((b"s/k:broken".to_vec(), vec![]));
    write_db(&db, &records);

    let out = Command::new(bin()).arg(&db).output().unwrap();
    assert!(!out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    // Records sorted before the bad key were already printed.
    assert!(stdout.starts_with("Block:  3\n"));
    assert!(!stdout.contains("s/latest"));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid keeper key"));
}

#[test]
fn library_scan_over_leveldb() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("application.db");
    write_db(&db, &fixture());

    let mut store = LevelDbStore::open(&db).unwrap();
    assert_eq!(store.path(), db.as_path());
    let mut out = Vec::new();
    let stats = inspect::dump(&mut store, &mut out).unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(String::from_utf8(out).unwrap(), FIXTURE_OUTPUT);
}
