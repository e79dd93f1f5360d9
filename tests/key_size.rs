use anyhow::Result;
use std::path::PathBuf;

use StashDB::errors::StoreError;
use StashDB::store::Store;

/// put ключом неверной длины — ошибка, хранилище остаётся рабочим.
#[test]
fn put_wrong_key_length_fails_cleanly() -> Result<()> {
    let path = unique_path("badkey");
    let mut store = Store::open(&path, 8)?;

    let err = store.put(b"short", b"x").unwrap_err();
    match err {
        StoreError::KeySizeMismatch { expected, got } => {
            assert_eq!(expected, 8);
            assert_eq!(got, 5);
        }
        other => panic!("expected KeySizeMismatch, got {:?}", other),
    }

    // Дальнейшие операции не пострадали
    store.put(b"GOODKEY_", b"y")?;
    assert_eq!(store.get(b"GOODKEY_")?.expect("present").as_slice(), b"y");
    store.close()?;

    // И файл остаётся открываемым
    let store = Store::open(&path, 8)?;
    assert_eq!(store.get(b"GOODKEY_")?.expect("present").as_slice(), b"y");
    store.close()?;

    cleanup(&path);
    Ok(())
}

/// Переоткрытие с другим key_size отвергается по заголовку.
#[test]
fn reopen_validates_key_size() -> Result<()> {
    let path = unique_path("ks-mismatch");
    {
        let mut store = Store::open(&path, 8)?;
        store.put(b"KEY_____", b"v")?;
        store.close()?;
    }

    let err = Store::open(&path, 16).unwrap_err();
    match err {
        StoreError::KeySizeMismatch { expected, got } => {
            assert_eq!(expected, 8, "header value");
            assert_eq!(got, 16, "configured value");
        }
        other => panic!("expected KeySizeMismatch, got {:?}", other),
    }

    // С правильным key_size файл открывается
    let store = Store::open(&path, 8)?;
    assert!(store.get(b"KEY_____")?.is_some());
    store.close()?;

    cleanup(&path);
    Ok(())
}

/// Чужой файл (битая магия) отвергается при открытии.
#[test]
fn bad_magic_rejected() -> Result<()> {
    let path = unique_path("badmagic");
    {
        let store = Store::open(&path, 8)?;
        store.close()?;
    }

    // Испортить первый байт магии
    {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = std::fs::OpenOptions::new().write(true).open(&path)?;
        f.seek(SeekFrom::Start(0))?;
        f.write_all(b"X")?;
    }

    let err = Store::open(&path, 8).unwrap_err();
    assert!(matches!(err, StoreError::InvalidFile { .. }), "got {:?}", err);

    cleanup(&path);
    Ok(())
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("shs-{}-{}-{}.shs", prefix, pid, t))
}

fn cleanup(path: &PathBuf) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(StashDB::lock::sidecar_lock_path(path));
}
