use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use StashDB::config::StoreConfig;
use StashDB::store::Store;

/// Рандомизированный прогон: close + reopen возвращает те же значения для
/// всех вставленных ключей; повторные вставки затеняются последней.
#[test]
fn random_churn_survives_reopen() -> Result<()> {
    let path = unique_path("churn");
    let mut rng = oorandom::Rand64::new(0x5118_5DB0_0717_AC1D);
    let mut expected: HashMap<[u8; 8], Vec<u8>> = HashMap::new();

    {
        let cfg = StoreConfig::default()
            .with_segment_count(32)
            .with_capacity_hint(4_000);
        let mut store = Store::open_with(&path, 8, cfg)?;

        for _ in 0..2_000 {
            // небольшое пространство ключей, чтобы были перезаписи
            let key = (rng.rand_u64() % 512).to_le_bytes();
            let len = (rng.rand_u64() % 64) as usize;
            let mut value = vec![0u8; len];
            for b in value.iter_mut() {
                *b = rng.rand_u64() as u8;
            }
            store.put(&key, &value)?;
            expected.insert(key, value);
        }

        // Ещё до flush всё читается из того же хэндла
        for (k, v) in &expected {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }
        store.close()?;
    }

    // Переоткрытие: идентичные результаты get для всех ключей
    {
        let store = Store::open(&path, 8)?;
        for (k, v) in &expected {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }
        let report = store.verify()?;
        assert_eq!(report.entries, 2_000, "append-only: every put stays in the file");
        assert_eq!(report.corrupt_chains, 0);
        store.close()?;
    }

    cleanup(&path);
    Ok(())
}

/// Магия заголовка стабильна во время и после любых операций.
#[test]
fn header_magic_stays_put() -> Result<()> {
    let path = unique_path("magic");
    let mut store = Store::open(&path, 8)?;
    assert_eq!(read_magic(&path)?, *b"SHS1");

    for i in 0u64..50 {
        store.put(&i.to_le_bytes(), b"x")?;
        if i % 10 == 0 {
            assert_eq!(read_magic(&path)?, *b"SHS1");
        }
    }
    store.flush()?;
    assert_eq!(read_magic(&path)?, *b"SHS1");
    store.close()?;
    assert_eq!(read_magic(&path)?, *b"SHS1");

    cleanup(&path);
    Ok(())
}

fn read_magic(path: &PathBuf) -> Result<[u8; 4]> {
    use std::io::Read;
    let mut f = std::fs::File::open(path)?;
    let mut buf = [0u8; 4];
    f.read_exact(&mut buf)?;
    Ok(buf)
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
