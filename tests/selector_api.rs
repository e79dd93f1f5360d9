use anyhow::Result;
use std::path::PathBuf;

use StashDB::config::StoreConfig;
use StashDB::selector::SelectorStore;

/// Selector-слой: строковые селекторы, коэрция значений, переоткрытие.
#[test]
fn selector_roundtrip_and_coercion() -> Result<()> {
    let path = unique_path("selector");

    {
        let cfg = StoreConfig::default().with_capacity_hint(1_000);
        let mut s = SelectorStore::open_with(&path, cfg)?;

        // Строгий base64 декодируется при записи
        s.put_str("page#logo", "aGVsbG8=")?;
        assert_eq!(s.get("page#logo")?.expect("present"), b"hello".to_vec());

        // Обычный текст уходит как UTF-8
        s.put_str("div#main", "<div>hi</div>")?;
        assert_eq!(s.get("div#main")?.expect("present"), b"<div>hi</div>".to_vec());

        // Сырые байты — как есть
        s.put_bytes("blob", &[0u8, 159, 146, 150])?;
        assert_eq!(s.get("blob")?.expect("present"), vec![0u8, 159, 146, 150]);

        // Перезапись селектора затеняет прежнее значение
        s.put_str("div#main", "<div>bye</div>")?;
        assert_eq!(s.get("div#main")?.expect("present"), b"<div>bye</div>".to_vec());

        assert!(s.get("never-stored")?.is_none());
        s.close()?;
    }

    // put_str делает flush сразу, так что переоткрытие видит всё
    {
        let s = SelectorStore::open(&path)?;
        assert_eq!(s.get("page#logo")?.expect("present"), b"hello".to_vec());
        assert_eq!(s.get("div#main")?.expect("present"), b"<div>bye</div>".to_vec());
        assert!(s.get("never-stored")?.is_none());
        s.close()?;
    }

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
