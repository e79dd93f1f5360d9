use anyhow::Result;
use std::path::PathBuf;

use StashDB::metrics;
use StashDB::store::Store;

/// Отрицательный get на свежем хранилище отсекается bloom-фильтром:
/// ни одного шага по entries-области.
///
/// Единственный тест в файле: метрики процессные, параллельные тесты
/// в одном бинаре сдвинули бы счётчики.
#[test]
fn negative_get_short_circuits() -> Result<()> {
    let path = unique_path("bloom-neg");
    let mut store = Store::open(&path, 8)?;

    let before = metrics::snapshot();
    assert!(store.get(b"ABSENT__")?.is_none());
    let after = metrics::snapshot();

    assert_eq!(after.bloom_negative, before.bloom_negative + 1);
    assert_eq!(after.chain_steps, before.chain_steps, "no entry reads on bloom negative");

    // После вставки другой ключ всё ещё отсекается, вставленный — находится.
    store.put(b"PRESENT_", b"x")?;
    assert!(store.get(b"ABSENT__")?.is_none());
    assert_eq!(store.get(b"PRESENT_")?.expect("present").as_slice(), b"x");

    // Переоткрытие: bloom восстановлен из файла, отрицания не появились.
    store.close()?;
    let store = Store::open(&path, 8)?;
    assert_eq!(store.get(b"PRESENT_")?.expect("present").as_slice(), b"x");
    assert!(store.get(b"ABSENT__")?.is_none());
    store.close()?;

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
