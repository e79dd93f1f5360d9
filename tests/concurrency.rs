use anyhow::Result;
use std::path::PathBuf;
use std::thread;

use StashDB::config::StoreConfig;
use StashDB::store::Store;

const WRITERS: u64 = 8;
const KEYS_PER_WRITER: u64 = 50;

fn key_of(writer: u64, i: u64) -> [u8; 8] {
    ((writer << 32) | i).to_le_bytes()
}

fn value_of(writer: u64, i: u64) -> Vec<u8> {
    format!("w{}-v{}", writer, i).into_bytes()
}

/// Параллельные писатели (каждый со своим хэндлом того же файла): все put
/// успешны, все значения читаются свежим хэндлом после закрытия писателей.
/// Ключи рассыпаются по сегментам; писатели одного сегмента сериализуются
/// слот-локом, разных — идут параллельно.
#[test]
fn concurrent_writers_all_visible() -> Result<()> {
    let path = unique_path("concurrent");

    // Создать файл заранее, чтобы писатели открывали существующий
    {
        let cfg = StoreConfig::default().with_capacity_hint(2_000);
        let store = Store::open_with(&path, 8, cfg)?;
        store.close()?;
    }

    let mut handles = Vec::new();
    for w in 0..WRITERS {
        let p = path.clone();
        handles.push(thread::spawn(move || -> anyhow::Result<()> {
            let mut store = Store::open(&p, 8)?;
            for i in 0..KEYS_PER_WRITER {
                store.put(&key_of(w, i), &value_of(w, i))?;
            }
            store.close()?;
            Ok(())
        }));
    }
    for h in handles {
        h.join().expect("writer thread panicked")?;
    }

    // Свежий хэндл видит все записи всех писателей
    let store = Store::open(&path, 8)?;
    for w in 0..WRITERS {
        for i in 0..KEYS_PER_WRITER {
            let got = store
                .get(&key_of(w, i))?
                .unwrap_or_else(|| panic!("missing key w{} i{}", w, i));
            assert_eq!(got, value_of(w, i));
        }
    }

    let report = store.verify()?;
    assert_eq!(report.entries, WRITERS * KEYS_PER_WRITER);
    assert_eq!(report.corrupt_chains, 0);
    store.close()?;

    cleanup(&path);
    Ok(())
}

/// Читатель с собственным хэндлом видит записи писателя по мере появления
/// (та же машина: таблица и entries когерентны через page cache).
#[test]
fn reader_sees_writer_appends() -> Result<()> {
    let path = unique_path("reader");
    {
        let cfg = StoreConfig::default().with_capacity_hint(1_000);
        let store = Store::open_with(&path, 8, cfg)?;
        store.close()?;
    }

    let mut writer = Store::open(&path, 8)?;
    let reader = Store::open(&path, 8)?;

    for i in 0u64..100 {
        writer.put(&i.to_le_bytes(), b"tick")?;
        // Голова уже опубликована; читательский mmap догоняет ленивым remap'ом.
        // Bloom читателя загружен при открытии и пуст, поэтому спрашиваем
        // через verify-обход, а не через get (bloom у читателя отстаёт до
        // его переоткрытия — это контракт формата).
        let report = reader.verify()?;
        assert_eq!(report.entries, i + 1);
        assert_eq!(report.corrupt_chains, 0);
    }

    writer.close()?;
    reader.close()?;

    // После закрытия писателя свежий хэндл видит всё и через get
    let store = Store::open(&path, 8)?;
    for i in 0u64..100 {
        assert!(store.get(&i.to_le_bytes())?.is_some(), "key {} missing", i);
    }
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
