//! store/open — создание/открытие файла хранилища.
//!
//! Политика создания:
//! - Гонка create/open закрывается эксклюзивом на sidecar-локфайле:
//!   кто первым взял lock, тот и создаёт файл (create_new).
//! - Bloom-область резервируется ЦЕЛИКОМ под capacity_hint, поэтому
//!   append entries никогда не пересекает её, а flush пишет bloom по
//!   исходному смещению без конфликтов.
//!
//! При открытии существующего файла segment_count берётся из заголовка
//! (настроенное значение игнорируется), bloom перечитывается из файла.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::RwLock;

use log::debug;
use memmap2::MmapMut;

use crate::bloom::Bloom;
use crate::config::StoreConfig;
use crate::consts::VERSION_MINOR;
use crate::errors::{Result, StoreError};
use crate::lock::{open_sidecar_lock, FileLockGuard};
use crate::meta::StoreHeader;

use super::Store;

impl Store {
    /// Открыть существующий файл или создать новый. Конфигурация — из
    /// окружения (SHS_*), см. StoreConfig::from_env().
    pub fn open(path: impl AsRef<Path>, key_size: u16) -> Result<Store> {
        Self::open_with(path, key_size, StoreConfig::from_env())
    }

    /// Открыть/создать с явной конфигурацией.
    pub fn open_with(path: impl AsRef<Path>, key_size: u16, cfg: StoreConfig) -> Result<Store> {
        let path = path.as_ref();
        let lock_file = open_sidecar_lock(path)?;

        let created = {
            let _guard = FileLockGuard::exclusive(&lock_file)?;
            if path.exists() {
                false
            } else {
                create_store_file(path, key_size, &cfg)?;
                true
            }
        };

        Self::open_existing(path, key_size, &cfg, lock_file, created)
    }

    fn open_existing(
        path: &Path,
        key_size: u16,
        cfg: &StoreConfig,
        lock_file: std::fs::File,
        created: bool,
    ) -> Result<Store> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let map = unsafe { MmapMut::map_mut(&file)? };

        let header = StoreHeader::decode(&map, path)?;
        if header.key_size != key_size {
            return Err(StoreError::KeySizeMismatch {
                expected: header.key_size,
                got: key_size as usize,
            });
        }
        if header.version_minor > VERSION_MINOR {
            // Минорные версии — обратно совместимые добавления: читаем как есть.
            debug!(
                "{}: minor version {} newer than supported {}, reading anyway",
                path.display(),
                header.version_minor,
                VERSION_MINOR
            );
        }
        if !created && cfg.segment_count != header.segment_count {
            debug!(
                "{}: adopting segment_count {} from header (configured {})",
                path.display(),
                header.segment_count,
                cfg.segment_count
            );
        }

        // Инвариант формата: bloom-область (а значит и bucket table) внутри файла.
        let bloom_off = header.bloom_offset();
        let bloom_end = header.bloom_end();
        if bloom_end > map.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{}: bloom region [{}, {}) exceeds file length {}",
                    path.display(),
                    bloom_off,
                    bloom_end,
                    map.len()
                ),
            )
            .into());
        }

        let bloom_bytes = map[bloom_off as usize..bloom_end as usize].to_vec();
        let bloom = Bloom::from_bytes(bloom_bytes, cfg.bloom_fp);

        debug!(
            "opened store {} (segments={}, key_size={}, bloom={} B, k={})",
            path.display(),
            header.segment_count,
            header.key_size,
            header.bloom_bytes,
            bloom.k_hashes()
        );

        Ok(Store {
            path: path.to_path_buf(),
            file,
            lock_file,
            map: RwLock::new(map),
            header,
            bloom,
            hdr_dirty: created,
        })
    }
}

/// Записать новый файл: заголовок + нулевая bucket table + нулевая
/// bloom-область полного размера.
fn create_store_file(path: &Path, key_size: u16, cfg: &StoreConfig) -> Result<()> {
    let bloom = Bloom::with_capacity(cfg.capacity_hint, cfg.bloom_fp);
    let header = StoreHeader {
        version_minor: VERSION_MINOR,
        key_size,
        segment_count: cfg.segment_count.max(1),
        bloom_bytes: bloom.reserved_len() as u64,
    };

    let file = OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .open(path)?;

    // set_len заполняет table и bloom-область нулями
    file.set_len(header.bloom_end())?;
    let mut w = &file;
    w.write_all(&header.encode())?;
    file.sync_all()?;

    debug!("created store {} ({})", path.display(), cfg);
    Ok(())
}
