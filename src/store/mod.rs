//! store — ядро: структура Store и общие helpers отображения/голов сегментов.
//!
//! Разнесение:
//! - open.rs — создание/открытие файла (create-guard, загрузка bloom).
//! - ops.rs  — операции (get/put/flush/close/status/verify).
//! - mod.rs  — структура, доступ к mmap, атомарные головы, Drop.
//!
//! Модель владения: открытый Store эксклюзивно владеет дескриптором файла,
//! отображением и bloom-экземпляром. Несколько процессов координируются
//! через advisory-локи (lock.rs), а не через разделяемое состояние в памяти.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use memmap2::MmapMut;

use crate::bloom::Bloom;
use crate::consts::{slot_offset, NO_ENTRY};
use crate::errors::Result;
use crate::meta::StoreHeader;

pub mod open;
pub mod ops;

pub use ops::{StoreStatus, VerifyReport};

#[derive(Debug)]
pub struct Store {
    pub(crate) path: PathBuf,
    pub(crate) file: File,
    // sidecar-локфайл: guard создания + деградация range-локов вне unix
    pub(crate) lock_file: File,
    // RwLock: параллельные get() по Arc<Store> делят отображение на чтение,
    // ленивый remap при росте файла берёт его на запись
    pub(crate) map: RwLock<MmapMut>,
    pub(crate) header: StoreHeader,
    pub(crate) bloom: Bloom,
    pub(crate) hdr_dirty: bool,
}

impl Store {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn key_size(&self) -> u16 {
        self.header.key_size
    }

    #[inline]
    pub fn segment_count(&self) -> u32 {
        self.header.segment_count
    }

    #[inline]
    pub fn version_minor(&self) -> u16 {
        self.header.version_minor
    }

    /// Байтовый размер bloom-области, зарезервированной в файле.
    #[inline]
    pub fn bloom_reserved_bytes(&self) -> u64 {
        self.header.bloom_bytes
    }

    /// Есть ли несохранённое состояние заголовка/bloom.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.hdr_dirty
    }

    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Сколько сегментов имеют непустую цепочку.
    pub fn count_used_segments(&self) -> Result<u32> {
        let map = self.map_read()?;
        let mut used = 0u32;
        for segment in 0..self.header.segment_count {
            if Self::load_head(&map, slot_offset(segment)) != NO_ENTRY {
                used += 1;
            }
        }
        Ok(used)
    }

    // -------- доступ к отображению --------

    pub(crate) fn map_read(&self) -> Result<RwLockReadGuard<'_, MmapMut>> {
        self.map
            .read()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store mapping lock poisoned").into())
    }

    pub(crate) fn map_write(&self) -> Result<RwLockWriteGuard<'_, MmapMut>> {
        self.map
            .write()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store mapping lock poisoned").into())
    }

    /// Пересоздать отображение под текущую длину файла (файл только растёт).
    pub(crate) fn remap(&self) -> Result<()> {
        let mut guard = self.map_write()?;
        *guard = unsafe { MmapMut::map_mut(&self.file)? };
        crate::metrics::record_remap();
        Ok(())
    }

    // -------- головы сегментов --------
    //
    // Слоты bucket table 8-байтовые и выровнены (таблица начинается на 24),
    // поэтому допускают атомарный доступ прямо через отображение. Значение
    // на диске — LE u64; to_le/from_le делают доступ корректным и на BE.

    pub(crate) fn load_head(map: &MmapMut, slot_off: u64) -> u64 {
        debug_assert_eq!(slot_off % 8, 0);
        debug_assert!(slot_off as usize + 8 <= map.len());
        let atom = unsafe { &*(map.as_ptr().add(slot_off as usize) as *const AtomicU64) };
        u64::from_le(atom.load(Ordering::Acquire))
    }

    /// Release-store: вызывающий обязан полностью записать entry ДО публикации
    /// её смещения в голове.
    pub(crate) fn store_head(map: &MmapMut, slot_off: u64, value: u64) {
        debug_assert_eq!(slot_off % 8, 0);
        debug_assert!(slot_off as usize + 8 <= map.len());
        let atom = unsafe { &*(map.as_ptr().add(slot_off as usize) as *const AtomicU64) };
        atom.store(value.to_le(), Ordering::Release);
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Best-effort: не потерять bloom/заголовок при выходе без close().
        if self.hdr_dirty {
            let _ = self.flush_inner();
        }
    }
}
