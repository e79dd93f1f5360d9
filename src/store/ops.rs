//! store/ops — операции хранилища.
//!
//! - put: append-and-link под эксклюзивом на слот головы сегмента.
//! - get: bloom short-circuit, затем обход цепочки по отображению; читатели
//!   без локов.
//! - flush: слить bloom в файл (OR), переписать заголовок, msync.
//! - status/verify: наблюдаемость и аудит формата.
//!
//! Цепочки prepend-only (LIFO): новый entry становится головой и ссылается
//! на прежнюю голову, поэтому get() возвращает самое свежее значение ключа.

use std::io;

use byteorder::{ByteOrder, LittleEndian};
use log::warn;
use memmap2::MmapMut;
use serde::Serialize;

use crate::consts::{
    slot_offset, ENTRY_HDR_SIZE, HEADER_SIZE, NO_ENTRY, OFF_ENTRY_HASH, OFF_ENTRY_NEXT,
    OFF_ENTRY_VLEN, SLOT_SIZE,
};
use crate::errors::{Result, StoreError};
use crate::hash::{key_hash64, segment_index};
use crate::lock::lock_range_exclusive;
use crate::metrics::{
    record_bloom_negative, record_bloom_positive, record_chain_corrupt, record_chain_step,
    record_flush, record_put,
};

use super::Store;

/// Итог одного прохода по цепочке сегмента.
enum Walk {
    Found(Vec<u8>),
    Absent,
    /// Смещение за границей отображения: либо файл вырос у другого писателя
    /// (лечится remap'ом), либо цепочка ссылается за конец файла.
    OutOfMap { offset: u64 },
    /// Нарушение строгого убывания смещений — remap не поможет.
    Corrupt { offset: u64, detail: &'static str },
}

impl Store {
    /// Самое свежее значение ключа, либо None.
    ///
    /// Длина ключа не обязана совпадать с key_size: такой ключ просто ни с
    /// одним entry не совпадёт. За пределы key_size хранимого ключа чтение
    /// не выходит.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let h = key_hash64(key);

        if !self.bloom.contains(key) {
            record_bloom_negative();
            return Ok(None);
        }
        record_bloom_positive();

        let segment = segment_index(h, self.header.segment_count);
        let key_size = self.header.key_size as usize;

        let mut refreshed = false;
        loop {
            let map = self.map_read()?;
            match walk_chain(&map, key_size, segment, h, key) {
                Walk::Found(v) => return Ok(Some(v)),
                Walk::Absent => return Ok(None),
                Walk::OutOfMap { .. } if !refreshed => {
                    // Файл мог вырасти у параллельного писателя.
                    drop(map);
                    self.remap()?;
                    refreshed = true;
                }
                Walk::OutOfMap { offset } => {
                    self.note_corruption(segment, format!("entry at {} beyond end of file", offset));
                    return Ok(None);
                }
                Walk::Corrupt { offset, detail } => {
                    self.note_corruption(segment, format!("entry at {}: {}", offset, detail));
                    return Ok(None);
                }
            }
        }
    }

    /// Зафиксировать нарушение формата цепочки: счётчик + warn. get() после
    /// этого отвечает None, не падая.
    fn note_corruption(&self, segment: u32, detail: String) {
        record_chain_corrupt();
        let err = StoreError::CorruptChain { segment, detail };
        warn!("{}: {}", self.path.display(), err);
    }

    /// Append-insert. Повторный put того же ключа НЕ идемпотентен: новая
    /// entry становится головой цепочки и затеняет прежние (удаления нет,
    /// перезапись — это вставка более свежей entry).
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let key_size = self.header.key_size as usize;
        if key.len() != key_size {
            return Err(StoreError::KeySizeMismatch {
                expected: self.header.key_size,
                got: key.len(),
            });
        }
        if value.len() as u64 > u32::MAX as u64 {
            return Err(StoreError::ValueTooLarge(value.len() as u64));
        }

        let h = key_hash64(key);
        let segment = segment_index(h, self.header.segment_count);
        let slot = slot_offset(segment);

        // Эксклюзив на 8-байтовый слот головы: писатели одного сегмента
        // сериализуются, разных — идут параллельно. Снимается по Drop на
        // всех путях выхода.
        let _slot_lock = lock_range_exclusive(&self.file, &self.lock_file, slot, SLOT_SIZE)?;

        let old_head = {
            let map = self.map_read()?;
            Self::load_head(&map, slot)
        };

        let entry_len = ENTRY_HDR_SIZE + key_size + value.len();
        let eof = self.reserve_extent(entry_len as u64)?;
        self.remap()?;

        {
            let mut map = self.map_write()?;
            let start = eof as usize;
            {
                // Отображение покрывает экстент: remap выше пересоздал его под
                // текущую (только растущую) длину файла.
                let buf = &mut map[start..start + entry_len];
                LittleEndian::write_u64(&mut buf[OFF_ENTRY_NEXT..OFF_ENTRY_NEXT + 8], old_head);
                LittleEndian::write_u64(&mut buf[OFF_ENTRY_HASH..OFF_ENTRY_HASH + 8], h);
                LittleEndian::write_u32(
                    &mut buf[OFF_ENTRY_VLEN..OFF_ENTRY_VLEN + 4],
                    value.len() as u32,
                );
                buf[ENTRY_HDR_SIZE..ENTRY_HDR_SIZE + key_size].copy_from_slice(key);
                buf[ENTRY_HDR_SIZE + key_size..].copy_from_slice(value);
            }

            // Публикация: голова переключается release-store'ом только после
            // полной записи байт entry.
            Self::store_head(&map, slot, eof);
        }

        self.bloom.add(key);
        self.hdr_dirty = true;
        record_put(entry_len);
        Ok(())
    }

    /// Зарезервировать [eof, eof+len) в конце файла.
    ///
    /// На unix — под коротким эксклюзивом на байты заголовка, чтобы писатели
    /// РАЗНЫХ сегментов не получили пересекающиеся экстенты. Вне unix
    /// слот-lock уже сериализует всех писателей через sidecar.
    fn reserve_extent(&self, len: u64) -> Result<u64> {
        #[cfg(unix)]
        let _alloc_lock =
            lock_range_exclusive(&self.file, &self.lock_file, 0, HEADER_SIZE as u64)?;
        let eof = self.file.metadata()?.len();
        self.file.set_len(eof + len)?;
        Ok(eof)
    }

    /// Сохранить bloom и заголовок, затем msync всего отображения.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_inner()
    }

    pub(crate) fn flush_inner(&mut self) -> Result<()> {
        if self.hdr_dirty {
            // Эксклюзив на заголовок: сериализуемся с flush других процессов
            // и с резервированием экстентов. Биты bloom сливаются через OR —
            // параллельные писатели не затирают чужие добавления.
            let _hdr_lock =
                lock_range_exclusive(&self.file, &self.lock_file, 0, HEADER_SIZE as u64)?;

            let bloom_off = self.header.bloom_offset() as usize;
            let reserved = self.header.bloom_bytes as usize;
            // Прямой доступ к полю: рядом мутируются bloom и header
            let mut map = self
                .map
                .write()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "store mapping lock poisoned"))?;
            if map.len() < bloom_off + reserved {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{}: bloom region [{}, {}) exceeds mapping of {} bytes",
                        self.path.display(),
                        bloom_off,
                        bloom_off + reserved,
                        map.len()
                    ),
                )
                .into());
            }

            self.bloom.merge_into(&mut map[bloom_off..bloom_off + reserved]);
            self.header.bloom_bytes = self.bloom.byte_len() as u64;
            let hdr = self.header.encode();
            map[..HEADER_SIZE].copy_from_slice(&hdr);
            drop(map);

            self.hdr_dirty = false;
        }

        let map = self.map_read()?;
        map.flush()?;
        record_flush();
        Ok(())
    }

    /// Flush + освобождение отображения, файла и локфайла. Поглощает store:
    /// операции после close не компилируются.
    pub fn close(mut self) -> Result<()> {
        self.flush_inner()
        // Отображение и дескрипторы освобождает Drop полей.
    }

    /// Сводка по открытому хранилищу.
    pub fn status(&self) -> Result<StoreStatus> {
        Ok(StoreStatus {
            path: self.path.display().to_string(),
            file_len: self.file_len()?,
            version_minor: self.header.version_minor,
            key_size: self.header.key_size,
            segment_count: self.header.segment_count,
            bloom_bytes: self.header.bloom_bytes,
            bloom_k_hashes: self.bloom.k_hashes(),
            segments_used: self.count_used_segments()?,
            dirty: self.hdr_dirty,
        })
    }

    /// Аудит формата: обход всех цепочек с проверкой границ и строгого
    /// убывания смещений. Нарушение фиксируется в отчёте, обход продолжается
    /// со следующего сегмента.
    pub fn verify(&self) -> Result<VerifyReport> {
        // Увидеть appends других процессов.
        self.remap()?;
        let map = self.map_read()?;
        let key_size = self.header.key_size as usize;
        let file_len = map.len() as u64;

        let mut report = VerifyReport {
            segment_count: self.header.segment_count,
            ..Default::default()
        };

        for segment in 0..self.header.segment_count {
            let mut off = Self::load_head(&map, slot_offset(segment));
            if off != NO_ENTRY {
                report.segments_used += 1;
            }
            let mut chain_len = 0u64;
            while off != NO_ENTRY {
                let fixed = (ENTRY_HDR_SIZE + key_size) as u64;
                if off.checked_add(fixed).map_or(true, |end| end > file_len) {
                    report.corrupt_chains += 1;
                    break;
                }
                let start = off as usize;
                let next =
                    LittleEndian::read_u64(&map[start + OFF_ENTRY_NEXT..start + OFF_ENTRY_NEXT + 8]);
                let vlen = LittleEndian::read_u32(
                    &map[start + OFF_ENTRY_VLEN..start + OFF_ENTRY_VLEN + 4],
                ) as u64;
                if off + fixed + vlen > file_len {
                    report.corrupt_chains += 1;
                    break;
                }
                if next != NO_ENTRY && next >= off {
                    report.corrupt_chains += 1;
                    break;
                }
                chain_len += 1;
                report.entries += 1;
                off = next;
            }
            report.longest_chain = report.longest_chain.max(chain_len);
        }

        Ok(report)
    }
}

fn walk_chain(map: &MmapMut, key_size: usize, segment: u32, h: u64, key: &[u8]) -> Walk {
    let mut off = Store::load_head(map, slot_offset(segment));
    while off != NO_ENTRY {
        let fixed = (ENTRY_HDR_SIZE + key_size) as u64;
        if off.checked_add(fixed).map_or(true, |end| end > map.len() as u64) {
            return Walk::OutOfMap { offset: off };
        }
        let start = off as usize;
        let next = LittleEndian::read_u64(&map[start + OFF_ENTRY_NEXT..start + OFF_ENTRY_NEXT + 8]);
        let stored_hash =
            LittleEndian::read_u64(&map[start + OFF_ENTRY_HASH..start + OFF_ENTRY_HASH + 8]);
        let vlen =
            LittleEndian::read_u32(&map[start + OFF_ENTRY_VLEN..start + OFF_ENTRY_VLEN + 4])
                as usize;

        // Append-only аллокация: next всегда строго меньше собственного
        // смещения. Нарушение означает цикл или мусор.
        if next != NO_ENTRY && next >= off {
            return Walk::Corrupt {
                offset: off,
                detail: "next offset not decreasing",
            };
        }

        record_chain_step();

        if stored_hash == h {
            let kstart = start + ENTRY_HDR_SIZE;
            if &map[kstart..kstart + key_size] == key {
                let vstart = kstart + key_size;
                let vend = vstart + vlen;
                if vend > map.len() {
                    return Walk::OutOfMap { offset: off };
                }
                return Walk::Found(map[vstart..vend].to_vec());
            }
        }

        off = next;
    }
    Walk::Absent
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub path: String,
    pub file_len: u64,
    pub version_minor: u16,
    pub key_size: u16,
    pub segment_count: u32,
    pub bloom_bytes: u64,
    pub bloom_k_hashes: u32,
    pub segments_used: u32,
    pub dirty: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub segment_count: u32,
    pub segments_used: u32,
    pub entries: u64,
    pub longest_chain: u64,
    pub corrupt_chains: u32,
}
