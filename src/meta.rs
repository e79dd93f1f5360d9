// src/meta.rs — заголовок файла хранилища (24 байта, LE)
//
// [MAGIC4 = "SHS1"]
// [version_minor u16]   -- минорные версии обратно совместимы: читаем и более новые
// [key_size u16]
// [segment_count u32]
// [bloom_bits u64]      -- байтовый размер bloom-области (имя поля историческое)
// [pad u32 = 0]
//
// Несовместимые изменения формата меняют последнюю цифру магии.

use crate::consts::{
    bloom_offset, HEADER_SIZE, MAGIC, OFF_BLOOM_BYTES, OFF_KEY_SIZE, OFF_MAGIC, OFF_SEGMENTS,
    OFF_VERSION,
};
use crate::errors::{Result, StoreError};
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct StoreHeader {
    pub version_minor: u16,
    pub key_size: u16,
    pub segment_count: u32,
    /// Байтовый размер bloom-области (см. имя поля в раскладке).
    pub bloom_bytes: u64,
}

impl StoreHeader {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[OFF_MAGIC..OFF_MAGIC + 4].copy_from_slice(MAGIC);
        LittleEndian::write_u16(&mut buf[OFF_VERSION..OFF_VERSION + 2], self.version_minor);
        LittleEndian::write_u16(&mut buf[OFF_KEY_SIZE..OFF_KEY_SIZE + 2], self.key_size);
        LittleEndian::write_u32(&mut buf[OFF_SEGMENTS..OFF_SEGMENTS + 4], self.segment_count);
        LittleEndian::write_u64(&mut buf[OFF_BLOOM_BYTES..OFF_BLOOM_BYTES + 8], self.bloom_bytes);
        buf
    }

    /// Разбор заголовка. buf — первые HEADER_SIZE байт файла.
    pub fn decode(buf: &[u8], path: &Path) -> Result<Self> {
        if buf.len() < HEADER_SIZE || &buf[OFF_MAGIC..OFF_MAGIC + 4] != MAGIC {
            return Err(StoreError::InvalidFile {
                path: path.to_path_buf(),
            });
        }
        let version_minor = LittleEndian::read_u16(&buf[OFF_VERSION..OFF_VERSION + 2]);
        let key_size = LittleEndian::read_u16(&buf[OFF_KEY_SIZE..OFF_KEY_SIZE + 2]);
        let segment_count = LittleEndian::read_u32(&buf[OFF_SEGMENTS..OFF_SEGMENTS + 4]);
        let bloom_bytes = LittleEndian::read_u64(&buf[OFF_BLOOM_BYTES..OFF_BLOOM_BYTES + 8]);

        // Структурно невозможный заголовок — это не наш файл.
        if segment_count == 0 {
            return Err(StoreError::InvalidFile {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            version_minor,
            key_size,
            segment_count,
            bloom_bytes,
        })
    }

    /// Смещение bloom-области (за bucket table).
    #[inline]
    pub fn bloom_offset(&self) -> u64 {
        bloom_offset(self.segment_count)
    }

    /// Конец зарезервированной bloom-области; при создании файла entries
    /// начинаются отсюда.
    #[inline]
    pub fn bloom_end(&self) -> u64 {
        self.bloom_offset() + self.bloom_bytes
    }
}
