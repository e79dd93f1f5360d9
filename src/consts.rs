// Файл хранилища (один файл на store):
//
// [Header 24B][Bucket table 8*segment_count][Bloom bytes][Entries ...]
//
// Header (LE):
// [MAGIC4 = "SHS1"]
// [version_minor u16]
// [key_size u16]
// [segment_count u32]
// [bloom_bits u64]   -- исторически назван "bits", хранит БАЙТЫ bloom-области
// [pad u32 = 0]
pub const MAGIC: &[u8; 4] = b"SHS1";
pub const VERSION_MINOR: u16 = 1;

pub const HEADER_SIZE: usize = 24;

// Смещения полей заголовка
pub const OFF_MAGIC: usize = 0;
pub const OFF_VERSION: usize = 4;
pub const OFF_KEY_SIZE: usize = 6;
pub const OFF_SEGMENTS: usize = 8;
pub const OFF_BLOOM_BYTES: usize = 12;

// Bucket table: сразу за заголовком, u64 LE на сегмент (0 = пустая цепочка).
pub const TABLE_OFFSET: u64 = HEADER_SIZE as u64;
pub const SLOT_SIZE: u64 = 8;

// Entry header (LE):
// [next_offset u64]  -- 0 = хвост цепочки
// [key_hash u64]     -- BLAKE2b-8 ключа
// [value_size u32]
// затем key_size байт ключа и value_size байт значения.
pub const ENTRY_HDR_SIZE: usize = 20;
pub const OFF_ENTRY_NEXT: usize = 0;
pub const OFF_ENTRY_HASH: usize = 8;
pub const OFF_ENTRY_VLEN: usize = 16;

/// Нулевой offset — терминатор цепочки (валидный entry не может начинаться в заголовке).
pub const NO_ENTRY: u64 = 0;

// Значения по умолчанию (см. config.rs)
pub const DEFAULT_SEGMENT_COUNT: u32 = 256;
pub const DEFAULT_BLOOM_FP: f64 = 0.01;
pub const DEFAULT_CAPACITY_HINT: u64 = 100_000;

/// Смещение 8-байтового слота головы сегмента.
#[inline]
pub fn slot_offset(segment: u32) -> u64 {
    TABLE_OFFSET + SLOT_SIZE * segment as u64
}

/// Смещение bloom-области: сразу за bucket table.
#[inline]
pub fn bloom_offset(segment_count: u32) -> u64 {
    TABLE_OFFSET + SLOT_SIZE * segment_count as u64
}
