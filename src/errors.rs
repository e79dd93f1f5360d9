//! Типизированные ошибки хранилища.
//!
//! Политика:
//! - InvalidFile / KeySizeMismatch — фатальны для операции, store остаётся рабочим.
//! - Io — пробрасывается как есть (файл/mmap/lock).
//! - CorruptChain — get() НЕ возвращает её наружу (фиксирует нарушение и отдаёт None);
//!   наружу её отдаёт verify() и внутренние проверки формата.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Первые 4 байта файла не совпали с магией формата.
    #[error("not a store file (bad magic): {path}")]
    InvalidFile { path: PathBuf },

    /// Размер ключа в заголовке не совпал с настроенным, либо put() получил
    /// ключ неверной длины.
    #[error("key size mismatch: expected {expected}, got {got}")]
    KeySizeMismatch { expected: u16, got: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// next_offset вне файла, немонотонная цепочка или entry за концом файла.
    #[error("corrupt chain in segment {segment}: {detail}")]
    CorruptChain { segment: u32, detail: String },

    /// Длина значения не помещается в u32 поля value_size.
    #[error("value too large for entry header: {0} bytes")]
    ValueTooLarge(u64),
}

pub type Result<T> = std::result::Result<T, StoreError>;
