//! Selector-слой поверх Store: строковый селектор → 8-байтовый ключ.
//!
//! Удобный фасад для вызывающего кода, которому ключи нужны не как байты,
//! а как UTF-8 идентификаторы (селекторы страниц, URL, имена ресурсов):
//! - ключ — raw xxHash64(selector), 8 байт digest'а в big-endian записи;
//! - строковое значение: если это строгий base64 — декодируем, иначе
//!   кладём UTF-8 байты как есть;
//! - put() сразу делает flush (немедленная durability для агентских
//!   сценариев с редкими записями).
//!
//! Ядро хранилища этих конвенций не навязывает: это слой адаптера.

use std::hash::Hasher;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::store::Store;

/// Длина ключа селекторного слоя: 64-битный xxHash.
pub const SELECTOR_KEY_SIZE: u16 = 8;

pub struct SelectorStore {
    store: Store,
}

impl SelectorStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: Store::open(path, SELECTOR_KEY_SIZE)?,
        })
    }

    pub fn open_with(path: impl AsRef<Path>, cfg: StoreConfig) -> Result<Self> {
        Ok(Self {
            store: Store::open_with(path, SELECTOR_KEY_SIZE, cfg)?,
        })
    }

    /// 8-байтовый ключ селектора: digest-байты xxHash64 (big-endian запись,
    /// как у канонического представления digest'а).
    pub fn selector_key(selector: &str) -> [u8; 8] {
        xxh64(selector.as_bytes()).to_be_bytes()
    }

    /// Сохранить сырые байты под селектором. Сразу flush.
    pub fn put_bytes(&mut self, selector: &str, value: &[u8]) -> Result<()> {
        let key = Self::selector_key(selector);
        self.store.put(&key, value)?;
        self.store.flush()
    }

    /// Сохранить строку: строгий base64 декодируется, прочее — UTF-8 байты.
    pub fn put_str(&mut self, selector: &str, value: &str) -> Result<()> {
        let bytes = coerce_str_value(value);
        self.put_bytes(selector, &bytes)
    }

    /// Байты, ранее сохранённые под селектором; None, если нет.
    pub fn get(&self, selector: &str) -> Result<Option<Vec<u8>>> {
        let key = Self::selector_key(selector);
        self.store.get(&key)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Доступ к нижележащему хранилищу (status/verify и т.п.).
    pub fn store(&self) -> &Store {
        &self.store
    }
}

fn coerce_str_value(value: &str) -> Vec<u8> {
    match BASE64.decode(value) {
        Ok(decoded) => decoded,
        Err(_) => value.as_bytes().to_vec(),
    }
}

fn xxh64(data: &[u8]) -> u64 {
    let mut h = twox_hash::XxHash64::with_seed(0);
    h.write(data);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_key_is_stable() {
        let a = SelectorStore::selector_key("div#main");
        let b = SelectorStore::selector_key("div#main");
        assert_eq!(a, b);
        assert_ne!(a, SelectorStore::selector_key("div#other"));
    }

    #[test]
    fn str_value_coercion() {
        // строгий base64 → декодированные байты
        assert_eq!(coerce_str_value("aGVsbG8="), b"hello".to_vec());
        // не base64 → UTF-8 как есть
        assert_eq!(coerce_str_value("<div>hi</div>"), b"<div>hi</div>".to_vec());
    }
}
