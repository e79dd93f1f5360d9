use anyhow::{anyhow, bail, Context, Result};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

use StashDB::meta::StoreHeader;
use StashDB::selector::SelectorStore;

/// Прочитать заголовок файла, не открывая Store (даёт key_size для команд).
pub fn read_header(path: &Path) -> Result<StoreHeader> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut buf = [0u8; StashDB::consts::HEADER_SIZE];
    f.read_exact(&mut buf)
        .with_context(|| format!("read header of {}", path.display()))?;
    Ok(StoreHeader::decode(&buf, path)?)
}

/// Ключ из аргумента:
/// - "hex:<bytes>"  — бинарный ключ, длина должна совпасть с key_size;
/// - "sel:<text>"   — 8-байтовый ключ-хеш селектора (только key_size=8);
/// - иначе          — сырые байты строки, длина должна совпасть с key_size.
pub fn decode_key_arg(arg: &str, key_size: u16) -> Result<Vec<u8>> {
    if let Some(hx) = arg.strip_prefix("hex:") {
        let v = hex_bytes(hx)?;
        if v.len() != key_size as usize {
            bail!("hex key is {} bytes, store key_size is {}", v.len(), key_size);
        }
        return Ok(v);
    }
    if let Some(sel) = arg.strip_prefix("sel:") {
        if key_size != 8 {
            bail!("sel: keys need key_size=8, store has {}", key_size);
        }
        return Ok(SelectorStore::selector_key(sel).to_vec());
    }
    let raw = arg.as_bytes().to_vec();
    if raw.len() != key_size as usize {
        bail!(
            "key is {} bytes, store key_size is {} (use hex: or sel:)",
            raw.len(),
            key_size
        );
    }
    Ok(raw)
}

/// Значение из аргумента. Префиксы зеркалят конвенции selector-слоя
/// (b64 декодируется, прочий текст уходит байтами UTF-8); "@<path>"
/// читает файл, "hex:" — для бинарных значений в скриптах.
pub fn parse_value_arg(arg: &str) -> Result<Vec<u8>> {
    if let Some(p) = arg.strip_prefix('@') {
        return std::fs::read(p).with_context(|| format!("read value file {}", p));
    }
    if let Some(b64) = arg.strip_prefix("b64:") {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        return STANDARD
            .decode(b64)
            .map_err(|e| anyhow!("bad base64 value: {}", e));
    }
    if let Some(hx) = arg.strip_prefix("hex:") {
        return hex_bytes(hx);
    }
    Ok(arg.as_bytes().to_vec())
}

/// "deadbeef" → байты. Длина обязана быть чётной.
pub fn hex_bytes(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        bail!("odd hex length {}", s.len());
    }
    s.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).map_err(|_| anyhow!("non-ascii hex digit"))?;
            u8::from_str_radix(digits, 16).map_err(|_| anyhow!("bad hex pair '{}'", digits))
        })
        .collect()
}
