use anyhow::{anyhow, Result};
use std::io::Write;
use std::path::PathBuf;

use StashDB::store::Store;

use super::util::{decode_key_arg, read_header};

pub fn exec(path: PathBuf, key: String, out: Option<PathBuf>) -> Result<()> {
    let header = read_header(&path)?;
    let key_bytes = decode_key_arg(&key, header.key_size)?;

    let store = Store::open(&path, header.key_size)?;
    let value = store.get(&key_bytes)?;
    store.close()?;

    let v = value.ok_or_else(|| anyhow!("key not found: '{}'", key))?;
    match out {
        Some(p) => {
            let mut f = std::fs::File::create(&p)?;
            f.write_all(&v)?;
            println!("OK get: {} B -> {}", v.len(), p.display());
        }
        None => match std::str::from_utf8(&v) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("(binary value, {} B; use --out to save)", v.len()),
        },
    }
    Ok(())
}
