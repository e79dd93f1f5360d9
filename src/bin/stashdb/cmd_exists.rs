use anyhow::Result;
use std::path::PathBuf;

use StashDB::store::Store;

use super::util::{decode_key_arg, read_header};

pub fn exec(path: PathBuf, key: String) -> Result<()> {
    let header = read_header(&path)?;
    let key_bytes = decode_key_arg(&key, header.key_size)?;

    let store = Store::open(&path, header.key_size)?;
    let present = store.get(&key_bytes)?.is_some();
    store.close()?;

    println!("{}", present);
    Ok(())
}
