use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use StashDB::store::Store;

use super::util::{decode_key_arg, parse_value_arg, read_header};

pub fn exec(path: PathBuf, key: String, value: Option<String>, value_file: Option<PathBuf>) -> Result<()> {
    let header = read_header(&path)?;
    let key_bytes = decode_key_arg(&key, header.key_size)?;

    let val_bytes = match (value, value_file) {
        (_, Some(p)) => {
            std::fs::read(&p).with_context(|| format!("read value file {}", p.display()))?
        }
        (Some(s), None) => parse_value_arg(&s)?,
        (None, None) => bail!("either --value or --value-file must be provided"),
    };

    let mut store = Store::open(&path, header.key_size)?;
    store.put(&key_bytes, &val_bytes)?;
    store.close()?;
    println!("OK put: key='{}', value={} B", key, val_bytes.len());
    Ok(())
}
