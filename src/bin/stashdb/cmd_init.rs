use anyhow::{anyhow, Result};
use std::path::PathBuf;

use StashDB::config::StoreConfig;
use StashDB::store::Store;

pub fn exec(path: PathBuf, key_size: u16, segments: u32, bloom_fp: f64, capacity: u64) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("store already exists at {}", path.display()));
    }
    let cfg = StoreConfig::default()
        .with_segment_count(segments)
        .with_bloom_fp(bloom_fp)
        .with_capacity_hint(capacity);
    let store = Store::open_with(&path, key_size, cfg)?;
    let st = store.status()?;
    store.close()?;
    println!(
        "OK init: {} (key_size={}, segments={}, bloom={} B reserved)",
        path.display(),
        key_size,
        st.segment_count,
        st.bloom_bytes
    );
    Ok(())
}
