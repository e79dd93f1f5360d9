use anyhow::Result;
use std::path::PathBuf;

use StashDB::store::Store;

use super::util::read_header;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let header = read_header(&path)?;
    let store = Store::open(&path, header.key_size)?;
    let st = store.status()?;
    store.close()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&st)?);
    } else {
        println!("store:         {}", st.path);
        println!("file_len:      {} B", st.file_len);
        println!("version_minor: {}", st.version_minor);
        println!("key_size:      {}", st.key_size);
        println!("segments:      {} ({} used)", st.segment_count, st.segments_used);
        println!("bloom:         {} B, k={}", st.bloom_bytes, st.bloom_k_hashes);
    }
    Ok(())
}
