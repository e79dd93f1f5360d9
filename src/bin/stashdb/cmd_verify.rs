use anyhow::{anyhow, Result};
use std::path::PathBuf;

use StashDB::store::Store;

use super::util::read_header;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let header = read_header(&path)?;
    let store = Store::open(&path, header.key_size)?;
    let report = store.verify()?;
    store.close()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "segments: {} ({} used), entries: {}, longest chain: {}, corrupt chains: {}",
            report.segment_count,
            report.segments_used,
            report.entries,
            report.longest_chain,
            report.corrupt_chains
        );
    }

    if report.corrupt_chains > 0 {
        return Err(anyhow!("verify found {} corrupt chains", report.corrupt_chains));
    }
    Ok(())
}
