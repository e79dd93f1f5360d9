//! Stable hashing for keys and segments.
//!
//! Goals:
//! - Use an explicit, platform-invariant hash (BLAKE2b via the `blake2` crate,
//!   not std::DefaultHasher) so segment mapping and stored key hashes are part
//!   of the wire contract.
//! - Keep the two digests separate: an 8-byte digest drives lookup/segment
//!   selection, a 16-byte digest drives the Bloom double-hash pair. BLAKE2b
//!   output length is a parameter, so these are distinct digests, not a
//!   truncation of one another.

use blake2::digest::consts::{U16, U8};
use blake2::{Blake2b, Digest};
use byteorder::{ByteOrder, LittleEndian};

type Blake2b64 = Blake2b<U8>;
type Blake2b128 = Blake2b<U16>;

/// 64-bit key hash: BLAKE2b-8 digest loaded as LE u64.
/// Stored in every entry header and used for segment selection.
pub fn key_hash64(key: &[u8]) -> u64 {
    let digest = Blake2b64::digest(key);
    LittleEndian::read_u64(digest.as_slice())
}

/// Bloom double-hash pair: BLAKE2b-16 digest split into two LE u64 halves.
pub fn bloom_pair(key: &[u8]) -> (u64, u64) {
    let digest = Blake2b128::digest(key);
    let d = digest.as_slice();
    let h1 = LittleEndian::read_u64(&d[0..8]);
    let h2 = LittleEndian::read_u64(&d[8..16]);
    (h1, h2)
}

/// Segment index from a 64-bit hash. segment_count need not be a power of two.
#[inline]
pub fn segment_index(hash: u64, segment_count: u32) -> u32 {
    debug_assert!(segment_count > 0, "segment_count must be > 0");
    (hash % segment_count as u64) as u32
}
