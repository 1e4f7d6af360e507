use sha3::{Digest, Keccak256};

pub type Hash32 = [u8; 32];

/// Keccak-256, the hash eth uses for headers and transactions.
pub fn hash(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut output: Hash32 = [0; 32];
    output.copy_from_slice(hasher.finalize().as_slice());
    output
}

pub fn hash_as_hex(data: &[u8]) -> String {
    hex::encode(hash(data))
}
