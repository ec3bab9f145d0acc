// Hashing utilities

use sha2::{Sha256, Digest};
use crate::core::Hash256;

/// SHA256 double hash
/// hash256 = SHA256(SHA256(data))
pub fn hash256(data: &[u8]) -> Hash256 {
    let first_hash = Sha256::digest(data);
    Hash256::new(sha256_hash(&first_hash))
}

/// Single SHA256 hash
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_known_vector() {
        // SHA256d("hello")
        let hash = hash256(b"hello");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_hash256_deterministic() {
        let data = b"hello world";
        assert_eq!(hash256(data), hash256(data));
    }

    #[test]
    fn test_hash256_is_sha_of_sha() {
        let data = b"genesis";
        let manual = sha256_hash(&sha256_hash(data));
        assert_eq!(hash256(data).as_bytes(), &manual);
    }
}
