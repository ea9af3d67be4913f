//! Entity id generation
//!
//! Every row gets a `<prefix>-<random16>` id, e.g. `album-Mk8AnmCp210PwT6B`.

use rand::Rng;

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LENGTH: usize = 16;

/// generate a random string of the given length
pub fn random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..ID_CHARSET.len());
            ID_CHARSET[idx] as char
        })
        .collect()
}

/// generate a prefixed entity id
pub fn entity_id(prefix: &str) -> String {
    format!("{}-{}", prefix, random_string(ID_SUFFIX_LENGTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string() {
        let s1 = random_string(16);
        let s2 = random_string(16);

        assert_eq!(s1.len(), 16);
        assert_eq!(s2.len(), 16);
        assert_ne!(s1, s2); // Should be different (with very high probability)
        assert!(s1.bytes().all(|b| ID_CHARSET.contains(&b)));
    }

    #[test]
    fn test_entity_id() {
        let id = entity_id("album");
        assert!(id.starts_with("album-"));
        assert_eq!(id.len(), "album-".len() + ID_SUFFIX_LENGTH);
    }
}
