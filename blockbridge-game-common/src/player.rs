use md5::{Digest, Md5};
use uuid::Uuid;

/// Name based (version 3) uuid of an unauthenticated player, the same value
/// every offline server derives from `OfflinePlayer:<name>`.
pub fn offline_player_uuid(name: &str) -> Uuid {
    let mut hasher = Md5::new();
    hasher.update(format!("OfflinePlayer:{}", name).as_bytes());
    let mut bytes: [u8; 16] = hasher.finalize().into();
    bytes[6] = (bytes[6] & 0x0f) | 0x30;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// Names accepted at login: 1 to 16 of `[A-Za-z0-9_]`.
pub fn is_valid_player_name(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_uuid_is_name_based() {
        let uuid = offline_player_uuid("Notch");
        assert_eq!(uuid.get_version_num(), 3);
        assert_eq!(uuid, offline_player_uuid("Notch"));
        assert_ne!(uuid, offline_player_uuid("notch"));
        assert_eq!(
            uuid.hyphenated().to_string(),
            "b50ad385-829d-3141-a216-7e7d7539ba7f"
        );
    }

    #[test]
    fn player_names() {
        assert!(is_valid_player_name("Steve_2"));
        assert!(!is_valid_player_name(""));
        assert!(!is_valid_player_name("seventeen_chars__"));
        assert!(!is_valid_player_name("bad name"));
    }
}
