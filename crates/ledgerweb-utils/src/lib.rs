//! Utility functions and helpers

/// Generate a short hash (8 characters) from content
pub fn short_hash(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let hash = hasher.finish();

    // Take first 8 characters of hex hash
    format!("{:016x}", hash)[..8].to_string()
}

/// Generate a unique entry ID from sequence number and content
pub fn generate_entry_id(sequence: u64, content: &str) -> String {
    format!("ent-{}:{}", sequence, short_hash(content))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash_stable() {
        let a = short_hash("Acme|Cash|2024-01-01");
        let b = short_hash("Acme|Cash|2024-01-01");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_generate_entry_id() {
        let id = generate_entry_id(42, "some content");
        assert!(id.starts_with("ent-42:"));
        assert_eq!(id.len(), "ent-42:".len() + 8);
    }
}
