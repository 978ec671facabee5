use uuid::Uuid;

/// Produces globally unique identifiers for documents and operations.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Time-ordered UUIDv7 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_roughly_time_ordered() {
        let generator = UuidV7Generator;
        let ids: Vec<String> = (0..64).map(|_| generator.next_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        // v7 ids minted in sequence sort by their millisecond prefix.
        assert!(&ids[0][..8] <= &ids[ids.len() - 1][..8]);
    }
}
