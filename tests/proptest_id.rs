//! Property tests for entity id generation.

use chrono::{TimeZone, Utc};
use civitrack::util::id::{compute_id_hash, generate_id, is_valid_id, ISSUE_PREFIX};
use proptest::prelude::*;

proptest! {
    #[test]
    fn hash_is_deterministic_and_sized(input in ".*", len in 1usize..24) {
        let a = compute_id_hash(&input, len);
        let b = compute_id_hash(&input, len);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), len);
        prop_assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn generated_ids_are_well_formed(
        title in "[a-zA-Z0-9 ]{1,60}",
        email in "[a-z]{1,10}@[a-z]{1,10}\\.com",
        secs in 0i64..4_000_000_000,
    ) {
        let ts = Utc.timestamp_opt(secs, 0).unwrap();
        let id = generate_id(ISSUE_PREFIX, &[&title, &email], ts, |_| false);
        prop_assert!(id.starts_with("cv-"));
        prop_assert!(is_valid_id(&id, ISSUE_PREFIX));
    }

    #[test]
    fn collision_is_always_escaped(
        seed in "[a-z]{1,20}",
        secs in 0i64..4_000_000_000,
    ) {
        let ts = Utc.timestamp_opt(secs, 0).unwrap();
        let first = generate_id(ISSUE_PREFIX, &[&seed], ts, |_| false);
        let second = generate_id(ISSUE_PREFIX, &[&seed], ts, |id| id == first);
        prop_assert_ne!(first, second);
    }
}
