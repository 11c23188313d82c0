//! Property tests for parsing and pagination coercion.

use civitrack::model::Status;
use civitrack::query::{Page, PageInfo};
use proptest::prelude::*;

proptest! {
    #[test]
    fn status_parse_ignores_case_and_whitespace(
        base in prop::sample::select(vec!["open", "in_progress", "resolved"]),
        upper_mask in prop::collection::vec(any::<bool>(), 0..12),
        pad_left in " {0,3}",
        pad_right in " {0,3}",
    ) {
        let mangled: String = base
            .chars()
            .zip(upper_mask.iter().chain(std::iter::repeat(&false)))
            .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
            .collect();
        let input = format!("{pad_left}{mangled}{pad_right}");
        let parsed: Status = input.parse().unwrap();
        prop_assert_eq!(parsed.as_str(), base);
    }

    #[test]
    fn page_coercion_never_panics(limit in ".*", offset in ".*") {
        let page = Page::from_raw(Some(&limit), Some(&offset));
        // Either a parsed non-negative value or the defaults
        prop_assert!(page.limit == 50 || limit.trim().parse::<u32>() == Ok(page.limit));
        prop_assert!(page.offset == 0 || offset.trim().parse::<u32>() == Ok(page.offset));
    }

    #[test]
    fn has_more_matches_window_arithmetic(
        total in 0u64..10_000,
        limit in 0u32..200,
        offset in 0u32..20_000,
    ) {
        let info = PageInfo::new(total, Page { limit, offset });
        let expected = u64::from(offset) + u64::from(limit) < total;
        prop_assert_eq!(info.has_more, expected);
        prop_assert_eq!(info.total, total);
    }
}
