/// Smallest batch a multi-row request ever runs.
pub const MIN_QUERIES: usize = 1;

/// Largest batch a multi-row request ever runs.
pub const MAX_QUERIES: usize = 500;

/// Clamp a caller-supplied batch size into `[MIN_QUERIES, MAX_QUERIES]`.
///
/// Absent, zero and negative values collapse to a single query rather than
/// to no work at all.
pub fn sanitize_queries(requested: Option<i64>) -> usize {
    match requested {
        Some(value) if value >= MAX_QUERIES as i64 => MAX_QUERIES,
        Some(value) if value >= MIN_QUERIES as i64 => value as usize,
        _ => MIN_QUERIES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_and_non_positive_run_one_query() {
        assert_eq!(sanitize_queries(None), 1);
        assert_eq!(sanitize_queries(Some(0)), 1);
        assert_eq!(sanitize_queries(Some(-5)), 1);
        assert_eq!(sanitize_queries(Some(i64::MIN)), 1);
    }

    #[test]
    fn large_values_cap_at_five_hundred() {
        assert_eq!(sanitize_queries(Some(500)), 500);
        assert_eq!(sanitize_queries(Some(501)), 500);
        assert_eq!(sanitize_queries(Some(10_000)), 500);
        assert_eq!(sanitize_queries(Some(i64::MAX)), 500);
    }

    proptest! {
        #[test]
        fn always_within_bounds(value in any::<i64>()) {
            let n = sanitize_queries(Some(value));
            prop_assert!((MIN_QUERIES..=MAX_QUERIES).contains(&n));
        }

        #[test]
        fn identity_inside_bounds(value in 1i64..=500) {
            prop_assert_eq!(sanitize_queries(Some(value)), value as usize);
        }
    }
}
