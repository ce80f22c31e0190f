use std::collections::BTreeSet;

use csv_sqlgen::interval_set::IntervalSet;
use num_bigint::BigInt;
use proptest::prelude::*;

fn assert_canonical(set: &IntervalSet) {
    let ranges: Vec<(BigInt, BigInt)> = set
        .iter()
        .map(|(lo, hi)| (lo.clone(), hi.clone()))
        .collect();
    for (lo, hi) in &ranges {
        assert!(lo <= hi, "inverted range [{lo},{hi}]");
    }
    for pair in ranges.windows(2) {
        let (_, previous_hi) = &pair[0];
        let (next_lo, _) = &pair[1];
        assert!(
            previous_hi + 1u32 < *next_lo,
            "ranges touch or overlap in {set}"
        );
    }
}

proptest! {
    #[test]
    fn ranges_stay_disjoint_and_non_adjacent(values in prop::collection::vec(-60i64..60, 0..120)) {
        let mut set = IntervalSet::new();
        let mut seen = BTreeSet::new();
        for value in values {
            let added = set.add(&BigInt::from(value));
            prop_assert_eq!(added, seen.insert(value));
            assert_canonical(&set);
        }
        prop_assert_eq!(set.cardinality(), BigInt::from(seen.len()));
        for value in -60i64..60 {
            prop_assert_eq!(set.contains(&BigInt::from(value)), seen.contains(&value));
        }
    }

    #[test]
    fn second_add_reports_duplicate(value in any::<i64>()) {
        let mut set = IntervalSet::new();
        let value = BigInt::from(value);
        prop_assert!(set.add(&value));
        prop_assert!(!set.add(&value));
    }

    #[test]
    fn neighbours_collapse_in_any_order(base in -1_000_000i64..1_000_000, order in 0usize..6) {
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let candidates = [base, base + 1, base - 1];
        let mut set = IntervalSet::new();
        for index in orders[order] {
            prop_assert!(set.add(&BigInt::from(candidates[index])));
        }
        prop_assert_eq!(set.len(), 1);
        prop_assert_eq!(set.to_string(), format!("[[{},{}]]", base - 1, base + 1));
    }
}

#[test]
fn values_beyond_64_bits_are_tracked() {
    let mut set = IntervalSet::new();
    let big: BigInt = "123456789012345678901234567890".parse().expect("bigint literal");
    assert!(set.add(&big));
    assert!(set.add(&(&big + 1u32)));
    assert!(!set.add(&big));
    assert_eq!(set.len(), 1);
}
