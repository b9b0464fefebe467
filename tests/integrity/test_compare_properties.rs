use std::collections::{BTreeMap, BTreeSet};

use hcvss::integrity::{compare, SecretSnapshot};
use proptest::prelude::*;

fn secrets() -> impl Strategy<Value = BTreeMap<String, String>> {
    // Small name and value alphabets so that generated snapshots overlap.
    prop::collection::btree_map("[a-e]{1,2}", "[xy]{0,3}", 0..12)
}

fn snapshot(values: &BTreeMap<String, String>) -> SecretSnapshot {
    SecretSnapshot::from_values(values.iter().map(|(k, v)| (k.clone(), v.clone()))).unwrap()
}

proptest! {
    #[test]
    fn compare_partitions_all_names(previous in secrets(), current in secrets()) {
        let diff = compare(&snapshot(&previous), &snapshot(&current));

        let all: BTreeSet<&String> = previous.keys().chain(current.keys()).collect();
        let unchanged: BTreeSet<&String> =
            all.iter().copied().filter(|name| previous.get(*name).is_some() && previous.get(*name) == current.get(*name)).collect();

        prop_assert_eq!(diff.total(), all.len());
        prop_assert_eq!(diff.unchanged, unchanged.len());

        prop_assert!(diff.added.is_disjoint(&diff.removed));
        prop_assert!(diff.added.is_disjoint(&diff.changed));
        prop_assert!(diff.removed.is_disjoint(&diff.changed));

        for name in &diff.added {
            prop_assert!(!previous.contains_key(name) && current.contains_key(name));
        }
        for name in &diff.removed {
            prop_assert!(previous.contains_key(name) && !current.contains_key(name));
        }
        for name in &diff.changed {
            prop_assert!(previous[name] != current[name]);
        }
    }

    #[test]
    fn compare_with_itself_has_no_drift(values in secrets()) {
        let snapshot = snapshot(&values);
        let diff = compare(&snapshot, &snapshot);

        prop_assert!(!diff.has_drift());
        prop_assert_eq!(diff.unchanged, values.len());
    }

    #[test]
    fn compare_is_symmetric_on_added_and_removed(previous in secrets(), current in secrets()) {
        let forward = compare(&snapshot(&previous), &snapshot(&current));
        let backward = compare(&snapshot(&current), &snapshot(&previous));

        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
        prop_assert_eq!(&forward.changed, &backward.changed);
        prop_assert_eq!(forward.unchanged, backward.unchanged);
    }

    #[test]
    fn fingerprint_tracks_content(values in secrets()) {
        prop_assert_eq!(snapshot(&values).fingerprint(), snapshot(&values).fingerprint());
    }
}
