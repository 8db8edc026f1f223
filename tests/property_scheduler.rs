// tests/property_scheduler.rs

//! Randomized scheduling checks: passes over arbitrary DAGs terminate, and
//! the result store is complete exactly when no task failed.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;

use rundag::{auto, TaskSet};
use rundag_test_utils::tasks::{fail_task, ok_task};

/// Raw dependency material for up to `max_tasks` tasks. Acyclicity is
/// enforced during sanitization: task N may only depend on tasks 0..N-1.
fn raw_dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
    })
}

fn build_set(raw_deps: &[Vec<usize>], failing: &HashSet<usize>) -> TaskSet<u64> {
    let mut set = TaskSet::new();

    for (i, potential_deps) in raw_deps.iter().enumerate() {
        let name = format!("task_{i}");

        // Sanitize dependencies: only allow deps < i, deduplicated.
        let mut valid_deps = HashSet::new();
        for dep_idx in potential_deps {
            if i > 0 {
                valid_deps.insert(dep_idx % i);
            }
        }
        let deps: Vec<String> = valid_deps.iter().map(|d| format!("task_{d}")).collect();
        let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();

        if failing.contains(&i) {
            set.insert(name, &dep_refs, fail_task(&format!("task_{i} failed")));
        } else {
            set.insert(name, &dep_refs, ok_task(vec![i as u64]));
        }
    }

    set
}

async fn run_pass(set: TaskSet<u64>) -> (usize, bool) {
    let (results, errors) = tokio::time::timeout(Duration::from_secs(5), async {
        auto(set).await.expect("generated graph is valid")
    })
    .await
    .expect("pass must terminate");

    (results.len(), errors.is_none())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn all_success_pass_is_complete(raw_deps in raw_dag_strategy(8)) {
        let total = raw_deps.len();
        let set = build_set(&raw_deps, &HashSet::new());

        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let (completed, clean) = rt.block_on(run_pass(set));

        prop_assert!(clean, "no task failed, yet errors were reported");
        prop_assert_eq!(completed, total);
    }

    #[test]
    fn pass_with_failures_terminates_and_is_incomplete(
        raw_deps in raw_dag_strategy(8),
        failing_raw in proptest::collection::vec(any::<usize>(), 0..4),
    ) {
        let total = raw_deps.len();
        let failing: HashSet<usize> = failing_raw.iter().map(|f| f % total).collect();
        let set = build_set(&raw_deps, &failing);

        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let (completed, clean) = rt.block_on(run_pass(set));

        // The store is complete exactly when nothing failed.
        prop_assert_eq!(clean, failing.is_empty());
        prop_assert_eq!(completed == total, failing.is_empty());
    }
}
