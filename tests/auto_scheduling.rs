// tests/auto_scheduling.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rundag::task::{task_fn, ArcTask, TaskInput};
use rundag::{auto, Concurrency, DepGraph, Scheduler, TaskSet};
use rundag_test_utils::init_tracing;
use rundag_test_utils::tasks::{
    fail_task, ok_task, recording_task, sleep_fail_task, sleep_ok_task,
};
use rundag_test_utils::with_timeout;

type StartLog = Arc<Mutex<Vec<String>>>;

/// Records its start, reads one dependency's first output and adds `add`.
fn add_to_dep(name: &str, log: StartLog, dep: &str, add: i64) -> ArcTask<i64> {
    let name = name.to_string();
    let dep = dep.to_string();
    task_fn(move |input: TaskInput<i64>| {
        log.lock().unwrap().push(name.clone());
        let dep = dep.clone();
        async move {
            let base = input
                .dep(&dep)
                .and_then(|values| values.first().copied())
                .unwrap_or_default();
            Ok(vec![base + add])
        }
    })
}

/// Records its start and sums every value of every dependency.
fn sum_deps(name: &str, log: StartLog) -> ArcTask<i64> {
    let name = name.to_string();
    task_fn(move |input: TaskInput<i64>| {
        log.lock().unwrap().push(name.clone());
        async move {
            let total: i64 = input.into_deps().into_values().flatten().sum();
            Ok(vec![total])
        }
    })
}

fn start_position(log: &StartLog, name: &str) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .position(|entry| entry == name)
        .unwrap_or_else(|| panic!("task '{name}' never started"))
}

#[tokio::test(flavor = "multi_thread")]
async fn diamond_runs_in_dependency_order_and_pipes_outputs() {
    init_tracing();

    let log: StartLog = Arc::new(Mutex::new(Vec::new()));

    let mut set = TaskSet::new();
    set.insert("a", &[], recording_task("a", log.clone(), vec![1i64]));
    set.insert("b", &["a"], add_to_dep("b", log.clone(), "a", 10));
    set.insert("c", &["a"], add_to_dep("c", log.clone(), "a", 100));
    set.insert("d", &["b", "c"], sum_deps("d", log.clone()));

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert!(errors.is_none());
    assert_eq!(results.len(), 4);
    assert_eq!(results.key("a"), &[1]);
    assert_eq!(results.key("b"), &[11]);
    assert_eq!(results.key("c"), &[101]);
    assert_eq!(results.key("d"), &[112]);

    // Dependency order: a starts first, d starts last.
    assert_eq!(start_position(&log, "a"), 0);
    assert_eq!(start_position(&log, "d"), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn dependent_observes_dependency_output_before_starting() {
    init_tracing();

    let log: StartLog = Arc::new(Mutex::new(Vec::new()));

    let mut set = TaskSet::new();
    set.insert("a", &[], sleep_ok_task(Duration::from_millis(30), vec![7i64]));
    set.insert("b", &["a"], add_to_dep("b", log.clone(), "a", 1));

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert!(errors.is_none());
    // b's input carried a's fully-published output.
    assert_eq!(results.key("b"), &[8]);
}

#[tokio::test(flavor = "multi_thread")]
async fn failure_skips_every_dependent_without_running_it() {
    init_tracing();

    let log: StartLog = Arc::new(Mutex::new(Vec::new()));

    let mut set = TaskSet::new();
    set.insert("a", &[], fail_task("boom"));
    set.insert("b", &["a"], recording_task("b", log.clone(), vec![1i64]));
    set.insert("c", &["b"], recording_task("c", log.clone(), vec![2]));

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    let errors = errors.expect("the seed failed");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.to_string(), "boom");

    assert!(results.is_empty());
    assert!(log.lock().unwrap().is_empty(), "no dependent may start");
}

#[tokio::test(flavor = "multi_thread")]
async fn errors_from_tasks_already_running_still_accumulate() {
    init_tracing();

    let mut set = TaskSet::new();
    set.insert(
        "fast",
        &[],
        sleep_fail_task::<i64>(Duration::from_millis(10), "first"),
    );
    set.insert(
        "slow",
        &[],
        sleep_fail_task(Duration::from_millis(120), "second"),
    );

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert!(results.is_empty());

    let errors = errors.expect("both tasks failed");
    assert_eq!(errors.len(), 2);
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["first", "second"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn success_after_pass_failure_is_discarded() {
    init_tracing();

    let mut set = TaskSet::new();
    set.insert(
        "doomed",
        &[],
        sleep_fail_task::<i64>(Duration::from_millis(10), "boom"),
    );
    set.insert(
        "straggler",
        &[],
        sleep_ok_task(Duration::from_millis(120), vec![5i64]),
    );

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    // The straggler was already running when the pass failed; it finished,
    // but its result is dropped.
    assert_eq!(results.get("straggler"), None);
    assert!(results.is_empty());
    assert_eq!(errors.expect("one failure").len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn results_before_the_failure_are_returned() {
    init_tracing();

    let log: StartLog = Arc::new(Mutex::new(Vec::new()));

    let mut set = TaskSet::new();
    set.insert("fetch", &[], ok_task(vec![1i64]));
    set.insert("parse", &["fetch"], fail_task("parse error"));
    set.insert("store", &["parse"], recording_task("store", log.clone(), vec![2]));

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert_eq!(results.len(), 1);
    assert_eq!(results.key("fetch"), &[1]);

    assert_eq!(errors.expect("parse failed").len(), 1);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn dependents_receive_exactly_their_declared_dependencies() {
    init_tracing();

    let join = task_fn(|input: TaskInput<i64>| async move {
        let deps = input.into_deps();
        let count = deps.len() as i64;
        let total: i64 = deps.into_values().flatten().sum();
        Ok(vec![count, total])
    });

    let mut set = TaskSet::new();
    set.insert("x", &[], ok_task(vec![1i64]));
    set.insert("y", &[], ok_task(vec![2i64]));
    set.insert("z", &["x", "y"], join);

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert!(errors.is_none());
    assert_eq!(results.key("z"), &[2, 3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn bounded_scheduler_still_completes_the_graph() {
    init_tracing();

    let log: StartLog = Arc::new(Mutex::new(Vec::new()));

    let mut set = TaskSet::new();
    set.insert("a", &[], recording_task("a", log.clone(), vec![1i64]));
    set.insert("b", &["a"], add_to_dep("b", log.clone(), "a", 10));
    set.insert("c", &["a"], add_to_dep("c", log.clone(), "a", 100));
    set.insert("d", &["b", "c"], sum_deps("d", log.clone()));

    let graph = DepGraph::build(set).expect("valid graph");
    let (results, errors) = with_timeout(
        Scheduler::new(graph)
            .with_concurrency(Concurrency::bounded(1))
            .run(),
    )
    .await;

    assert!(errors.is_none());
    assert_eq!(results.len(), 4);
    assert_eq!(results.key("d"), &[112]);
}

#[tokio::test(flavor = "multi_thread")]
async fn keyed_results_reads_are_idempotent() {
    init_tracing();

    let mut set = TaskSet::new();
    set.insert("only", &[], ok_task(vec![9i64]));

    let (results, errors) = with_timeout(auto(set)).await.expect("valid graph");

    assert!(errors.is_none());
    let first: Vec<i64> = results.key("only").to_vec();
    let second: Vec<i64> = results.key("only").to_vec();
    assert_eq!(first, second);
    assert_eq!(first, vec![9]);
}
