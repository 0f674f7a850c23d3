//! Batched execution of a per-package operation.
//!
//! A batch attempts one operation per requested name and reports every
//! attempted name exactly once, as a success or as a failure. Names the
//! run never got to (stop on first failure) appear in neither map.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// How a batch run proceeds after a failure, and how wide it runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Keep attempting the remaining names after a failure.
    pub continue_on_error: bool,
    /// Number of operations in flight at once; `1` runs sequentially.
    pub parallelism: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            continue_on_error: false,
            parallelism: 1,
        }
    }
}

/// Outcome of a batch run, keyed by package name.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub succeeded: BTreeMap<String, T>,
    /// Failed names with the rendered error.
    pub failed: BTreeMap<String, String>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        BatchReport {
            succeeded: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }
}

impl<T> BatchReport<T> {
    /// Names attempted, successful or not.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names that were requested but never attempted.
    pub fn unattempted(&self, requested: usize) -> usize {
        requested.saturating_sub(self.total())
    }
}

/// Run `op` once per name and collect the outcomes.
///
/// Sequential runs stop at the first failure unless
/// `continue_on_error` is set. Parallel runs cannot interrupt work
/// already in flight, so a failure stops new names from starting while
/// started ones finish and are still reported.
pub fn run<T, E, F>(names: &[String], options: &BatchOptions, op: F) -> BatchReport<T>
where
    T: Send,
    E: Display,
    F: Fn(&str) -> Result<T, E> + Sync,
{
    if options.parallelism <= 1 || names.len() <= 1 {
        run_sequential(names, options, &op)
    } else {
        run_parallel(names, options, &op)
    }
}

fn run_sequential<T, E, F>(names: &[String], options: &BatchOptions, op: &F) -> BatchReport<T>
where
    E: Display,
    F: Fn(&str) -> Result<T, E>,
{
    let mut report = BatchReport::default();
    for name in names {
        match op(name) {
            Ok(value) => {
                report.succeeded.insert(name.clone(), value);
            }
            Err(e) => {
                report.failed.insert(name.clone(), e.to_string());
                if !options.continue_on_error {
                    break;
                }
            }
        }
    }
    report
}

fn run_parallel<T, E, F>(names: &[String], options: &BatchOptions, op: &F) -> BatchReport<T>
where
    T: Send,
    E: Display,
    F: Fn(&str) -> Result<T, E> + Sync,
{
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(options.parallelism)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("failed to build thread pool ({e}), running sequentially");
            return run_sequential(names, options, op);
        }
    };

    let report = Mutex::new(BatchReport::default());
    let abort = AtomicBool::new(false);

    pool.scope(|scope| {
        for name in names {
            let report = &report;
            let abort = &abort;
            scope.spawn(move |_| {
                if abort.load(Ordering::SeqCst) {
                    return;
                }
                match op(name) {
                    Ok(value) => {
                        report.lock().unwrap().succeeded.insert(name.clone(), value);
                    }
                    Err(e) => {
                        report.lock().unwrap().failed.insert(name.clone(), e.to_string());
                        if !options.continue_on_error {
                            abort.store(true, Ordering::SeqCst);
                        }
                    }
                }
            });
        }
    });

    report.into_inner().unwrap()
}
