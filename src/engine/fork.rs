// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Partition a stream into success and failure branches.
//!
//! Each value is classified exactly once: the success predicate is evaluated
//! first, the failure predicate only when success said no. A value matching
//! neither is a *classification gap*. It is kept off both outcome branches,
//! logged at debug level and delivered on the diagnostic `unmatched` branch,
//! which nobody is required to subscribe.
//!
//! A predicate fault terminates every branch with
//! [`StreamError::PredicateFault`].

use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{PredicateFault, StreamError};
use crate::observability::messages::fork::{ForkUnmatched, PredicateFaulted};
use crate::observability::messages::StructuredLog;
use crate::stream::{EventStream, Payload};

type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool, PredicateFault> + Send + Sync>;

/// Which branch a value was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Success,
    Failure,
    Unmatched,
}

/// The pair of classification functions for a [`fork`].
pub struct ForkPredicates<T> {
    success: Predicate<T>,
    failure: Predicate<T>,
}

impl<T> Clone for ForkPredicates<T> {
    fn clone(&self) -> Self {
        Self {
            success: Arc::clone(&self.success),
            failure: Arc::clone(&self.failure),
        }
    }
}

impl<T: 'static> ForkPredicates<T> {
    /// Predicates that cannot fault.
    pub fn new<S, F>(success: S, failure: F) -> Self
    where
        S: Fn(&T) -> bool + Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            success: Arc::new(move |value: &T| Ok(success(value))),
            failure: Arc::new(move |value: &T| Ok(failure(value))),
        }
    }

    /// Predicates that report a fault instead of an answer.
    pub fn fallible<S, F>(success: S, failure: F) -> Self
    where
        S: Fn(&T) -> Result<bool, PredicateFault> + Send + Sync + 'static,
        F: Fn(&T) -> Result<bool, PredicateFault> + Send + Sync + 'static,
    {
        Self {
            success: Arc::new(success),
            failure: Arc::new(failure),
        }
    }

    pub fn classify(&self, value: &T) -> Result<Branch, PredicateFault> {
        if (*self.success)(value)? {
            return Ok(Branch::Success);
        }
        if (*self.failure)(value)? {
            return Ok(Branch::Failure);
        }
        Ok(Branch::Unmatched)
    }
}

/// The branches produced by [`fork`].
pub struct Fork<T> {
    pub success: EventStream<T>,
    pub failure: EventStream<T>,
    /// Values that matched neither predicate.
    pub unmatched: EventStream<T>,
}

/// Split `input` by `predicates`.
///
/// `label` names the fork in logs and in predicate faults. The input is
/// subscribed once no matter how many branches are subscribed.
pub fn fork<T>(label: &str, input: &EventStream<T>, predicates: ForkPredicates<T>) -> Fork<T>
where
    T: Payload + Debug,
{
    let label: Arc<str> = Arc::from(label);
    let classified = input
        .try_map(move |value| match predicates.classify(&value) {
            Ok(branch) => {
                if branch == Branch::Unmatched {
                    ForkUnmatched {
                        fork: &label,
                        value: &value,
                    }
                    .log();
                }
                Ok((branch, value))
            }
            Err(fault) => {
                PredicateFaulted {
                    fork: &label,
                    message: &fault.0,
                }
                .log();
                Err(StreamError::PredicateFault {
                    fork: label.to_string(),
                    message: fault.0,
                })
            }
        })
        .share();

    let branch = |wanted: Branch| {
        classified.filter_map(move |(branch, value)| (branch == wanted).then_some(value))
    };

    Fork {
        success: branch(Branch::Success),
        failure: branch(Branch::Failure),
        unmatched: branch(Branch::Unmatched),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Exit {
        killed: bool,
    }

    async fn drain<T: Payload>(branches: &Fork<T>) -> (Vec<T>, Vec<T>, Vec<T>) {
        let success = branches.success.open();
        let failure = branches.failure.open();
        let unmatched = branches.unmatched.open();
        let collect = |items: crate::stream::Items<T>| {
            items.filter_map(|item| futures::future::ready(item.ok())).collect::<Vec<T>>()
        };
        futures::join!(collect(success), collect(failure), collect(unmatched))
    }

    #[tokio::test]
    async fn test_killed_process_lands_on_failure_only() {
        let input = EventStream::of(Exit { killed: true });
        let branches = fork(
            "protocolClose",
            &input,
            ForkPredicates::new(|exit: &Exit| !exit.killed, |exit: &Exit| exit.killed),
        );

        let (success, failure, unmatched) = drain(&branches).await;
        assert!(success.is_empty());
        assert_eq!(failure, vec![Exit { killed: true }]);
        assert!(unmatched.is_empty());
    }

    #[tokio::test]
    async fn test_every_value_lands_on_at_most_one_outcome() {
        struct TestCase {
            status: u16,
            expected: Branch,
        }

        let test_cases = vec![
            TestCase { status: 200, expected: Branch::Success },
            TestCase { status: 202, expected: Branch::Success },
            TestCase { status: 102, expected: Branch::Unmatched },
            TestCase { status: 404, expected: Branch::Failure },
            TestCase { status: 503, expected: Branch::Failure },
        ];

        let statuses: Vec<u16> = test_cases.iter().map(|case| case.status).collect();
        let branches = fork(
            "status",
            &EventStream::from_iter(statuses),
            ForkPredicates::new(
                |status: &u16| *status == 200 || *status == 202,
                |status: &u16| *status >= 400,
            ),
        );
        let (success, failure, unmatched) = drain(&branches).await;

        for case in test_cases {
            let seen = [
                (Branch::Success, success.contains(&case.status)),
                (Branch::Failure, failure.contains(&case.status)),
                (Branch::Unmatched, unmatched.contains(&case.status)),
            ];
            for (branch, present) in seen {
                assert_eq!(
                    present,
                    branch == case.expected,
                    "status {} on {:?}",
                    case.status,
                    branch
                );
            }
        }
    }

    #[tokio::test]
    async fn test_success_predicate_wins_when_both_match() {
        let failure_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&failure_calls);
        let branches = fork(
            "both",
            &EventStream::of(1u8),
            ForkPredicates::new(
                |_: &u8| true,
                move |_: &u8| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    true
                },
            ),
        );

        let (success, failure, _) = drain(&branches).await;
        assert_eq!(success, vec![1]);
        assert!(failure.is_empty());
        assert_eq!(failure_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_predicate_fault_terminates_both_branches() {
        let branches = fork(
            "hostSpinUp",
            &EventStream::from_iter(vec![1u32, 2, 3]),
            ForkPredicates::fallible(
                |value: &u32| {
                    if *value == 2 {
                        Err(PredicateFault::new("missing json body"))
                    } else {
                        Ok(true)
                    }
                },
                |_: &u32| Ok(false),
            ),
        );

        let success = branches.success.open();
        let failure = branches.failure.open();
        let (success, failure): (Vec<_>, Vec<_>) =
            futures::join!(success.collect(), failure.collect());

        let fault = StreamError::PredicateFault {
            fork: "hostSpinUp".to_string(),
            message: "missing json body".to_string(),
        };
        assert_eq!(success, vec![Ok(1), Err(fault.clone())]);
        assert_eq!(failure, vec![Err(fault)]);
    }

    #[tokio::test]
    async fn test_input_is_subscribed_once_for_all_branches() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let input = EventStream::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::stream::iter(vec![Ok(true), Ok(false)])
        });
        let branches = fork(
            "once",
            &input,
            ForkPredicates::new(|ok: &bool| *ok, |ok: &bool| !*ok),
        );

        let (success, failure, _) = drain(&branches).await;
        assert_eq!(success, vec![true]);
        assert_eq!(failure, vec![false]);
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }
}
