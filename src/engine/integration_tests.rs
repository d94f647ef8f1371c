// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::engine::{fork, FlowEngine, FlowName, FlowOutputs, ForkPredicates};
use crate::errors::{FlowError, MockError, PredicateFault, StreamError};
use crate::registry::{TriggerKey, TriggerRegistry};
use crate::stream::EventStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Created {
    ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Hosted {
    secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Failed {
    status: u16,
}

const START: TriggerKey<u32> = TriggerKey::new("start");
const CREATE: FlowName<u32, Created, Failed> = FlowName::new("create");
const HOST: FlowName<u32, Hosted, Failed> = FlowName::new("host");

/// A real builder that records whether it was ever invoked
fn counting_builder<S, F>(
    calls: Arc<AtomicUsize>,
) -> impl Fn(EventStream<u32>) -> Result<FlowOutputs<S, F>, FlowError> + Send + Sync + 'static
where
    S: crate::engine::FlowPayload,
    F: crate::engine::FlowPayload,
{
    move |_input| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(FlowOutputs::new(EventStream::never(), EventStream::never()))
    }
}

/// Integration tests for flow wiring with mocks, chaining and debug listings
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DebugMode, DebugRule};
    use crate::engine::zip2;
    use crate::mocks::{MockSchema, ScriptedMock};
    use crate::observability::DebugSchema;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    fn timed_schema() -> MockSchema {
        MockSchema::new("timing")
            .with_scripted(
                "create",
                ScriptedMock::success(Duration::from_millis(100), json!({ "ip": "10.0.0.5" })),
            )
            .with_scripted(
                "host",
                ScriptedMock::success(Duration::from_millis(50), json!({ "secret": "s3cr3t" })),
            )
    }

    #[tokio::test(start_paused = true)]
    async fn test_zipped_children_wait_for_the_slower_flow() {
        let registry = TriggerRegistry::new();
        let engine = FlowEngine::new(registry.clone()).with_mocks(timed_schema());
        let calls = Arc::new(AtomicUsize::new(0));

        let start = registry.create_emitter(&START).unwrap();
        let create = engine
            .flow(CREATE, counting_builder(calls.clone()))
            .call(registry.from_trigger(&START).unwrap())
            .unwrap();
        let host = engine
            .flow(HOST, counting_builder(calls.clone()))
            .call(registry.from_trigger(&START).unwrap())
            .unwrap();

        let combined = zip2(&create.success, &host.success).map({
            let started = Instant::now();
            move |pair| (pair, started.elapsed())
        });
        let mut combined = combined.open();
        start.emit(1);

        let ((created, hosted), at) = combined.next().await.unwrap().unwrap();
        assert!(at >= Duration::from_millis(100), "emitted at {:?}", at);
        assert_eq!(created.ip, "10.0.0.5");
        assert_eq!(hosted.secret, "s3cr3t");

        let again = tokio::time::timeout(Duration::from_secs(1), combined.next()).await;
        assert!(again.is_err(), "one pair must produce exactly one emission");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unmocked_flows_run_their_real_builder() {
        let registry = TriggerRegistry::new();
        let engine = FlowEngine::new(registry.clone())
            .with_mocks(MockSchema::new("partial").with_scripted(
                "create",
                ScriptedMock::failure(Duration::ZERO, json!({ "status": 503 })),
            ));
        let calls = Arc::new(AtomicUsize::new(0));

        engine
            .flow(CREATE, counting_builder(calls.clone()))
            .call(EventStream::never())
            .unwrap();
        engine
            .flow(HOST, counting_builder(calls.clone()))
            .call(EventStream::never())
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_resolved("hostSuccess"));
    }

    #[tokio::test]
    async fn test_typed_mock_with_wrong_signature_fails_the_call() {
        let wrong: FlowName<u32, Failed, Failed> = FlowName::new("create");
        let schema = MockSchema::new("typed").with_builder(&wrong, |input: EventStream<u32>| {
            Ok(FlowOutputs::new(
                input.map(|status| Failed { status: status as u16 }),
                EventStream::empty(),
            ))
        });
        let registry = TriggerRegistry::new();
        let engine = FlowEngine::new(registry.clone()).with_mocks(schema);

        let err = engine
            .flow(CREATE, counting_builder(Arc::new(AtomicUsize::new(0))))
            .call(EventStream::never())
            .unwrap_err();

        assert!(matches!(
            err,
            FlowError::Mock(MockError::SignatureMismatch { ref flow, .. }) if flow == "create"
        ));
        assert!(!registry.is_resolved("createSuccess"));
    }

    #[tokio::test]
    async fn test_flow_can_consume_an_output_declared_later() {
        let registry = TriggerRegistry::new();
        let engine = FlowEngine::new(registry.clone());
        let downstream: FlowName<Created, String, String> = FlowName::new("announce");

        engine
            .flow(downstream, |input: EventStream<Created>| {
                let split = fork(
                    "announce",
                    &input,
                    ForkPredicates::new(|c: &Created| !c.ip.is_empty(), |c: &Created| c.ip.is_empty()),
                );
                Ok(FlowOutputs::new(
                    split.success.map(|c| format!("ready at {}", c.ip)),
                    split.failure.map(|_| "no address".to_string()),
                ))
            })
            .call(registry.from_trigger(&CREATE.success_key()).unwrap())
            .unwrap();
        assert_eq!(registry.pending(), vec!["createSuccess".to_string()]);

        let mut announced = registry
            .from_trigger(&downstream.success_key())
            .unwrap()
            .open();
        engine
            .flow(CREATE, |input: EventStream<u32>| {
                Ok(FlowOutputs::new(
                    input.map(|n| Created {
                        ip: format!("10.0.0.{}", n),
                    }),
                    EventStream::never(),
                ))
            })
            .call(EventStream::of(7))
            .unwrap();

        assert_eq!(
            announced.next().await,
            Some(Ok("ready at 10.0.0.7".to_string()))
        );
        assert!(registry.pending().is_empty());
    }

    #[tokio::test]
    async fn test_debug_schema_watches_flow_outputs_with_rules() {
        let registry = TriggerRegistry::new();
        let debug = DebugSchema::new().with_rule(
            "createSuccess",
            DebugRule {
                message: "Created".to_string(),
                mode: DebugMode::Pick,
                fields: vec!["ip".to_string()],
            },
        );
        let engine = FlowEngine::new(registry.clone()).with_debug(debug);

        engine
            .flow(CREATE, |_input: EventStream<u32>| {
                Ok(FlowOutputs::new(EventStream::never(), EventStream::never()))
            })
            .call(EventStream::never())
            .unwrap();

        let infos = registry.describe();
        let subscribers = |name: &str| {
            infos
                .iter()
                .find(|info| info.name == name)
                .map(|info| info.subscribers)
        };
        assert_eq!(subscribers("createSuccess"), Some(1));
        assert_eq!(subscribers("createFailure"), Some(0));
    }

    #[tokio::test]
    async fn test_predicate_fault_faults_both_outputs() {
        let registry = TriggerRegistry::new();
        let engine = FlowEngine::new(registry.clone());
        let start = registry.create_emitter(&START).unwrap();

        let outputs = engine
            .flow(CREATE, |input: EventStream<u32>| {
                let split = fork(
                    "create",
                    &input,
                    ForkPredicates::fallible(
                        |n: &u32| {
                            if *n == 13 {
                                Err(PredicateFault::new("unlucky request"))
                            } else {
                                Ok(*n % 2 == 0)
                            }
                        },
                        |n: &u32| Ok(*n % 2 == 1),
                    ),
                );
                Ok(FlowOutputs::new(
                    split.success.map(|n| Created {
                        ip: format!("10.0.0.{}", n),
                    }),
                    split.failure.map(|n| Failed { status: n as u16 }),
                ))
            })
            .call(registry.from_trigger(&START).unwrap())
            .unwrap();

        let mut success = outputs.success.open();
        let mut failure = outputs.failure.open();
        start.emit(2);
        start.emit(13);

        let fault = StreamError::PredicateFault {
            fork: "create".to_string(),
            message: "unlucky request".to_string(),
        };
        assert_eq!(
            success.next().await,
            Some(Ok(Created {
                ip: "10.0.0.2".to_string()
            }))
        );
        assert_eq!(success.next().await, Some(Err(fault.clone())));
        assert_eq!(failure.next().await, Some(Err(fault.clone())));

        let faulted: Vec<String> = registry
            .describe()
            .into_iter()
            .filter(|info| info.faulted)
            .map(|info| info.name)
            .collect();
        assert_eq!(faulted, vec!["createFailure".to_string(), "createSuccess".to_string()]);

        let late: Vec<_> = registry
            .from_trigger(&CREATE.success_key())
            .unwrap()
            .open()
            .collect()
            .await;
        assert_eq!(late, vec![Err(fault)]);
    }
}
