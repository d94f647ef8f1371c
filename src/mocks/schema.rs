// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use super::ScriptedMock;
use crate::engine::{FlowBuilder, FlowName, FlowOutputs, FlowPayload};
use crate::errors::{FlowError, MockError};
use crate::stream::{EventStream, Payload};

enum MockEntry {
    /// A builder registered in code, stored as `FlowBuilder<T, S, F>`.
    Typed {
        signature: &'static str,
        builder: Arc<dyn Any + Send + Sync>,
    },
    Scripted(ScriptedMock),
}

/// Replacement builders for the flows of one mock run, keyed by flow name.
///
/// A replacement only swaps the stream backing a flow's outputs. The engine
/// still registers them as `<name>Success` and `<name>Failure`.
///
/// ```rust
/// use std::time::Duration;
/// use serde_json::json;
/// use the_flowline::mocks::{MockSchema, ScriptedMock};
///
/// let schema = MockSchema::new("happy_path").with_scripted(
///     "mandelboxCreateFlow",
///     ScriptedMock::success(Duration::from_millis(2000), json!({ "ip": "10.0.0.5" })),
/// );
/// assert!(schema.contains("mandelboxCreateFlow"));
/// ```
pub struct MockSchema {
    name: String,
    entries: BTreeMap<String, MockEntry>,
}

impl Debug for MockSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSchema")
            .field("name", &self.name)
            .field("flows", &self.flows())
            .finish()
    }
}

impl MockSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace `flow` with a builder written in code.
    pub fn with_builder<T, S, F, B>(mut self, flow: &FlowName<T, S, F>, builder: B) -> Self
    where
        T: Payload,
        S: FlowPayload,
        F: FlowPayload,
        B: Fn(EventStream<T>) -> Result<FlowOutputs<S, F>, FlowError> + Send + Sync + 'static,
    {
        let builder: FlowBuilder<T, S, F> = Arc::new(builder);
        self.entries.insert(
            flow.name().to_string(),
            MockEntry::Typed {
                signature: flow.signature(),
                builder: Arc::new(builder),
            },
        );
        self
    }

    /// Replace `flow` with a scripted delay-and-answer stand-in.
    pub fn with_scripted(mut self, flow: impl Into<String>, mock: ScriptedMock) -> Self {
        self.entries.insert(flow.into(), MockEntry::Scripted(mock));
        self
    }

    pub fn contains(&self, flow: &str) -> bool {
        self.entries.contains_key(flow)
    }

    pub fn flows(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The replacement for `flow`, if this schema has one.
    ///
    /// A typed entry registered for other payload types than `flow` declares
    /// is a [`MockError::SignatureMismatch`].
    pub fn builder_for<T, S, F>(
        &self,
        flow: &FlowName<T, S, F>,
    ) -> Result<Option<FlowBuilder<T, S, F>>, MockError>
    where
        T: Payload,
        S: FlowPayload,
        F: FlowPayload,
    {
        let Some(entry) = self.entries.get(flow.name()) else {
            return Ok(None);
        };

        match entry {
            MockEntry::Typed { signature, builder } => builder
                .downcast_ref::<FlowBuilder<T, S, F>>()
                .cloned()
                .map(Some)
                .ok_or_else(|| MockError::SignatureMismatch {
                    flow: flow.name().to_string(),
                    expected: flow.signature().to_string(),
                    found: signature.to_string(),
                }),
            MockEntry::Scripted(mock) => {
                let mock = mock.clone();
                let name = flow.name();
                let builder: FlowBuilder<T, S, F> = Arc::new(
                    move |input: EventStream<T>| -> Result<FlowOutputs<S, F>, FlowError> {
                        Ok(mock.outputs(name, input))
                    },
                );
                Ok(Some(builder))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;

    const ECHO: FlowName<u32, u32, String> = FlowName::new("echoFlow");
    const ECHO_AS_TEXT: FlowName<String, u32, String> = FlowName::new("echoFlow");

    #[test]
    fn test_unknown_flow_has_no_replacement() {
        let schema = MockSchema::new("empty");
        assert!(schema.builder_for(&ECHO).unwrap().is_none());
        assert!(schema.is_empty());
    }

    #[tokio::test]
    async fn test_typed_builder_is_returned_for_matching_signature() {
        let schema = MockSchema::new("typed").with_builder(&ECHO, |input: EventStream<u32>| {
            Ok(FlowOutputs::new(input.map(|n| n + 1), EventStream::empty()))
        });

        let builder = schema.builder_for(&ECHO).unwrap().unwrap();
        let outputs = builder(EventStream::of(41)).unwrap();
        let values: Vec<_> = outputs.success.open().collect().await;
        assert_eq!(values, vec![Ok(42)]);
    }

    #[test]
    fn test_typed_builder_with_other_signature_is_rejected() {
        let schema = MockSchema::new("typed").with_builder(&ECHO, |input: EventStream<u32>| {
            Ok(FlowOutputs::new(input, EventStream::empty()))
        });

        let Err(err) = schema.builder_for(&ECHO_AS_TEXT) else {
            panic!("a builder with another signature must be rejected");
        };
        match err {
            MockError::SignatureMismatch { flow, expected, found } => {
                assert_eq!(flow, "echoFlow");
                assert_eq!(expected, ECHO_AS_TEXT.signature());
                assert_eq!(found, ECHO.signature());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_scripted_entry_builds_for_any_signature() {
        let schema = MockSchema::new("scripted").with_scripted(
            "echoFlow",
            ScriptedMock::failure(Duration::ZERO, json!("offline")),
        );

        let builder = schema.builder_for(&ECHO).unwrap().unwrap();
        let outputs = builder(EventStream::of(1)).unwrap();
        let failure = outputs.failure.open();
        let success = outputs.success.open();
        let (failure, success): (Vec<_>, Vec<_>) =
            futures::join!(failure.collect(), success.collect());

        assert_eq!(failure, vec![Ok("offline".to_string())]);
        assert!(success.is_empty());
    }
}
