// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The flow combinator.
//!
//! A flow is a named builder that turns an input stream into a pair of
//! success and failure streams. Calling a flow:
//!
//! 1. checks the active [`MockSchema`] for a replacement builder,
//! 2. runs the selected builder on the input,
//! 3. registers both outputs as triggers named `<name>Success` and
//!    `<name>Failure`,
//! 4. returns views of those triggers for direct chaining.
//!
//! The derived names come from a typed [`FlowName`], so a downstream flow
//! cannot subscribe to an output with the wrong payload type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::consts::{FAILURE_SUFFIX, SUCCESS_SUFFIX};
use crate::errors::FlowError;
use crate::mocks::MockSchema;
use crate::observability::debug::DebugSchema;
use crate::observability::messages::flow::{
    FlowEmitted, FlowOutputFailed, FlowWired, FlowWiringFailed,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{TriggerKey, TriggerRegistry};
use crate::stream::{EventStream, Payload};

/// Payloads that can leave a flow.
///
/// Outputs must be serializable so the debug schema can list them and
/// deserializable so scripted mocks can produce them.
pub trait FlowPayload: Payload + Debug + Serialize + DeserializeOwned {}

impl<T> FlowPayload for T where T: Payload + Debug + Serialize + DeserializeOwned {}

/// A builder as stored by the engine and by mock schemas.
pub type FlowBuilder<T, S, F> =
    Arc<dyn Fn(EventStream<T>) -> Result<FlowOutputs<S, F>, FlowError> + Send + Sync>;

/// Typed declaration of a flow: its name plus input, success and failure types.
///
/// ```rust
/// use the_flowline::engine::FlowName;
///
/// const PROTOCOL_CLOSE: FlowName<u32, u32, u32> = FlowName::new("protocolCloseFlow");
///
/// assert_eq!(PROTOCOL_CLOSE.success_key().name(), "protocolCloseFlowSuccess");
/// assert_eq!(PROTOCOL_CLOSE.failure_key().name(), "protocolCloseFlowFailure");
/// ```
pub struct FlowName<T, S, F> {
    name: &'static str,
    _types: PhantomData<fn(T) -> (S, F)>,
}

impl<T, S, F> FlowName<T, S, F> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn success_key(&self) -> TriggerKey<S> {
        TriggerKey::from_string(format!("{}{}", self.name, SUCCESS_SUFFIX))
    }

    pub fn failure_key(&self) -> TriggerKey<F> {
        TriggerKey::from_string(format!("{}{}", self.name, FAILURE_SUFFIX))
    }

    /// Type signature used to match mock builders against the declaration.
    pub fn signature(&self) -> &'static str {
        std::any::type_name::<fn(T) -> (S, F)>()
    }
}

impl<T, S, F> Clone for FlowName<T, S, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S, F> Copy for FlowName<T, S, F> {}

impl<T, S, F> Debug for FlowName<T, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowName")
            .field("name", &self.name)
            .field("signature", &self.signature())
            .finish()
    }
}

/// The two outputs of a flow.
pub struct FlowOutputs<S, F> {
    pub success: EventStream<S>,
    pub failure: EventStream<F>,
}

impl<S, F> FlowOutputs<S, F> {
    pub fn new(success: EventStream<S>, failure: EventStream<F>) -> Self {
        Self { success, failure }
    }
}

impl<S, F> Clone for FlowOutputs<S, F> {
    fn clone(&self) -> Self {
        Self {
            success: self.success.clone(),
            failure: self.failure.clone(),
        }
    }
}

impl<S, F> Debug for FlowOutputs<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowOutputs").finish_non_exhaustive()
    }
}

/// Wires flows into a registry, applying mock overrides and debug rules.
///
/// Without [`with_mocks`](Self::with_mocks) every flow runs its real builder.
#[derive(Clone, Debug)]
pub struct FlowEngine {
    registry: TriggerRegistry,
    mocks: Option<Arc<MockSchema>>,
    debug: Option<Arc<DebugSchema>>,
}

impl FlowEngine {
    pub fn new(registry: TriggerRegistry) -> Self {
        Self {
            registry,
            mocks: None,
            debug: None,
        }
    }

    /// Substitute the builders of every flow `schema` names.
    pub fn with_mocks(mut self, schema: MockSchema) -> Self {
        self.mocks = Some(Arc::new(schema));
        self
    }

    /// List flow outputs that have a rule in `schema`.
    pub fn with_debug(mut self, schema: DebugSchema) -> Self {
        self.debug = Some(Arc::new(schema));
        self
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    pub fn mock_schema(&self) -> Option<&MockSchema> {
        self.mocks.as_deref()
    }

    /// Declare a flow. Nothing is wired until [`Flow::call`].
    pub fn flow<T, S, F, B>(&self, name: FlowName<T, S, F>, builder: B) -> Flow<T, S, F>
    where
        T: Payload + Debug,
        S: FlowPayload,
        F: FlowPayload,
        B: Fn(EventStream<T>) -> Result<FlowOutputs<S, F>, FlowError> + Send + Sync + 'static,
    {
        Flow {
            engine: self.clone(),
            name,
            builder: Arc::new(builder),
        }
    }
}

/// A declared flow, ready to be called on an input stream.
pub struct Flow<T, S, F> {
    engine: FlowEngine,
    name: FlowName<T, S, F>,
    builder: FlowBuilder<T, S, F>,
}

impl<T, S, F> Clone for Flow<T, S, F> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            name: self.name,
            builder: Arc::clone(&self.builder),
        }
    }
}

impl<T, S, F> Flow<T, S, F>
where
    T: Payload + Debug,
    S: FlowPayload,
    F: FlowPayload,
{
    pub fn name(&self) -> &FlowName<T, S, F> {
        &self.name
    }

    /// Wire the flow on `input` and return views of its registered outputs.
    ///
    /// Fails without registering anything when either derived trigger name is
    /// already taken, when the active mock for this flow has the wrong
    /// signature, or when the builder itself fails.
    pub fn call(&self, input: EventStream<T>) -> Result<FlowOutputs<S, F>, FlowError> {
        let result = self.wire(input);
        if let Err(error) = &result {
            FlowWiringFailed {
                flow: self.name.name(),
                error,
            }
            .log();
        }
        result
    }

    fn wire(&self, input: EventStream<T>) -> Result<FlowOutputs<S, F>, FlowError> {
        let registry = &self.engine.registry;
        let success_key = self.name.success_key();
        let failure_key = self.name.failure_key();
        registry.ensure_available(&success_key)?;
        registry.ensure_available(&failure_key)?;

        let (builder, mock_schema) = self.select_builder()?;
        let outputs = (builder.as_ref())(input)?;

        let started = Instant::now();
        let success = registry.create_trigger(
            &success_key,
            instrument(outputs.success, success_key.name(), started),
        )?;
        let failure = registry.create_trigger(
            &failure_key,
            instrument(outputs.failure, failure_key.name(), started),
        )?;

        FlowWired {
            flow: self.name.name(),
            mock_schema,
        }
        .log();

        if let Some(debug) = &self.engine.debug {
            debug.watch(registry, &success_key)?;
            debug.watch(registry, &failure_key)?;
        }

        Ok(FlowOutputs { success, failure })
    }

    fn select_builder(&self) -> Result<(FlowBuilder<T, S, F>, Option<&str>), FlowError> {
        if let Some(schema) = &self.engine.mocks {
            if let Some(mock) = schema.builder_for(&self.name)? {
                return Ok((mock, Some(schema.name())));
            }
        }
        Ok((Arc::clone(&self.builder), None))
    }
}

/// Log every emission of a flow output with the time since the flow was wired.
fn instrument<V: Payload>(stream: EventStream<V>, trigger: &str, started: Instant) -> EventStream<V> {
    let trigger: Arc<str> = Arc::from(trigger);
    EventStream::from_fn(move || {
        let trigger = Arc::clone(&trigger);
        futures::StreamExt::inspect(stream.open(), move |item| match item {
            Ok(_) => FlowEmitted {
                trigger: &trigger,
                elapsed: started.elapsed(),
            }
            .log(),
            Err(error) => FlowOutputFailed {
                trigger: &trigger,
                error,
            }
            .log(),
        })
    })
}
