// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Typed trigger identifier.
///
/// The payload type travels with the name, so a subscriber and the source of
/// a trigger cannot disagree about what flows through it without the registry
/// noticing. Keys for flow outputs are derived by
/// [`FlowName`](crate::engine::FlowName) rather than written by hand.
///
/// ```rust
/// use the_flowline::registry::TriggerKey;
///
/// const POWER_SUSPEND: TriggerKey<()> = TriggerKey::new("powerSuspend");
/// assert_eq!(POWER_SUSPEND.name(), "powerSuspend");
/// ```
pub struct TriggerKey<T> {
    name: Cow<'static, str>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> TriggerKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _payload: PhantomData,
        }
    }

    pub fn from_string(name: String) -> Self {
        Self {
            name: Cow::Owned(name),
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T> Clone for TriggerKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> PartialEq for TriggerKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for TriggerKey<T> {}

impl<T> fmt::Debug for TriggerKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerKey")
            .field("name", &self.name)
            .field("payload", &self.payload_type())
            .finish()
    }
}

impl<T> fmt::Display for TriggerKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
