// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared helpers for the integration tests

#![allow(dead_code)]

use externalized_properties::error::{ExternalizedPropertiesError, Result};
use externalized_properties::{InvocationContext, Resolver};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Map-backed resolver that records every lookup
pub struct RecordingResolver {
    name: String,
    properties: Mutex<IndexMap<String, String>>,
    lookups: AtomicUsize,
    failing: Option<String>,
}

impl RecordingResolver {
    pub fn new(name: &str, properties: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            properties: Mutex::new(
                properties
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            lookups: AtomicUsize::new(0),
            failing: None,
        })
    }

    /// Resolver that fails whenever `property` is requested
    pub fn failing_on(name: &str, properties: &[(&str, &str)], property: &str) -> Arc<Self> {
        let mut resolver = Self::new(name, properties);
        if let Some(inner) = Arc::get_mut(&mut resolver) {
            inner.failing = Some(property.to_string());
        }
        resolver
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Change a backing value, as a live configuration source would
    pub fn set(&self, property: &str, value: &str) {
        self.properties
            .lock()
            .insert(property.to_string(), value.to_string());
    }

    pub fn remove(&self, property: &str) {
        self.properties.lock().shift_remove(property);
    }
}

impl Resolver for RecordingResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, _ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.as_deref() == Some(property) {
            return Err(ExternalizedPropertiesError::resolution(
                self.name.clone(),
                property,
                "backing source unavailable",
            ));
        }
        Ok(self.properties.lock().get(property).cloned())
    }
}

pub fn as_resolver(resolver: &Arc<RecordingResolver>) -> Arc<dyn Resolver> {
    resolver.clone()
}
