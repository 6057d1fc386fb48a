use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mapkit_core::{Fault, Invocation, MapFailure};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::executor::context::MapContext;
use crate::executor::events::{Event, InvocationResult};
use crate::executor::runtime::Runtime;

/// One use case's integration logic.
///
/// The body writes into the context's outcome. Returning `Err(MapFailure::Error(e))`
/// fails the invocation with `e` right away; `Err(MapFailure::Fault(_))` aborts it.
#[async_trait]
pub trait Map: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut MapContext) -> Result<(), MapFailure>;
}

/// Final answer of a top-level invocation. Exactly one of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Report {
    Success(JsonValue),
    Failure(JsonValue),
}

impl Report {
    pub fn is_success(&self) -> bool {
        matches!(self, Report::Success(_))
    }

    pub fn value(&self) -> &JsonValue {
        match self {
            Report::Success(v) | Report::Failure(v) => v,
        }
    }
}

/// Entry dispatcher: use-case name to map.
#[derive(Clone)]
pub struct Provider {
    name: String,
    maps: BTreeMap<String, Arc<dyn Map>>,
}

impl Provider {
    pub fn builder(name: &str) -> ProviderBuilder {
        ProviderBuilder {
            name: name.to_string(),
            maps: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn use_cases(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn get(&self, use_case: &str) -> Option<&Arc<dyn Map>> {
        self.maps.get(use_case)
    }

    /// Run a use case top-level. Business errors come back as [`Report::Failure`];
    /// faults are returned as `Err`.
    pub async fn run(
        &self,
        runtime: &Runtime,
        use_case: &str,
        invocation: Invocation,
    ) -> Result<Report, Fault> {
        let map = self.maps.get(use_case).ok_or_else(|| Fault::UnknownUseCase {
            use_case: use_case.to_string(),
        })?;

        let mut ctx = MapContext::new(runtime.clone(), use_case, invocation);
        let invocation_id = ctx.invocation_id();
        tracing::info!(provider = %self.name, use_case, %invocation_id, "invocation started");
        runtime
            .emit(Event::InvocationStarted {
                invocation_id,
                map: use_case.to_string(),
                helper: false,
            })
            .await;

        let ran = map.run(&mut ctx).await;
        ctx.report_replacements().await;
        let outcome = match ran {
            Ok(()) => ctx.into_frame().finish(),
            Err(e) => Err(e),
        };
        let report = match outcome {
            Ok(data) => Ok(Report::Success(data)),
            Err(MapFailure::Error(error)) => Ok(Report::Failure(error)),
            Err(MapFailure::Fault(fault)) => Err(fault),
        };

        let result = match &report {
            Ok(Report::Success(_)) => InvocationResult::Success,
            Ok(Report::Failure(_)) => InvocationResult::Failure,
            Err(fault) => {
                tracing::warn!(provider = %self.name, use_case, %invocation_id, error = %fault, "invocation faulted");
                InvocationResult::Fault
            }
        };
        tracing::info!(
            provider = %self.name,
            use_case,
            %invocation_id,
            result = result.as_str(),
            "invocation finished"
        );
        runtime
            .emit(Event::InvocationFinished {
                invocation_id,
                map: use_case.to_string(),
                result,
            })
            .await;
        report
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("use_cases", &self.maps.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct ProviderBuilder {
    name: String,
    maps: BTreeMap<String, Arc<dyn Map>>,
}

impl ProviderBuilder {
    /// Register `map` under `use_case`. A later registration replaces an earlier one.
    pub fn map(mut self, use_case: &str, map: Arc<dyn Map>) -> Self {
        self.maps.insert(use_case.to_string(), map);
        self
    }

    pub fn build(self) -> Provider {
        Provider {
            name: self.name,
            maps: self.maps,
        }
    }
}
