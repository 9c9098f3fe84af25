//! Managed resources
//!
//! Each resource implements [`Resource`] over JSON documents. Planning is
//! shared: defaults are applied, computed values the configuration leaves
//! unset are carried over from the prior state, and attributes marked
//! `requires_replace` are compared.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::schema::Schema;

pub mod database;
pub mod token;

pub use database::DatabaseResource;
pub use token::TokenResource;

/// Outcome of planning a change to one resource instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    /// Proposed new state; `null` attributes are known only after apply
    pub planned_state: Value,
    /// Attributes whose change forces destroy-and-recreate
    pub requires_replace: Vec<String>,
    pub changed: bool,
}

impl PlanResult {
    pub fn destroy() -> Self {
        Self {
            planned_state: Value::Null,
            requires_replace: Vec::new(),
            changed: true,
        }
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `influxdb3_database`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Check a configuration document
    fn validate(&self, config: &Value) -> Diagnostics {
        self.schema().validate(config)
    }

    /// Compute the planned state for a proposed configuration
    fn plan(&self, prior: Option<&Value>, proposed: &Value) -> PlanResult {
        plan_with_schema(&self.schema(), prior, proposed)
    }

    async fn create(&self, planned: &Value) -> Result<Value>;

    async fn read(&self, state: &Value) -> Result<Value>;

    async fn update(&self, planned: &Value, prior: &Value) -> Result<Value>;

    async fn delete(&self, state: &Value) -> Result<()>;

    /// Build state for an existing remote object from its import id
    async fn import_state(&self, id: &str) -> Result<Value>;
}

/// Schema-driven planning shared by all resources
pub fn plan_with_schema(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    if proposed.is_null() {
        return PlanResult::destroy();
    }

    let mut planned = proposed.clone();
    schema.complete(&mut planned);
    schema.apply_defaults(&mut planned);

    let prior = prior.filter(|p| !p.is_null());
    let mut requires_replace = Vec::new();

    if let (Some(prior), Some(obj)) = (prior, planned.as_object_mut()) {
        for (name, attr) in &schema.attributes {
            if !attr.computed {
                continue;
            }
            let slot = obj.entry(name.clone()).or_insert(Value::Null);
            if slot.is_null()
                && let Some(previous) = prior.get(name.as_str()).filter(|v| !v.is_null())
            {
                *slot = previous.clone();
            }
        }

        requires_replace = schema.requires_replace(prior, &planned);

        // A replacement gets fresh computed values, apart from what the
        // configuration or a default pins down
        if !requires_replace.is_empty()
            && let Some(obj) = planned.as_object_mut()
        {
            for (name, attr) in &schema.attributes {
                let configured = proposed.get(name.as_str()).is_some_and(|v| !v.is_null());
                if attr.computed && !configured && attr.default.is_none() {
                    obj.insert(name.clone(), Value::Null);
                }
            }
        }
    }

    let changed = prior != Some(&planned);
    PlanResult {
        planned_state: planned,
        requires_replace,
        changed,
    }
}
