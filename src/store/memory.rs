//! In-memory parameter store
//!
//! A multi-region store held in process, with per-region failure injection
//! and a call log. Used to exercise the coordinator without AWS.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ClientFactory, ParameterStore, PutMode, PutRequest, StoreError};

/// Store operation, as recorded in the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Client construction
    Connect,
    Get,
    Put,
    Delete,
}

/// A recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub region: String,
    pub op: StoreOp,
    /// Parameter path (role ARN or empty for `Connect`)
    pub target: String,
}

/// A stored parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub value: String,
    pub param_type: String,
    pub description: Option<String>,
    pub kms_key: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    regions: HashMap<String, BTreeMap<String, StoredParameter>>,
    failures: HashMap<(String, StoreOp), StoreError>,
    calls: Vec<StoreCall>,
}

/// Factory handing out clients that share one in-memory state.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactory {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the state from others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a `String` parameter
    pub fn with_parameter(self, region: &str, path: &str, value: &str) -> Self {
        self.lock().regions.entry(region.to_string()).or_default().insert(
            path.to_string(),
            StoredParameter {
                value: value.to_string(),
                param_type: super::PARAMETER_TYPE_STRING.to_string(),
                description: None,
                kms_key: None,
            },
        );
        self
    }

    /// Make every `op` in `region` fail with `error`.
    ///
    /// For [`StoreOp::Connect`] the error is returned from client construction.
    pub fn fail(&self, region: &str, op: StoreOp, error: StoreError) {
        self.lock().failures.insert((region.to_string(), op), error);
    }

    /// Clear an injected failure
    pub fn clear_failure(&self, region: &str, op: StoreOp) {
        self.lock().failures.remove(&(region.to_string(), op));
    }

    pub fn parameter(&self, region: &str, path: &str) -> Option<StoredParameter> {
        self.lock()
            .regions
            .get(region)
            .and_then(|params| params.get(path))
            .cloned()
    }

    pub fn value(&self, region: &str, path: &str) -> Option<String> {
        self.parameter(region, path).map(|p| p.value)
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Calls other than client construction
    pub fn api_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.op != StoreOp::Connect)
            .collect()
    }
}

impl ClientFactory for MemoryFactory {
    fn new_client(
        &self,
        region: &str,
        role: Option<&str>,
    ) -> Result<Box<dyn ParameterStore>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall {
            region: region.to_string(),
            op: StoreOp::Connect,
            target: role.unwrap_or_default().to_string(),
        });
        if let Some(err) = state.failures.get(&(region.to_string(), StoreOp::Connect)) {
            return Err(err.clone());
        }
        drop(state);

        Ok(Box::new(MemoryStore {
            region: region.to_string(),
            factory: self.clone(),
        }))
    }
}

/// Client bound to one region of a [`MemoryFactory`]
struct MemoryStore {
    region: String,
    factory: MemoryFactory,
}

impl MemoryStore {
    /// Record the call and return the injected failure, if any.
    fn begin(&self, state: &mut MemoryState, op: StoreOp, path: &str) -> Result<(), StoreError> {
        state.calls.push(StoreCall {
            region: self.region.clone(),
            op,
            target: path.to_string(),
        });
        match state.failures.get(&(self.region.clone(), op)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl ParameterStore for MemoryStore {
    fn get(&self, path: &str) -> Result<String, StoreError> {
        let mut state = self.factory.lock();
        self.begin(&mut state, StoreOp::Get, path)?;
        state
            .regions
            .get(&self.region)
            .and_then(|params| params.get(path))
            .map(|p| p.value.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn put(&self, request: &PutRequest) -> Result<(), StoreError> {
        let mut state = self.factory.lock();
        self.begin(&mut state, StoreOp::Put, &request.path)?;

        let params = state.regions.entry(self.region.clone()).or_default();
        let existing = params.get(&request.path).cloned();

        let stored = match (request.mode, existing) {
            (PutMode::Create { overwrite: false }, Some(_)) => {
                return Err(StoreError::AlreadyExists(request.path.clone()));
            }
            (PutMode::Update, None) => {
                return Err(StoreError::NotFound(request.path.clone()));
            }
            (PutMode::Update, Some(current)) => StoredParameter {
                value: request.value.clone(),
                param_type: request.param_type.clone().unwrap_or(current.param_type),
                description: request.description.clone().or(current.description),
                kms_key: request.kms_key.clone().or(current.kms_key),
            },
            (PutMode::Create { .. }, _) => StoredParameter {
                value: request.value.clone(),
                param_type: request
                    .param_type
                    .clone()
                    .unwrap_or_else(|| super::PARAMETER_TYPE_STRING.to_string()),
                description: request.description.clone(),
                kms_key: request.kms_key.clone(),
            },
        };

        params.insert(request.path.clone(), stored);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        let mut state = self.factory.lock();
        self.begin(&mut state, StoreOp::Delete, path)?;
        state
            .regions
            .get_mut(&self.region)
            .and_then(|params| params.remove(path))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}
