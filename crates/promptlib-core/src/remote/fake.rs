//! In-memory [`RecordApi`] for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{NewPrompt, PromptPatch, RecordApi, RemoteError, RemotePrompt, RemoteResult};
use crate::models::PromptId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    List,
    Create(NewPrompt),
    Update(PromptId, PromptPatch),
    Delete(PromptId),
}

/// Server double that assigns `srv-N` identifiers.
#[derive(Default)]
pub struct InMemoryRecordApi {
    records: Mutex<BTreeMap<PromptId, RemotePrompt>>,
    calls: Mutex<Vec<RemoteCall>>,
    next_id: AtomicUsize,
    failure: Mutex<Option<String>>,
    create_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl InMemoryRecordApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<RemotePrompt>) -> Arc<Self> {
        let api = Self::default();
        {
            let mut stored = api.records.lock();
            for record in records {
                stored.insert(record.id.clone(), record);
            }
        }
        Arc::new(api)
    }

    /// Make every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    /// Hold `create` calls until the returned semaphore gets permits.
    pub fn gate_creates(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.create_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    pub fn record(&self, id: &PromptId) -> Option<RemotePrompt> {
        self.records.lock().get(id).cloned()
    }

    fn begin(&self, call: RemoteCall) -> RemoteResult<()> {
        self.calls.lock().push(call);
        match self.failure.lock().as_ref() {
            Some(message) => Err(RemoteError::Api(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordApi for InMemoryRecordApi {
    async fn list(&self) -> RemoteResult<Vec<RemotePrompt>> {
        self.begin(RemoteCall::List)?;
        Ok(self.records.lock().values().cloned().collect())
    }

    async fn create(&self, prompt: &NewPrompt) -> RemoteResult<PromptId> {
        self.calls.lock().push(RemoteCall::Create(prompt.clone()));

        let gate = self.create_gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| RemoteError::Api("gate closed".to_string()))?
                .forget();
        }
        if let Some(message) = self.failure.lock().as_ref() {
            return Err(RemoteError::Api(message.clone()));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = PromptId::parse(format!("srv-{n}"))
            .map_err(|e| RemoteError::InvalidPayload(e.to_string()))?;
        self.records.lock().insert(
            id.clone(),
            RemotePrompt {
                id: id.clone(),
                name: prompt.name.clone(),
                text: prompt.text.clone(),
                created_at: Some(prompt.created_at),
                updated_at: Some(prompt.updated_at),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: &PromptId, patch: &PromptPatch) -> RemoteResult<()> {
        self.begin(RemoteCall::Update(id.clone(), patch.clone()))?;
        let mut records = self.records.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| RemoteError::Api("Prompt not found (404)".to_string()))?;
        if let Some(name) = &patch.name {
            record.name.clone_from(name);
        }
        if let Some(text) = &patch.text {
            record.text.clone_from(text);
        }
        record.updated_at = Some(patch.updated_at);
        Ok(())
    }

    async fn delete(&self, id: &PromptId) -> RemoteResult<()> {
        self.begin(RemoteCall::Delete(id.clone()))?;
        self.records.lock().remove(id);
        Ok(())
    }
}
