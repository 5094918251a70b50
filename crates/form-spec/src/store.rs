use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::answers::Response;
use crate::spec::form::Form;

/// Failures surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document with id '{0}'")]
    NotFound(String),
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence seam the core reads from and writes to.
///
/// Implementations own atomicity and isolation for concurrent edits; the
/// core assumes each call either succeeds or returns one tagged error,
/// nothing else.
pub trait FormStore {
    /// Load one form, or [`StoreError::NotFound`].
    fn load_form(&self, id: &str) -> Result<Form, StoreError>;
    /// Persist a form, assigning an id on first save and refreshing
    /// `updated_at` to `now`. Returns the stored document.
    fn save_form(&mut self, form: Form, now: DateTime<Utc>) -> Result<Form, StoreError>;
    /// Delete a form and, cascading, its stored responses.
    fn delete_form(&mut self, id: &str) -> Result<(), StoreError>;
    /// All forms, newest first.
    fn list_forms(&self) -> Result<Vec<Form>, StoreError>;
    /// Stored responses for a form, newest first.
    fn load_responses(&self, form_id: &str) -> Result<Vec<Response>, StoreError>;
    /// Persist a new response, assigning an id. Responses are never
    /// updated after this.
    fn save_response(&mut self, response: Response) -> Result<Response, StoreError>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: BTreeMap<String, Form>,
    responses: Vec<Response>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }
}

impl FormStore for MemoryStore {
    fn load_form(&self, id: &str) -> Result<Form, StoreError> {
        self.forms
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save_form(&mut self, mut form: Form, now: DateTime<Utc>) -> Result<Form, StoreError> {
        if form.id.is_empty() {
            form.id = self.mint_id();
        }
        form.updated_at = now;
        self.forms.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    fn delete_form(&mut self, id: &str) -> Result<(), StoreError> {
        if self.forms.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.responses.retain(|response| response.form_id != id);
        Ok(())
    }

    fn list_forms(&self) -> Result<Vec<Form>, StoreError> {
        let mut forms: Vec<Form> = self.forms.values().cloned().collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(forms)
    }

    fn load_responses(&self, form_id: &str) -> Result<Vec<Response>, StoreError> {
        let mut responses: Vec<Response> = self
            .responses
            .iter()
            .filter(|response| response.form_id == form_id)
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(a.id.cmp(&b.id)));
        Ok(responses)
    }

    fn save_response(&mut self, mut response: Response) -> Result<Response, StoreError> {
        if response.id.is_empty() {
            response.id = self.mint_id();
        }
        self.responses.push(response.clone());
        Ok(response)
    }
}
