use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use form_spec::{Form, FormStore, Response, StoreError};

/// Directory-backed document store: one pretty-printed JSON file per form
/// under `forms/`, one per response under `responses/`.
pub struct DirStore {
    forms_dir: PathBuf,
    responses_dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let forms_dir = root.join("forms");
        let responses_dir = root.join("responses");
        fs::create_dir_all(&forms_dir)?;
        fs::create_dir_all(&responses_dir)?;
        Ok(Self {
            forms_dir,
            responses_dir,
        })
    }

    fn form_path(&self, id: &str) -> PathBuf {
        self.forms_dir.join(format!("{id}.json"))
    }

    fn response_path(&self, id: &str) -> PathBuf {
        self.responses_dir.join(format!("{id}.json"))
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    fn read_dir_documents<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
        let mut documents = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                documents.push(Self::read_json(&path)?);
            }
        }
        Ok(documents)
    }
}

impl FormStore for DirStore {
    fn load_form(&self, id: &str) -> Result<Form, StoreError> {
        let path = self.form_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Self::read_json(&path)
    }

    fn save_form(&mut self, mut form: Form, now: DateTime<Utc>) -> Result<Form, StoreError> {
        if form.id.is_empty() {
            form.id = Uuid::new_v4().to_string();
        }
        form.updated_at = now;
        Self::write_json(&self.form_path(&form.id), &form)?;
        tracing::debug!(form_id = %form.id, "saved form");
        Ok(form)
    }

    fn delete_form(&mut self, id: &str) -> Result<(), StoreError> {
        let path = self.form_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(&path)?;

        for response in Self::read_dir_documents::<Response>(&self.responses_dir)? {
            if response.form_id == id {
                fs::remove_file(self.response_path(&response.id))?;
            }
        }
        tracing::debug!(form_id = %id, "deleted form and its responses");
        Ok(())
    }

    fn list_forms(&self) -> Result<Vec<Form>, StoreError> {
        let mut forms: Vec<Form> = Self::read_dir_documents(&self.forms_dir)?;
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(forms)
    }

    fn load_responses(&self, form_id: &str) -> Result<Vec<Response>, StoreError> {
        let mut responses: Vec<Response> = Self::read_dir_documents(&self.responses_dir)?;
        responses.retain(|response| response.form_id == form_id);
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(a.id.cmp(&b.id)));
        Ok(responses)
    }

    fn save_response(&mut self, mut response: Response) -> Result<Response, StoreError> {
        if response.id.is_empty() {
            response.id = Uuid::new_v4().to_string();
        }
        Self::write_json(&self.response_path(&response.id), &response)?;
        tracing::debug!(
            response_id = %response.id,
            form_id = %response.form_id,
            "stored response"
        );
        Ok(response)
    }
}
