use std::path::PathBuf;

use serde::Deserialize;

use crate::store::{Record, RecordStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: PathBuf,
    pub store: RecordStore,
    /// Row the operator picked in the admin table. At most one at a time.
    pub selection: Option<Record>,
}

impl AppState {
    pub fn open(workspace: PathBuf) -> anyhow::Result<Self> {
        let store = RecordStore::in_workspace(&workspace);
        store.init()?;
        Ok(Self {
            workspace,
            store,
            selection: None,
        })
    }
}
