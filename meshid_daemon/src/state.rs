use crate::sources;
use crate::store::NameStore;
use chrono::Utc;
use meshid_core::aggregate::{aggregate, collect};
use meshid_core::{
    Engine, MeshIdConfig, MeshIdError, MeshIdResult, NodeRecord, NodeSource, WorkingSet,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared, read-only service state. Working sets are built per request.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub sources: Arc<Vec<Arc<dyn NodeSource>>>,
    pub store: Arc<NameStore>,
    /// Settings template handed back with each generated name
    pub settings: Option<Arc<Value>>,
}

impl AppState {
    pub fn new(engine: Engine, sources: Vec<Arc<dyn NodeSource>>, store: NameStore) -> Self {
        Self {
            engine: Arc::new(engine),
            sources: Arc::new(sources),
            store: Arc::new(store),
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    pub fn from_config(config: &MeshIdConfig) -> anyhow::Result<Self> {
        let engine = Engine::from_config(config)?;
        let sources = sources::from_config(&config.sources)?;
        tracing::info!("{} node sources configured", sources.len());

        let store = match &config.server.name_store {
            Some(path) => NameStore::open(path)?,
            None => NameStore::in_memory(),
        };

        let mut state = Self::new(engine, sources, store);
        if let Some(path) = &config.server.recommended_settings {
            let contents = std::fs::read_to_string(path)?;
            state = state.with_settings(serde_json::from_str(&contents)?);
        }
        Ok(state)
    }

    /// Fresh working set from every source
    pub async fn working_set(&self) -> WorkingSet {
        fetch(self.sources.iter().cloned().collect()).await
    }

    /// Fresh working set from the sources the grid is restricted to
    pub async fn grid_working_set(&self) -> WorkingSet {
        let selected = match &self.engine.grid_config().sources {
            Some(names) => self
                .sources
                .iter()
                .filter(|s| names.iter().any(|n| n == s.name()))
                .cloned()
                .collect(),
            None => self.sources.iter().cloned().collect(),
        };
        fetch(selected).await
    }
}

/// Source adapters block on I/O, so they run on the blocking pool
async fn fetch(sources: Vec<Arc<dyn NodeSource>>) -> WorkingSet {
    let names: Vec<String> = sources.iter().map(|s| s.name().to_string()).collect();
    match tokio::task::spawn_blocking(move || collect(&sources)).await {
        Ok(set) => set,
        Err(e) => {
            tracing::error!("node fetch task failed: {}", e);
            let outcomes = names.into_iter().map(|name| {
                let failure: MeshIdResult<Vec<NodeRecord>> =
                    Err(MeshIdError::source_unavailable(name.clone(), &e));
                (name, failure)
            });
            aggregate(outcomes, Utc::now().timestamp())
        }
    }
}
