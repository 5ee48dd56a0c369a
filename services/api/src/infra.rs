use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_rating::mortgages::{
    mean_credit_score, MortgageApplication, MortgageFields, MortgageId, MortgagePatch,
    MortgageRepository, RepositoryError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mortgage records held in memory, optionally mirrored to a JSON snapshot file.
///
/// With a snapshot path every mutation rewrites the file before it is acknowledged; a
/// failed write rolls the in-memory change back and reports the store as unavailable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMortgageRepository {
    state: Arc<Mutex<StoreState>>,
    snapshot: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    records: BTreeMap<MortgageId, MortgageApplication>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    next_id: u64,
    records: Vec<MortgageApplication>,
}

impl InMemoryMortgageRepository {
    /// Open a durable store, loading `path` when it already exists.
    pub(crate) fn with_snapshot(path: PathBuf) -> Result<Self, RepositoryError> {
        let state = if path.exists() {
            load_snapshot(&path)?
        } else {
            StoreState::default()
        };

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            snapshot: Some(path),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().records.len()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("repository mutex poisoned")
    }

    fn persist(&self, state: &StoreState) -> Result<(), RepositoryError> {
        match &self.snapshot {
            Some(path) => write_snapshot(path, state),
            None => Ok(()),
        }
    }
}

impl MortgageRepository for InMemoryMortgageRepository {
    fn insert(&self, fields: MortgageFields) -> Result<MortgageApplication, RepositoryError> {
        let mut guard = self.lock();
        guard.next_id += 1;
        let record = MortgageApplication {
            id: MortgageId(guard.next_id),
            fields,
            created_at: Utc::now(),
        };
        guard.records.insert(record.id, record.clone());

        if let Err(err) = self.persist(&guard) {
            guard.records.remove(&record.id);
            return Err(err);
        }
        Ok(record)
    }

    fn fetch(&self, id: MortgageId) -> Result<MortgageApplication, RepositoryError> {
        self.lock()
            .records
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<MortgageApplication>, RepositoryError> {
        Ok(self.lock().records.values().cloned().collect())
    }

    fn update(
        &self,
        id: MortgageId,
        patch: &MortgagePatch,
    ) -> Result<MortgageApplication, RepositoryError> {
        let mut guard = self.lock();
        let record = guard
            .records
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        let previous = record.fields.clone();
        patch.apply_to(&mut record.fields);
        let updated = record.clone();

        if let Err(err) = self.persist(&guard) {
            if let Some(record) = guard.records.get_mut(&id) {
                record.fields = previous;
            }
            return Err(err);
        }
        Ok(updated)
    }

    fn delete(&self, id: MortgageId) -> Result<(), RepositoryError> {
        let mut guard = self.lock();
        let removed = guard
            .records
            .remove(&id)
            .ok_or(RepositoryError::NotFound(id))?;

        if let Err(err) = self.persist(&guard) {
            guard.records.insert(id, removed);
            return Err(err);
        }
        Ok(())
    }

    fn average_credit_score(
        &self,
        exclude: Option<MortgageId>,
    ) -> Result<Option<f64>, RepositoryError> {
        Ok(mean_credit_score(self.lock().records.values(), exclude))
    }
}

fn load_snapshot(path: &Path) -> Result<StoreState, RepositoryError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        RepositoryError::Unavailable(format!("failed to read {}: {err}", path.display()))
    })?;
    let snapshot: SnapshotFile = serde_json::from_str(&raw).map_err(|err| {
        RepositoryError::Unavailable(format!("corrupt snapshot {}: {err}", path.display()))
    })?;

    let highest = snapshot
        .records
        .iter()
        .map(|record| record.id.0)
        .max()
        .unwrap_or(0);

    Ok(StoreState {
        next_id: snapshot.next_id.max(highest),
        records: snapshot
            .records
            .into_iter()
            .map(|record| (record.id, record))
            .collect(),
    })
}

fn write_snapshot(path: &Path, state: &StoreState) -> Result<(), RepositoryError> {
    let snapshot = SnapshotFile {
        next_id: state.next_id,
        records: state.records.values().cloned().collect(),
    };
    let encoded = serde_json::to_vec_pretty(&snapshot)
        .map_err(|err| RepositoryError::Unavailable(format!("failed to encode snapshot: {err}")))?;

    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, encoded)
        .and_then(|()| std::fs::rename(&staging, path))
        .map_err(|err| {
            RepositoryError::Unavailable(format!("failed to write {}: {err}", path.display()))
        })
}
