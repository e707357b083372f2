use chrono::NaiveDate;
use eventos_meta::classification::{ClassificationService, Dataset, InMemoryStore};
use eventos_meta::config::AppConfig;
use eventos_meta::error::AppError;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::cli::DatasetArgs;

pub(crate) type Service = ClassificationService<InMemoryStore, InMemoryStore>;

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{value}': {err}"))
}

pub(crate) fn parse_points(value: &str) -> Result<Decimal, String> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|err| format!("invalid points '{value}': {err}"))
}

/// Loaded dataset plus the service ranking over it.
pub(crate) struct Workspace {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) service: Service,
}

impl Workspace {
    pub(crate) fn open(config: &AppConfig, args: &DatasetArgs) -> Result<Self, AppError> {
        let path = args
            .dataset
            .clone()
            .or_else(|| config.storage.dataset_path.clone())
            .ok_or_else(|| {
                AppError::Usage("pass --dataset or set EVENTOS_DATASET".to_string())
            })?;

        let dataset = load_dataset(&path)?;
        let store = Arc::new(InMemoryStore::from_dataset(dataset)?);

        let mut classification = config.classification.clone();
        if args.today.is_some() {
            classification.reference_date = args.today;
        }
        let service = ClassificationService::new(store.clone(), store.clone(), classification);

        Ok(Self { store, service })
    }

    pub(crate) fn save(&self, path: &Path) -> Result<(), AppError> {
        let snapshot = self.store.snapshot()?;
        let writer = BufWriter::new(File::create(path)?);
        snapshot.to_writer(writer)?;
        info!(path = %path.display(), "dataset saved");
        Ok(())
    }
}

fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let dataset = Dataset::from_reader(reader)?;
    info!(
        path = %path.display(),
        events = dataset.events.len(),
        registrations = dataset.registrations.len(),
        "dataset loaded"
    );
    Ok(dataset)
}
