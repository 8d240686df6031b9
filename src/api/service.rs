//! Shared business logic for the dashboard API
//!
//! Holds the read-through cache: the dataset and its aggregates are reused
//! until the source file's modification time or length changes.

use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::insights::{self, InsightProvider, DEFAULT_QUESTION};
use crate::inventory::{AbcPolicy, ProductSummary};
use crate::loader::load_dataset;
use crate::metrics::{self, GroupSummary, PartnerPerformance, SupplierPerformance};
use crate::models::{Dataset, GroupKey};
use crate::views::{AiInsightsView, DashboardAggregates, View, ViewPayload};

// ============================================================================
// Cache
// ============================================================================

/// Identity of the source file contents as seen by the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetVersion {
    modified: Option<SystemTime>,
    len: u64,
}

impl DatasetVersion {
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io(e),
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Dataset and aggregates for one version, shared by concurrent requests
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: DatasetVersion,
    pub dataset: Arc<Dataset>,
    pub aggregates: Arc<DashboardAggregates>,
}

// ============================================================================
// Dashboard Service
// ============================================================================

pub struct DashboardService {
    data_path: PathBuf,
    as_of: NaiveDate,
    policy: AbcPolicy,
    provider: Arc<dyn InsightProvider>,
    cached: Arc<RwLock<Option<Snapshot>>>,
}

impl DashboardService {
    pub fn new(
        data_path: impl Into<PathBuf>,
        as_of: NaiveDate,
        policy: AbcPolicy,
        provider: Arc<dyn InsightProvider>,
    ) -> Self {
        Self {
            data_path: data_path.into(),
            as_of,
            policy,
            provider,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Current dataset and aggregates, reloading only when the file changed
    pub async fn snapshot(&self) -> Result<Snapshot, LoadError> {
        let version = DatasetVersion::of(&self.data_path)?;

        // Check cache first
        {
            let cache = self.cached.read().await;
            if let Some(snapshot) = cache.as_ref().filter(|s| s.version == version) {
                debug!("Cache hit for {:?}", self.data_path);
                return Ok(snapshot.clone());
            }
        }

        let mut cache = self.cached.write().await;
        // Another request may have reloaded while we waited for the lock
        if let Some(snapshot) = cache.as_ref().filter(|s| s.version == version) {
            return Ok(snapshot.clone());
        }

        let path = self.data_path.clone();
        let (as_of, policy) = (self.as_of, self.policy);
        let (dataset, aggregates) = tokio::task::spawn_blocking(move || {
            let dataset = load_dataset(&path)?;
            let aggregates = DashboardAggregates::compute(&dataset, as_of, &policy);
            Ok::<_, LoadError>((dataset, aggregates))
        })
        .await
        .map_err(|e| LoadError::Io(std::io::Error::new(ErrorKind::Other, e)))??;
        info!(
            "Computed aggregates for {} shipments (as of {})",
            dataset.len(),
            self.as_of
        );

        let snapshot = Snapshot {
            version,
            dataset: Arc::new(dataset),
            aggregates: Arc::new(aggregates),
        };
        *cache = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn aggregates(&self) -> Result<Arc<DashboardAggregates>, LoadError> {
        Ok(self.snapshot().await?.aggregates)
    }

    pub async fn view(&self, view: View, question: Option<&str>) -> Result<ViewPayload, LoadError> {
        let aggregates = self.aggregates().await?;
        match ViewPayload::assemble(view, &aggregates) {
            Some(payload) => Ok(payload),
            None => Ok(ViewPayload::AiInsights(
                self.insights_for(&aggregates, question).await,
            )),
        }
    }

    pub async fn insights(&self, question: Option<&str>) -> Result<AiInsightsView, LoadError> {
        let aggregates = self.aggregates().await?;
        Ok(self.insights_for(&aggregates, question).await)
    }

    async fn insights_for(
        &self,
        aggregates: &DashboardAggregates,
        question: Option<&str>,
    ) -> AiInsightsView {
        let question = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUESTION);
        let prompt = insights::build_prompt(aggregates, question);
        let narrative = insights::generate_narrative(self.provider.as_ref(), &prompt).await;
        AiInsightsView::new(aggregates, question, narrative)
    }

    pub async fn group_summaries(&self, key: GroupKey) -> Result<Vec<GroupSummary>, LoadError> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::group_by(snapshot.dataset.shipments(), key))
    }

    pub async fn suppliers(&self) -> Result<Vec<SupplierPerformance>, LoadError> {
        Ok(self.aggregates().await?.suppliers.clone())
    }

    pub async fn partners(&self) -> Result<Vec<PartnerPerformance>, LoadError> {
        Ok(self.aggregates().await?.partners.clone())
    }

    pub async fn products(&self) -> Result<Vec<ProductSummary>, LoadError> {
        Ok(self.aggregates().await?.products.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::DisabledProvider;
    use std::io::Write;

    const CSV: &str = "Order ID,Product,Supplier,Warehouse Location,Logistics Partner,Shipping Method,Quantity,Unit Price,Promised Date,Actual Delivery Date,Delivery Status\n\
ORD-1,Bolts,Acme,Dallas,FastShip,Ground,10,2.50,2024-03-01,2024-03-01,Delivered\n\
ORD-2,Nuts,Beta,Austin,SlowCo,Air,5,4.00,2024-03-02,,Delayed\n";

    fn service(path: &Path) -> DashboardService {
        DashboardService::new(
            path,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            AbcPolicy::default(),
            Arc::new(DisabledProvider),
        )
    }

    #[tokio::test]
    async fn reuses_snapshot_until_file_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let svc = service(file.path());
        let first = svc.snapshot().await.unwrap();
        let second = svc.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first.aggregates, &second.aggregates));

        file.write_all(b"ORD-3,Bolts,Acme,Dallas,FastShip,Ground,1,2.50,2024-03-03,,Pending\n")
            .unwrap();
        file.flush().unwrap();
        let third = svc.snapshot().await.unwrap();
        assert_eq!(third.dataset.len(), 3);
        assert!(!Arc::ptr_eq(&first.aggregates, &third.aggregates));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_reloads_share_one_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let svc = service(file.path());
        let (a, b) = tokio::join!(svc.snapshot(), svc.snapshot());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.dataset.len(), 2);
        assert!(Arc::ptr_eq(&a.aggregates, &b.aggregates));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir.path().join("absent.csv"));
        let err = svc.snapshot().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn insights_view_degrades_without_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let view = service(file.path()).insights(None).await.unwrap();
        assert!(!view.narrative.is_available());
        assert_eq!(view.question, DEFAULT_QUESTION);
        assert_eq!(view.metrics.total_orders, 2);
    }
}
