//! Campaign history store with DashMap + parking_lot::RwLock
//!
//! Uses DashMap for per-campaign history (per-entry locking) and a
//! parking_lot::RwLock for the optimizer tuning (rare writes, frequent reads).

use crate::config::OptimizerConfig;
use crate::error::{CoreError, LoadReport};
use crate::optimizer::SpendOptimizer;
use crate::parsers::{HistoryFile, HistoryParser};
use dashmap::DashMap;
use parking_lot::RwLock;
use spendopt_types::{HistoryPoint, OptimizationResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Supplier of per-campaign daily history
///
/// Implementations return points newest-first; the engine keeps the first
/// usable entries as "most recent".
pub trait HistorySource: Send + Sync {
    /// Known campaign identifiers, sorted
    fn campaigns(&self) -> Vec<String>;

    /// History of one campaign, `None` if the campaign is unknown
    fn history(&self, campaign: &str) -> Option<Arc<Vec<HistoryPoint>>>;
}

/// In-memory history store
///
/// Each campaign is optimized independently; nothing here allocates budget
/// across campaigns.
pub struct HistoryStore {
    /// Campaign id → history (Arc for cheap cloning out of the map)
    campaigns: DashMap<String, Arc<Vec<HistoryPoint>>>,

    /// Engine used by `optimize_*`
    optimizer: RwLock<SpendOptimizer>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl HistoryStore {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            campaigns: DashMap::new(),
            optimizer: RwLock::new(SpendOptimizer::new(config)),
        }
    }

    /// Create with the stock optimizer tuning
    pub fn with_defaults() -> Self {
        Self::new(OptimizerConfig::default())
    }

    /// Replace a campaign's history
    pub fn insert(&self, campaign: impl Into<String>, points: Vec<HistoryPoint>) {
        self.campaigns.insert(campaign.into(), Arc::new(points));
    }

    /// Add every campaign of a parsed file, replacing same-named ones
    pub fn extend_from(&self, file: HistoryFile) {
        for (campaign, points) in file.campaigns {
            debug!(campaign = %campaign, points = points.len(), "Storing campaign history");
            self.insert(campaign, points);
        }
    }

    /// Parse a history file and store its campaigns, recording problems in `report`
    pub async fn load_file(&self, path: &Path, report: &mut LoadReport) -> bool {
        match HistoryParser::new().parse_graceful(path, report).await {
            Some(file) => {
                info!(
                    path = %path.display(),
                    campaigns = file.campaigns.len(),
                    "Loaded campaign history"
                );
                self.extend_from(file);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    /// Current optimizer tuning
    pub fn config(&self) -> OptimizerConfig {
        self.optimizer.read().config().clone()
    }

    /// Swap the optimizer tuning (validated first)
    pub fn set_config(&self, config: OptimizerConfig) -> Result<(), CoreError> {
        config.validate()?;
        *self.optimizer.write() = SpendOptimizer::new(config);
        Ok(())
    }

    /// Fresh recommendation for one campaign
    pub fn optimize_campaign(&self, campaign: &str) -> Result<OptimizationResult, CoreError> {
        let history = self.history(campaign);
        self.optimizer
            .read()
            .optimize(history.as_deref().map(Vec::as_slice))
            .ok_or_else(|| CoreError::CampaignNotFound {
                campaign: campaign.to_string(),
            })
    }

    /// Independent recommendation for every campaign, sorted by campaign id
    pub fn optimize_all(&self) -> Vec<(String, OptimizationResult)> {
        let optimizer = self.optimizer.read().clone();
        self.campaigns()
            .into_iter()
            .filter_map(|campaign| {
                let history = self.history(&campaign)?;
                Some((campaign, optimizer.analyze(&history)))
            })
            .collect()
    }
}

impl HistorySource for HistoryStore {
    fn campaigns(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.campaigns.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    fn history(&self, campaign: &str) -> Option<Arc<Vec<HistoryPoint>>> {
        self.campaigns.get(campaign).map(|r| Arc::clone(r.value()))
    }
}
