//! Pipeline services: recording, policy resolution, distribution, audit.

pub mod audit;
pub mod distributor;
pub mod policy;
pub mod recorder;
pub mod settlement;

pub use audit::AuditService;
pub use distributor::{
    compute_distribution, DistributionInput, DistributionPlan, DistributionSummary,
    RewardDistributor, ORG_BONUS_PERCENT,
};
pub use policy::{org_bonus_recipient, PgRewardConfig, RewardConfigProvider};
pub use recorder::{EventRecorder, RecordedDelivery};
pub use settlement::{MockSettlement, SettlementBackend};
