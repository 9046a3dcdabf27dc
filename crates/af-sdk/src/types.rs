//! Resource types returned by the platform.

use serde::{Deserialize, Serialize};

/// Provisioning state of a custom domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainStatus {
    /// Creation requested.
    Creating,
    /// Domain is ready.
    Created,
    /// Creation failed.
    CreatingFailed,
    /// DNS verification in progress.
    Verifying,
    /// DNS verification failed.
    VerifyingFailed,
    /// Domain is active.
    Active,
    /// Deletion in progress.
    Deleting,
    /// Status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl DomainStatus {
    /// Returns true once creation has either completed or failed.
    #[must_use]
    pub const fn is_creation_settled(self) -> bool {
        matches!(self, Self::Created | Self::CreatingFailed)
    }
}

/// A custom domain attached to a site or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Domain ID.
    pub id: String,
    /// Fully qualified hostname.
    pub hostname: String,
    /// Current status.
    pub status: DomainStatus,
    /// DNS zone the domain lives in.
    #[serde(default)]
    pub zone: Option<ZoneRef>,
}

/// Reference to a DNS zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRef {
    /// Zone ID.
    pub id: String,
}

/// A DNS zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Zone ID.
    pub id: String,
    /// Zone status as reported by the platform.
    #[serde(default)]
    pub status: Option<String>,
}

/// Verification state of an ENS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnsRecordStatus {
    /// Record created, not yet verified.
    Created,
    /// Verification in progress.
    Verifying,
    /// Verification failed.
    VerifyingFailed,
    /// Record is active.
    Active,
    /// Status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl EnsRecordStatus {
    /// Returns true once verification has either succeeded or failed.
    #[must_use]
    pub const fn is_verification_settled(self) -> bool {
        matches!(self, Self::Active | Self::VerifyingFailed)
    }
}

/// An ENS name linked to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsRecord {
    /// Record ID.
    pub id: String,
    /// ENS name.
    pub name: String,
    /// Current status.
    pub status: EnsRecordStatus,
}

/// Lifecycle state of a site deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    /// Build queued.
    BuildQueued,
    /// Build in progress.
    BuildInProgress,
    /// Build finished, release pending.
    BuildCompleted,
    /// Build failed.
    BuildFailed,
    /// Release in progress.
    ReleaseInProgress,
    /// Deployment is live.
    ReleaseCompleted,
    /// Release failed.
    ReleaseFailed,
    /// Status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl DeploymentStatus {
    /// Returns true once the release has either completed or failed.
    #[must_use]
    pub const fn is_release_settled(self) -> bool {
        matches!(self, Self::ReleaseCompleted | Self::ReleaseFailed)
    }
}

/// A deployment of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Deployment ID.
    pub id: String,
    /// Current status.
    pub status: DeploymentStatus,
    /// IPFS content identifier of the deployed build.
    #[serde(default)]
    pub cid: Option<String>,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Linked wallet address.
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}
