//! Management server access
//!
//! Account listing and quota lookups both go through the remote management
//! server; quota calls are relayed upstream by its `api-call` proxy.

mod client;
pub mod envelope;

use async_trait::async_trait;

use crate::core::{AuthFile, ModelLimits, QuotaError};

pub use client::ManagementClient;

/// Source of accounts and per-account quota
#[async_trait]
pub trait QuotaSource: Send + Sync {
    /// List every account the server knows about
    async fn fetch_accounts(&self) -> Result<Vec<AuthFile>, QuotaError>;

    /// Fetch and normalize quota for one account
    async fn fetch_quota(&self, file: &AuthFile) -> Result<ModelLimits, QuotaError>;
}
