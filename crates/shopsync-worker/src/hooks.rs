//! Extension point for the due-job selection.

use async_trait::async_trait;

use shopsync_core::result::AppResult;
use shopsync_database::store::JobLedger;
use shopsync_entity::job::JobRecord;

/// Adds ledger rows to the set of recurring jobs a sweep will run.
///
/// Rows already present are deduplicated by id afterwards.
#[async_trait]
pub trait DueJobHook: Send + Sync + std::fmt::Debug {
    async fn extend(&self, ledger: &dyn JobLedger, due: &mut Vec<JobRecord>) -> AppResult<()>;
}
