//! Application builder: wires stores, auth, jobs and handlers into the
//! dispatcher and the Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tracing::info;

use shopsync_auth::{RpcSessionStore, SyncLogin};
use shopsync_cache::CacheManager;
use shopsync_core::config::AppConfig;
use shopsync_core::result::AppResult;
use shopsync_database::store::{CredentialStore, JobLedger, ShopMaintenance};
use shopsync_entity::job::JobKind;
use shopsync_service::dispatch::starter::{LAST_JOBS, SELF_TEST};
use shopsync_service::dispatch::{DispatchSettings, Dispatcher, HandlerRegistry};
use shopsync_service::handlers::{InboxPullHandler, JobSweepHandler, OutboxPushHandler, SelfTestHandler};
use shopsync_service::rpc::{CronjobRpcHandler, RpcAuthenticator, RpcLayer, UploadRpcHandler};
use shopsync_worker::actions::{CommandAction, CommandJob, GarbageCollector};
use shopsync_worker::{JobRunner, SweepSettings};

use crate::router::build_router;
use crate::state::AppState;

/// Persistence the gateway runs against.
#[derive(Debug, Clone)]
pub struct GatewayStores {
    pub credentials: Arc<dyn CredentialStore>,
    pub ledger: Arc<dyn JobLedger>,
    pub shop: Arc<dyn ShopMaintenance>,
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(CompressionLayer::new())
}

/// Wire every gateway component from configuration and stores.
pub async fn build_state(config: AppConfig, stores: GatewayStores) -> AppResult<AppState> {
    // ── Step 1: Sync credential ──────────────────────────────────
    let login = Arc::new(SyncLogin::load(stores.credentials.as_ref()).await?);

    // ── Step 2: RPC sessions ─────────────────────────────────────
    let cache = CacheManager::new(&config.cache);
    let sessions = RpcSessionStore::new(cache, &config.session);

    // ── Step 3: Job runner ───────────────────────────────────────
    let runner = Arc::new(build_runner(&config, &stores));

    // ── Step 4: RPC layer ────────────────────────────────────────
    let mut rpc = RpcLayer::new(RpcAuthenticator::new(Arc::clone(&login), sessions));
    rpc.register(Arc::new(CronjobRpcHandler::new(Arc::clone(&runner))));
    rpc.register(Arc::new(UploadRpcHandler::new(config.storage.uploads_path())));

    // ── Step 5: Handler tables ───────────────────────────────────
    let inbox = Arc::new(InboxPullHandler::new(config.storage.inbox_path()));
    let outbox = Arc::new(OutboxPushHandler::new(config.storage.outbox_path()));
    let mut registry = HandlerRegistry::builder()
        .direct(LAST_JOBS, Arc::new(JobSweepHandler::new(Arc::clone(&runner))))
        .direct(SELF_TEST, Arc::new(SelfTestHandler::new(config.storage.sync_temp_path())));
    for identifier in &config.gateway.pull_identifiers {
        registry = registry.pull(identifier.clone(), inbox.clone());
    }
    for identifier in &config.gateway.push_identifiers {
        registry = registry.push(identifier.clone(), outbox.clone());
    }

    // ── Step 6: Dispatcher ───────────────────────────────────────
    let settings = DispatchSettings::from_config(&config.gateway, &config.storage)?;
    let dispatcher = Dispatcher::new(login, registry.build(), rpc, settings);

    info!(
        pull = config.gateway.pull_identifiers.len(),
        push = config.gateway.push_identifiers.len(),
        "Gateway wired"
    );

    Ok(AppState {
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
        runner,
    })
}

/// Job runner with every built-in action and configured command bound.
pub fn build_runner(config: &AppConfig, stores: &GatewayStores) -> JobRunner {
    let jobs = &config.jobs;
    let mut runner = JobRunner::new(
        Arc::clone(&stores.ledger),
        Arc::clone(&stores.shop),
        SweepSettings::from_config(&config.storage, &config.gateway, jobs),
    );

    let commands = [
        (JobKind::ReviewReminder, jobs.features.review_reminders, &jobs.commands.review_reminders),
        (JobKind::SitemapExport, jobs.features.sitemap_export, &jobs.commands.sitemap_export),
        (JobKind::RssExport, jobs.features.rss_export, &jobs.commands.rss_export),
    ];
    for (kind, flag, spec) in commands {
        runner.register_action(Arc::new(CommandAction::new(kind, flag, spec.clone())));
    }
    runner.register_action(Arc::new(GarbageCollector::new(
        Arc::clone(&stores.ledger),
        config.storage.sync_temp_path(),
        config.gateway.retain_sync_files,
        jobs.history_retention_days,
        jobs.features.garbage_collection,
    )));

    for (name, spec) in &jobs.one_shot_commands {
        runner.register_one_shot(Arc::new(CommandJob::new(name.clone(), spec.clone())));
    }
    runner
}
