/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (公開鍵, revocation store, user resolver, validator)
 * - Router 組み立て + Middleware の適用 (bearer gate / HTTP layers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::middleware::{self, auth::BearerAuth};
use crate::repos::user_repo::PgUserResolver;
use crate::services::auth::{
    BearerTokenValidator, InMemoryRevocationStore, RevocationChecker, ValkeyRevocationStore,
    user::{SubjectUserResolver, UserResolver},
};
use crate::{api, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bearer_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // In development, fail fast so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting bearer gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let (state, auth) = build_state(&config).await?;
    let app = build_router(state, auth, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<(AppState, BearerAuth)> {
    // Public key is read exactly once and shared read-only afterwards.
    let key = config
        .public_key
        .load(config.jwt_algorithm)
        .context("failed to load OAuth public key")?;
    tracing::info!(algorithm = ?key.algorithm(), "loaded OAuth public key");

    let revocation: Arc<dyn RevocationChecker> = match &config.redis_url {
        Some(url) => {
            let store = ValkeyRevocationStore::connect(
                url,
                config.revocation_key_prefix.clone(),
                config.revocation_ttl,
            )
            .await
            .context("failed to connect revocation store")?;
            tracing::info!(prefix = %config.revocation_key_prefix, "using valkey revocation store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("REDIS_URL not set; revocations are process-local");
            Arc::new(InMemoryRevocationStore::new())
        }
    };

    let users: Arc<dyn UserResolver> = match &config.database_url {
        Some(url) => {
            let db = sqlx::PgPool::connect(url)
                .await
                .context("failed to connect database")?;
            Arc::new(PgUserResolver::new(db))
        }
        None => Arc::new(SubjectUserResolver),
    };

    let validator = Arc::new(BearerTokenValidator::new(Arc::new(key), revocation.clone()));
    let auth = BearerAuth::new(validator).require_scopes(config.required_scopes.clone());

    Ok((AppState::new(revocation, users), auth))
}

fn build_router(state: AppState, auth: BearerAuth, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(auth))
        .with_state(state);

    middleware::http::apply(router, config.request_timeout)
}
