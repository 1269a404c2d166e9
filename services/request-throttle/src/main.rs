// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request Throttle Service
//!
//! Answers "may this attempt proceed?" for four operation categories:
//!
//! - auth: 5 attempts / 15 min, 30 min block, doubling
//! - api: 100 attempts / 1 min, 5 min block
//! - upload: 10 attempts / 1 min, 10 min block
//! - sensitive: 5 attempts / 1 min, 60 min block, tripling
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `SWEEP_INTERVAL_SECS`: Cleanup interval (default: 300)
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)
//! - `<KIND>_WINDOW_MS`, `<KIND>_MAX_ATTEMPTS`, `<KIND>_BLOCK_DURATION_MS`,
//!   `<KIND>_PROGRESSIVE_MULTIPLIER`, `<KIND>_MAX_BLOCK_DURATION_MS` where
//!   `<KIND>` is one of `AUTH`, `API`, `UPLOAD`, `SENSITIVE`

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use request_throttle::{
    config::{Config, RateLimitConfig},
    handlers::{router, AppState},
    metrics::Metrics,
    registry::LimiterRegistry,
    sweeper::Sweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = load_config();
    for (name, limiter) in [
        ("auth", &config.limiters.auth),
        ("api", &config.limiters.api),
        ("upload", &config.limiters.upload),
        ("sensitive", &config.limiters.sensitive),
    ] {
        info!(
            limiter = name,
            window_ms = limiter.window_ms,
            max_attempts = limiter.max_attempts,
            block_duration_ms = limiter.block_duration_ms,
            progressive_multiplier = limiter.progressive_multiplier,
            "Limiter configured"
        );
    }

    // Invalid limits or sweep interval are fatal at startup.
    config.validate()?;
    let limiters = Arc::new(LimiterRegistry::new(config.limiters.clone())?);
    let metrics = Arc::new(Metrics::new()?);

    let sweeper = Sweeper::new(limiters.clone(), config.sweep_interval())?
        .with_metrics(metrics.clone())
        .spawn();

    let state = Arc::new(AppState {
        limiters,
        metrics,
        config: config.clone(),
    });
    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Request throttle listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Request throttle stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let defaults = Config::default();
    let metrics_enabled = env_or("METRICS_ENABLED", defaults.metrics.enabled);

    let mut config = Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs),
        ..Default::default()
    };
    config.metrics.enabled = metrics_enabled;

    let limiters = &mut config.limiters;
    limiters.auth = limiter_from_env("AUTH", RateLimitConfig::auth());
    limiters.api = limiter_from_env("API", RateLimitConfig::api());
    limiters.upload = limiter_from_env("UPLOAD", RateLimitConfig::upload());
    limiters.sensitive = limiter_from_env("SENSITIVE", RateLimitConfig::sensitive());
    config
}

fn limiter_from_env(prefix: &str, defaults: RateLimitConfig) -> RateLimitConfig {
    let var = |field: &str| format!("{}_{}", prefix, field);
    RateLimitConfig {
        window_ms: env_or(&var("WINDOW_MS"), defaults.window_ms),
        max_attempts: env_or(&var("MAX_ATTEMPTS"), defaults.max_attempts),
        block_duration_ms: env_or(&var("BLOCK_DURATION_MS"), defaults.block_duration_ms),
        progressive_multiplier: env_or(
            &var("PROGRESSIVE_MULTIPLIER"),
            defaults.progressive_multiplier,
        ),
        max_block_duration_ms: env_or(
            &var("MAX_BLOCK_DURATION_MS"),
            defaults.max_block_duration_ms,
        ),
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
