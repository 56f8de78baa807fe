// # ddns-hookd - DDNS Hook Daemon
//
// A thin HTTP layer over `ddns-hook-core`. Clients (routers, scripts, cron
// jobs) call it with their provider token, zone, subdomain labels and
// current addresses; the hook brings the zone's A/AAAA records in line.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the DNS provider factory and the request orchestrator
// 4. Serving HTTP until SIGTERM/SIGINT
//
// All reconciliation logic lives in ddns-hook-core.
//
// ## Configuration
//
// - `DDNS_HOOK_LISTEN_ADDR`: Socket address to bind (default `0.0.0.0:8070`)
// - `DDNS_HOOK_REQUEST_TIMEOUT_SECS`: Deadline per update request (1-600, default 30)
// - `DDNS_HOOK_PROXIED`: Create records with Cloudflare proxying (default `true`)
// - `DDNS_HOOK_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
// - `DDNS_HOOK_CLOUDFLARE_API_BASE`: Override the Cloudflare API URL
// - `DDNS_MODE`: Set to `dry-run` to log record writes instead of sending them
//
// ## Example
//
// ```bash
// export DDNS_HOOK_LISTEN_ADDR=127.0.0.1:8070
// export DDNS_HOOK_LOG_LEVEL=debug
//
// ddns-hookd
//
// curl 'http://127.0.0.1:8070/?token=...&zone=example.com&records=www,vpn&ipv4=203.0.113.7'
// ```

mod router;

use anyhow::{Context, Result};
use ddns_hook_core::traits::DnsProviderFactory;
use ddns_hook_core::{HookConfig, UpdateOrchestrator};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8070";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    listen_addr: SocketAddr,
    request_timeout_secs: u64,
    proxied: bool,
    log_level: String,
    cloudflare_api_base: Option<String>,
    dry_run: bool,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr = lookup("DDNS_HOOK_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr.parse().with_context(|| {
            format!(
                "DDNS_HOOK_LISTEN_ADDR must be a socket address like {}. Got: {}",
                DEFAULT_LISTEN_ADDR, listen_addr
            )
        })?;

        let request_timeout_secs = match lookup("DDNS_HOOK_REQUEST_TIMEOUT_SECS") {
            Some(value) => value.parse().with_context(|| {
                format!(
                    "DDNS_HOOK_REQUEST_TIMEOUT_SECS must be a number of seconds. Got: {}",
                    value
                )
            })?,
            None => HookConfig::default().request_timeout_secs,
        };

        let proxied = match lookup("DDNS_HOOK_PROXIED") {
            Some(value) => value.parse().with_context(|| {
                format!("DDNS_HOOK_PROXIED must be true or false. Got: {}", value)
            })?,
            None => HookConfig::default().proxied,
        };

        Ok(Self {
            listen_addr,
            request_timeout_secs,
            proxied,
            log_level: lookup("DDNS_HOOK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cloudflare_api_base: lookup("DDNS_HOOK_CLOUDFLARE_API_BASE"),
            dry_run: lookup("DDNS_MODE").is_some_and(|mode| mode == "dry-run"),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !(1..=600).contains(&self.request_timeout_secs) {
            anyhow::bail!(
                "DDNS_HOOK_REQUEST_TIMEOUT_SECS must be between 1 and 600 seconds. Got: {}",
                self.request_timeout_secs
            );
        }

        if let Some(ref url) = self.cloudflare_api_base {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!(
                    "DDNS_HOOK_CLOUDFLARE_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                    url
                );
            }

            if url.starts_with("http://") {
                eprintln!(
                    "WARNING: DDNS_HOOK_CLOUDFLARE_API_BASE uses HTTP (not HTTPS). \
                     API tokens will be sent unencrypted."
                );
            }
        }

        self.tracing_level()?;

        Ok(())
    }

    fn tracing_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_HOOK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn hook_config(&self) -> HookConfig {
        HookConfig::new()
            .with_request_timeout_secs(self.request_timeout_secs)
            .with_proxied(self.proxied)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return HookExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.tracing_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    info!("Starting ddns-hookd");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            HookExitCode::RuntimeError
        } else {
            HookExitCode::CleanShutdown
        }
    });

    result.into()
}

#[cfg(feature = "cloudflare")]
fn provider_factory(config: &Config) -> Result<Arc<dyn DnsProviderFactory>> {
    use ddns_hook_cloudflare::{CLOUDFLARE_API_BASE, CloudflareFactory, CloudflareOptions};

    info!("Using Cloudflare provider");
    let options = CloudflareOptions {
        api_base: config
            .cloudflare_api_base
            .clone()
            .unwrap_or_else(|| CLOUDFLARE_API_BASE.to_string()),
        dry_run: config.dry_run,
    };
    Ok(Arc::new(CloudflareFactory::new(options)))
}

#[cfg(not(feature = "cloudflare"))]
fn provider_factory(_config: &Config) -> Result<Arc<dyn DnsProviderFactory>> {
    anyhow::bail!("ddns-hookd was built without a DNS provider; enable the `cloudflare` feature")
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let hook_config = config.hook_config();
    hook_config.validate()?;

    let orchestrator = UpdateOrchestrator::new(provider_factory(&config)?, &hook_config);

    let shutdown = CancellationToken::new();
    let app = router::build_router(orchestrator, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!(
        "Listening on {} (request timeout {}s, proxied {})",
        config.listen_addr, hook_config.request_timeout_secs, hook_config.proxied
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => warn!("Shutdown signal handling failed: {}", e),
            }
            // In-flight updates end with "request cancelled"
            shutdown.cancel();
        })
        .await
        .context("HTTP server error")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
