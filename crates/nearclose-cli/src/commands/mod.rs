mod check;
mod export;
mod serve;

use std::sync::Arc;
use std::time::Duration;

use nearclose_core::{
    FixtureAdapter, LookupConfig, LookupService, MarketDataSource, ProviderId, RetryConfig,
    UtcDateTime, ValidationError, YahooAdapter,
};

use crate::cli::{Cli, Command, SourceSelector};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let service = build_service(cli);
    tracing::debug!(
        source = %ProviderId::from(cli.source),
        timeout_ms = cli.timeout_ms,
        retries = cli.retries,
        "lookup service ready"
    );

    match &cli.command {
        Command::Check(args) => check::run(cli, args, &service).await,
        Command::Export(args) => export::run(cli, args, &service).await,
        Command::Serve(args) => serve::run(args, service).await,
    }
}

pub fn build_service(cli: &Cli) -> LookupService {
    let source: Arc<dyn MarketDataSource> = match cli.source {
        SourceSelector::Yahoo => Arc::new(YahooAdapter::default().with_timeout_ms(cli.timeout_ms)),
        SourceSelector::Fixture => Arc::new(FixtureAdapter::demo()),
    };

    let retry = if cli.retries == 0 {
        RetryConfig::no_retry()
    } else {
        RetryConfig {
            max_retries: cli.retries,
            ..RetryConfig::default()
        }
    };

    LookupService::new(
        source,
        LookupConfig {
            request_timeout: Duration::from_millis(cli.timeout_ms),
            retry,
            ..LookupConfig::default()
        },
    )
}

/// The window end for this invocation; "now" is read once here.
fn resolve_as_of(cli: &Cli) -> Result<UtcDateTime, ValidationError> {
    match cli.as_of.as_deref() {
        Some(value) => UtcDateTime::parse(value),
        None => Ok(UtcDateTime::now()),
    }
}
