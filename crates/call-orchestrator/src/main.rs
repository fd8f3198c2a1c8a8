use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use leadbridge_call_orchestrator::service::START_CALL;
use leadbridge_call_orchestrator::{
    CallGatingOrchestrator, CallOrchestratorConfig, HttpTelephonyClient, StartCallMethod,
};
use leadbridge_infra_common::bus::{register_if_configured, BusServer};
use leadbridge_infra_common::logging::{log_welcome, setup_logging, LogContext};
use tracing::info;

/// Bus service placing outbound calls for new leads
#[derive(Debug, Parser)]
#[command(name = "call-orchestrator", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CALL_ORCHESTRATOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = CallOrchestratorConfig::load(args.config.as_deref())?;

    let _log_guard = setup_logging(config.log.to_logging_config(&config.service.name)?)?;
    log_welcome(&config.service.name, env!("CARGO_PKG_VERSION"));

    let telephony = HttpTelephonyClient::new(config.telephony.url.clone());
    info!(
        "Telephony endpoint {} (on status failure: {:?}, serialized: {})",
        telephony.url(),
        config.telephony.status_failure_policy,
        config.telephony.serialize_calls
    );

    let orchestrator = Arc::new(
        CallGatingOrchestrator::new(
            Arc::new(telephony),
            LogContext::new(config.service.name.clone())
                .with_field("telephony", config.telephony.url.clone()),
        )
            .with_policy(config.telephony.status_failure_policy)
            .with_serialized_calls(config.telephony.serialize_calls),
    );

    let mut server = BusServer::new(config.service.name.clone(), config.service.bind_addr()?);
    server.register_method(START_CALL, Arc::new(StartCallMethod::new(orchestrator)));

    register_if_configured(config.registry.url.as_deref(), &server.descriptor()).await;

    server.serve().await?;
    Ok(())
}
