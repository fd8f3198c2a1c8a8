use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use leadbridge_crm_connector::service::PUSH_TO_CRM;
use leadbridge_crm_connector::{CrmConnectorConfig, EspoCrmClient, LeadUpsertOrchestrator, PushToCrmMethod};
use leadbridge_infra_common::bus::{registry::register_if_configured, BusServer};
use leadbridge_infra_common::logging::{log_welcome, setup_logging, LogContext};

/// Bus service pushing leads into EspoCRM
#[derive(Debug, Parser)]
#[command(name = "crm-connector", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CRM_CONNECTOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = CrmConnectorConfig::load(args.config.as_deref())?;

    let _log_guard = setup_logging(config.log.to_logging_config(&config.service.name)?)?;
    log_welcome(&config.service.name, env!("CARGO_PKG_VERSION"));

    let client = EspoCrmClient::new(config.crm.base_url.clone(), config.crm.api_key.clone());
    let orchestrator = Arc::new(LeadUpsertOrchestrator::new(
        Arc::new(client),
        LogContext::new(config.service.name.clone()).with_field("crm", config.crm.base_url.clone()),
    ));

    let mut server = BusServer::new(config.service.name.clone(), config.service.bind_addr()?);
    server.register_method(PUSH_TO_CRM, Arc::new(PushToCrmMethod::new(orchestrator)));

    register_if_configured(config.registry.url.as_deref(), &server.descriptor()).await;

    server.serve().await?;
    Ok(())
}
