use anyhow::{Result, anyhow};
use tokio::signal;
use tracing::{error, info};

use webhook_registrar::client_tls::ClientTlsConfig;
use webhook_registrar::config::{Action, Config};
use webhook_registrar::{WebhookRegistrar, cli};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    webhook_registrar::tracing::setup_tracing(
        &config.log_level,
        &config.log_fmt,
        config.log_no_color,
    )?;

    let client = kube::Client::try_default()
        .await
        .map_err(|e| anyhow!("cannot connect to Kubernetes cluster: {e}"))?;
    let client_tls = ClientTlsConfig::infer()
        .map_err(|e| anyhow!("cannot read client TLS configuration: {e}"))?;
    let registrar = WebhookRegistrar::new(client, config.registrar_config(client_tls));
    info!(
        debug_mode = registrar.mode().is_debug(),
        namespace = config.settings.namespace.as_str(),
        "webhook registrar initialized"
    );

    match config.action {
        Action::Register => register(&registrar).await,
        Action::Deregister => {
            deregister(&registrar).await;
            Ok(())
        }
        Action::Run => {
            register(&registrar).await?;
            shutdown_signal().await;
            info!("shutdown signal received");
            deregister(&registrar).await;
            Ok(())
        }
    }
}

async fn register(registrar: &WebhookRegistrar) -> Result<()> {
    info!(status = "init", "webhook registration");
    registrar.register().await.map_err(|e| {
        error!(error = e.to_string().as_str(), "webhook registration failed");
        anyhow!("cannot register webhooks: {e}")
    })?;
    info!(status = "done", "webhook registration");
    Ok(())
}

async fn deregister(registrar: &WebhookRegistrar) {
    info!(status = "init", "webhook deregistration");
    let errors = registrar.deregister().await;
    info!(status = "done", errors = errors.len(), "webhook deregistration");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = e.to_string().as_str(), "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = e.to_string().as_str(), "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
