use anyhow::{Result, anyhow};
use clap::ArgMatches;
use std::path::Path;

use crate::client_tls::ClientTlsConfig;
use crate::registration::RegistrarConfig;
use crate::settings::{WebhookSettings, read_settings_file};

/// What the binary has been asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Deregister,
    /// Register at startup, deregister on shutdown
    Run,
}

pub struct Config {
    pub action: Action,
    pub settings: WebhookSettings,
    pub server_address: Option<String>,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        // global arguments are propagated down to the subcommand
        let (action, matches) = match matches.subcommand() {
            Some(("register", sub)) => (Action::Register, sub),
            Some(("deregister", sub)) => (Action::Deregister, sub),
            Some(("run", sub)) => (Action::Run, sub),
            Some((other, _)) => return Err(anyhow!("unknown subcommand: {other}")),
            None => return Err(anyhow!("a subcommand is required")),
        };

        let mut settings = settings(matches)?;
        if let Some(namespace) = matches.get_one::<String>("namespace") {
            settings.namespace = namespace.to_owned();
        }
        let server_address = matches.get_one::<String>("server-ip").cloned();

        let log_level = matches
            .get_one::<String>("log-level")
            .ok_or_else(|| anyhow!("log-level has no value"))?
            .to_owned();
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .ok_or_else(|| anyhow!("log-fmt has no value"))?
            .to_owned();
        let log_no_color = matches.get_flag("log-no-color");

        Ok(Self {
            action,
            settings,
            server_address,
            log_level,
            log_fmt,
            log_no_color,
        })
    }

    pub fn registrar_config(&self, client_tls: ClientTlsConfig) -> RegistrarConfig {
        RegistrarConfig {
            settings: self.settings.clone(),
            client_tls,
            server_address: self.server_address.clone(),
        }
    }
}

fn settings(matches: &ArgMatches) -> Result<WebhookSettings> {
    match matches.get_one::<String>("settings") {
        None => Ok(WebhookSettings::default()),
        Some(path) => {
            let settings_file = Path::new(path);
            read_settings_file(settings_file).map_err(|e| {
                anyhow!(
                    "error while loading settings from {:?}: {}",
                    settings_file,
                    e
                )
            })
        }
    }
}
