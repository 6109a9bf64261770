//! CLI command implementations

pub mod list;
pub mod ping;

use clap::Args;
use repolist::{AuthMode, CredentialSource, Credentials, ListConfig, RegistryAddress};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{CliError, Result};

/// Where credentials come from
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Registry username
    #[arg(short, long, env = "REPOLIST_USERNAME")]
    pub username: Option<String>,

    /// Registry password or token
    #[arg(short, long, env = "REPOLIST_PASSWORD", hide_env_values = true, conflicts_with = "password_env")]
    pub password: Option<String>,

    /// Read the password from this environment variable
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,

    /// Use credentials from Docker's config.json (optionally at PATH)
    ///
    /// Takes precedence over --username and --password, including values
    /// picked up from REPOLIST_USERNAME and REPOLIST_PASSWORD.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub docker_config: Option<Option<PathBuf>>,
}

impl CredentialArgs {
    fn source(&self) -> Result<CredentialSource> {
        // an explicit --docker-config wins over username/password from env
        if let Some(path) = &self.docker_config {
            return Ok(CredentialSource::DockerConfig { path: path.clone() });
        }

        let password = match (&self.password, &self.password_env) {
            (Some(p), _) => Some(p.clone()),
            (None, Some(var)) => Some(std::env::var(var).map_err(|_| {
                CliError::usage(format!("Environment variable {} is not set", var))
            })?),
            (None, None) => None,
        };

        match (&self.username, password) {
            (Some(user), Some(pass)) => Ok(CredentialSource::basic(user, pass)),
            (Some(user), None) => Ok(CredentialSource::basic(user, "")),
            (None, Some(_)) => Err(CliError::usage("A password was given without --username")),
            (None, None) => Ok(CredentialSource::Anonymous),
        }
    }

    /// Resolve to live credentials for the registry
    pub fn resolve(&self, registry: &str) -> Result<Arc<Credentials>> {
        let host = RegistryAddress::parse(registry).host().to_string();
        let creds = self.source()?.resolve(&host)?;
        Ok(Arc::new(creds))
    }
}

/// Listing tunables that can be set from the command line
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file (default: ~/.config/repolist/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog authentication scheme (basic or bearer)
    #[arg(long, value_name = "MODE")]
    pub auth: Option<AuthMode>,

    /// Number of entries requested from the catalog API
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl ConfigArgs {
    /// Load the config file and apply command line overrides
    pub fn load(&self) -> Result<ListConfig> {
        let mut config = match &self.config {
            Some(path) => ListConfig::load_from(path)?,
            None => ListConfig::load()?,
        };
        if let Some(mode) = self.auth {
            config = config.with_auth_mode(mode);
        }
        if let Some(page_size) = self.page_size {
            config = config.with_page_size(page_size);
        }
        config.validate()?;
        Ok(config)
    }
}
