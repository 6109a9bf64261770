//! Ping command - check that the listing source accepts the credentials

use console::style;
use repolist::RepoList;

use super::{ConfigArgs, CredentialArgs};
use crate::error::Result;

pub async fn run(registry: &str, credentials: &CredentialArgs, config: &ConfigArgs) -> Result<()> {
    let config = config.load()?;
    let creds = credentials.resolve(registry)?;

    let list = RepoList::new(registry, ".*", creds, &config)?;
    list.ping().await?;

    println!(
        "{} Credentials accepted by {} ({} API)",
        style("✓").green().bold(),
        style(registry).cyan(),
        list.source_kind()
    );
    Ok(())
}
