//! List command - print the repositories of a registry matching a filter

use console::style;
use repolist::RepoList;

use super::{ConfigArgs, CredentialArgs};
use crate::error::{CliError, Result};

pub async fn run(
    registry: &str,
    filter: &str,
    credentials: &CredentialArgs,
    config: &ConfigArgs,
    json: bool,
) -> Result<()> {
    let config = config.load()?;
    let creds = credentials.resolve(registry)?;

    let mut list = RepoList::new(registry, filter, creds, &config)?;
    tracing::debug!("Using {} source for {}", list.source_kind(), registry);

    let repos = list.get().await?.to_vec();

    if json {
        let out = serde_json::to_string_pretty(&repos)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for repo in &repos {
        println!("{}", repo);
    }
    eprintln!(
        "{} {} matching {} in {}",
        style("✓").green().bold(),
        pluralize(repos.len(), "repository", "repositories"),
        style(list.filter().as_str()).dim(),
        style(registry).cyan()
    );

    Ok(())
}

fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
