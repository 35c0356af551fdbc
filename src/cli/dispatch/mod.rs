use crate::cli::actions::{generate, server, Action};
use anyhow::{anyhow, Context, Result};

/// Turn parsed arguments into an [`Action`].
/// # Errors
/// Returns an error if required arguments are missing or a credential is malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", sub_m)) => {
            let credentials = sub_m
                .get_many::<String>("credential")
                .unwrap_or_default()
                .map(|value| server::parse_credential(value))
                .collect::<Result<Vec<_>>>()?;

            Ok(Action::Server(server::Args {
                port: sub_m.get_one::<u16>("port").copied().unwrap_or(8080),
                realm: sub_m
                    .get_one::<String>("realm")
                    .cloned()
                    .context("missing required argument: --realm")?,
                entropy: entropy(sub_m)?,
                query_param: sub_m.get_one::<String>("query-param").cloned(),
                credentials,
            }))
        }
        Some(("generate", sub_m)) => Ok(Action::Generate(generate::Args {
            entropy: entropy(sub_m)?,
            count: sub_m.get_one::<u16>("count").copied().unwrap_or(1),
        })),
        _ => Err(anyhow!("missing subcommand")),
    }
}

fn entropy(matches: &clap::ArgMatches) -> Result<usize> {
    matches
        .get_one::<usize>("entropy")
        .copied()
        .context("missing required argument: --entropy")
}
