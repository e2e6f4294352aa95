use crate::client::ProbeClient;
use crate::commands::shared::{OutputArgs, SourceArgs};
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Debug, Args)]
#[command(about = "Manage authentication")]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthSubcommand {
    #[command(about = "List auth configurations")]
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProbeClient::open(Path::new(&args.source.source))?;
    let auth_list = client.list_auths()?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(
            &auth_list,
            "Auth configurations found:",
            "No auth configurations found"
        )
    );

    Ok(())
}
