use clap::{CommandFactory, Parser};
use probe_lib::core::logger::Logger;

mod client;
mod commands;
mod core;

use commands::Commands;
use core::exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "probe")]
#[command(about = "Run API test suites against stored request collections.")]
#[command(version = crate::core::version::app_version())]
struct Args {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        let exit_code = ExitCode::from(&e);
        std::process::exit(exit_code.code());
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    Logger::init(args.debug);

    match args.command {
        Some(Commands::Suite(suite_command)) => match suite_command.command {
            commands::suite::SuiteSubcommand::List(list_args) => {
                commands::suite::execute_list(&list_args)
            }
            commands::suite::SuiteSubcommand::Show(show_args) => {
                commands::suite::execute_show(&show_args)
            }
            commands::suite::SuiteSubcommand::Run(run_args) => {
                commands::suite::execute_run(&run_args).await
            }
        },
        Some(Commands::Env(env_command)) => match env_command.command {
            commands::env::EnvSubcommand::List(list_args) => commands::env::execute_list(&list_args),
        },
        Some(Commands::Auth(auth_command)) => match auth_command.command {
            commands::auth::AuthSubcommand::List(list_args) => {
                commands::auth::execute_list(&list_args)
            }
        },
        None => {
            Args::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
