pub mod auth;
pub mod env;
pub mod shared;
pub mod suite;
pub mod validators;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    Suite(suite::SuiteCommand),
    Env(env::EnvCommand),
    Auth(auth::AuthCommand),
}
