use crate::commands::validators;
use crate::core::formatter::OutputFormat;
use clap::Args;

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(
        short = 'o',
        long = "output",
        help = "Output format: text or json",
        default_value_t = OutputFormat::Text,
        value_enum,
        ignore_case = true
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    #[arg(
        short = 's',
        long = "source",
        default_value = ".",
        help = "Path to the workspace directory",
        value_parser = validators::validate_path_exists
    )]
    pub source: String,
}

#[derive(Debug, Args)]
pub struct SuiteNameArgs {
    #[arg(
        short = 'n',
        long = "name",
        help = "Suite id or name",
        value_parser = validators::validate_name
    )]
    pub name: String,
}
