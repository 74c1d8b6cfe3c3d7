mod cmd;
mod tax;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookkeeper", version)]
#[command(about = "Estimate UK taxes for a one-person limited company")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Corporation Tax, Self Assessment, VAT and director loan estimates
    Dashboard(cmd::dashboard::DashboardCommand),
    /// Check the ledger and config for problems
    Validate(cmd::validate::ValidateCommand),
    /// Print the expected ledger and config formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Dashboard(dashboard) => dashboard.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
