use crate::demo::{run_batch, run_decide, run_demo, BatchArgs, DecideArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Underwriting Orchestrator",
    about = "Demonstrate and run the automated auto-loan underwriting service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Underwrite applications directly from local files
    Underwrite {
        #[command(subcommand)]
        command: UnderwriteCommand,
    },
    /// Run a CLI demo covering the full decision spectrum
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum UnderwriteCommand {
    /// Decide a single application supplied as a JSON file
    Decide(DecideArgs),
    /// Decide every applicant in a CSV roster
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Underwrite {
            command: UnderwriteCommand::Decide(args),
        } => run_decide(args),
        Command::Underwrite {
            command: UnderwriteCommand::Batch(args),
        } => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}
