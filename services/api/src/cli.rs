use crate::demo::{run_demo, run_reward, DemoArgs, RewardArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lingua_mastery::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lingua Mastery",
    about = "Run the language-learning mastery engine or explore it from the command line",
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
    /// Walk a fresh learner through lessons, reviews and badge unlocks
    Demo(DemoArgs),
    /// Print the coins, XP and progress earned by one quiz result
    Reward(RewardArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Reward(args) => run_reward(args),
    }
}
