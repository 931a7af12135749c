use clap::{Parser, Subcommand};

mod commands;
mod feed;

#[derive(Parser)]
#[command(name = "resetbell", version, about = "Resetbell CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reward fulfillment projection
    Project(commands::project::ProjectArgs),
    /// Expiry alert management
    Alert {
        #[command(subcommand)]
        action: commands::alert::AlertAction,
    },
    /// Event snapshot inspection
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Run the alert scheduler until interrupted
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Project(args) => commands::project::run(args),
        Commands::Alert { action } => commands::alert::run(action).await,
        Commands::Events { action } => commands::events::run(action).await,
        Commands::Serve(args) => commands::serve::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
