use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "capsule", version, about = "Capsule CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal a new capsule
    Seal(commands::seal::SealArgs),
    /// List capsules
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show access state and countdown for a capsule
    Status {
        /// Capsule id
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the reveal sequence for a capsule
    Open(commands::open::OpenArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Seal(args) => commands::seal::run(args),
        Commands::List { json } => commands::list::run(json),
        Commands::Status { id, json } => commands::status::run(&id, json),
        Commands::Open(args) => commands::open::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
