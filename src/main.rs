mod cli;
mod db;
mod decrypt;
mod error;
mod fmt;
mod importer;
mod logging;
mod models;
mod normalizer;
mod reports;
mod session;
mod settings;
mod store;

use clap::Parser;

use cli::{
    CategoriesCommands, Cli, Commands, ExportCommands, ReportCommands, TransactionsCommands,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, user } => cli::init::run(data_dir, user),
        Commands::Import {
            file,
            password,
            user,
            dry_run,
        } => cli::import::run(&file, password, user.as_deref(), dry_run),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { month } => cli::transactions::list(month),
        },
        Commands::Report { command } => match command {
            ReportCommands::Monthly { month } => cli::report::monthly(&month),
        },
        Commands::Export { command } => match command {
            ExportCommands::Monthly { month, output } => {
                cli::export::monthly(&month, output).map(|_| ())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
