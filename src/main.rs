// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prepaid_ledger::{handle, init_logging, load_snapshot, Config, LedgerSource};

/// Prepaid balance viewer for a ledger sheet
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal viewer (default)
    Tui,
    /// Print the balance and history of one store
    Show {
        /// Store to show (default: first store in the sheet)
        #[arg(long)]
        store: Option<String>,
    },
    /// List stores in the order they first appear
    Stores,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);

    // Log lines would draw over the alternate screen
    init_logging(if matches!(command, Command::Tui) { "off" } else { "warn" });

    match command {
        Command::Tui => run_ui_mode(&cli.config)?,
        Command::Show { store } => run_show(&cli.config, store.as_deref()),
        Command::Stores => run_stores(&cli.config)?,
    }

    Ok(())
}

fn run_show(config: &Config, store: Option<&str>) {
    let source = config.open_source();
    let page = handle(&source, &config.settings(), store);

    print!("{}", page);
    if page.is_failure() {
        std::process::exit(1);
    }
}

fn run_stores(config: &Config) -> Result<()> {
    let source = config.open_source();
    let snapshot = load_snapshot(&source, &config.settings())?;

    for store in snapshot.counterparties() {
        println!("{}", store);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let source = config.open_source();
    println!("🖥️  Loading ledger from {} ...", source.describe());

    let mut app = ui::App::new(Box::new(source), config.settings());
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a page with: prepaid-ledger show --store <NAME>");
    std::process::exit(1);
}
