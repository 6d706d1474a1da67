mod app;
mod catalog;
mod config;
mod draw;
mod migrate;
mod store;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::Config;
use draw::{DrawError, DrawFilter};
use store::OrderStore;

#[derive(Parser, Debug)]
#[command(name = "index-orders")]
#[command(about = "Keep a deck of tabletop order prompts and draw one at random")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long)]
    config: Option<String>,

    /// Orders file (overrides `orders_file` from the config)
    #[arg(long)]
    orders: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all orders, grouped by category
    List {
        /// Only this category
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Add an order to a category
    Add {
        category: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Remove orders from a category (first match of each; quote each order)
    Remove {
        category: String,
        #[arg(required = true, num_args = 1..)]
        orders: Vec<String>,
    },
    /// Draw one order at random
    Draw {
        /// Only draw from this category
        #[arg(long, short)]
        category: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none());

    let config_path = cli
        .config
        .unwrap_or_else(|| Config::default_path().to_string_lossy().into_owned());
    let config = Config::load(&config_path)?;

    let orders_path = cli.orders.unwrap_or_else(|| config.orders_path());
    let mut store = OrderStore::open(orders_path)?;

    match cli.command {
        None => run_tui(store, config).map(|_| ExitCode::SUCCESS),
        Some(command) => run_command(&mut store, command),
    }
}

/// Log to stderr for one-shot commands; to a file for the TUI, since stderr
/// output would tear the alternate screen
fn init_logging(interactive: bool) {
    let (writer, default_filter) = if interactive {
        let writer = match open_log_file() {
            Some(file) => BoxMakeWriter::new(Mutex::new(file)),
            None => BoxMakeWriter::new(io::sink),
        };
        (writer, "index_orders=info")
    } else {
        (BoxMakeWriter::new(io::stderr), "index_orders=warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(!interactive),
        )
        .init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::data_dir()?.join("index-orders");
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("index-orders.log"))
        .ok()
}

fn run_command(store: &mut OrderStore, command: Command) -> Result<ExitCode> {
    match command {
        Command::List { category } => {
            if let Some(ref name) = category {
                if !store.catalog().contains_category(name) {
                    println!("No category named {} in {}", name, store.path().display());
                    return Ok(ExitCode::FAILURE);
                }
            }
            for (name, prompts) in store.catalog().iter() {
                if category.as_deref().is_some_and(|c| c != name) {
                    continue;
                }
                println!("{} ({})", name, prompts.len());
                for prompt in prompts {
                    println!("  - {}", prompt);
                }
            }
        }
        Command::Add { category, text } => {
            if store.add(&category, &text.join(" "))? {
                println!("Added to {}", category);
            } else {
                println!("Nothing to add: order text is empty");
            }
        }
        Command::Remove { category, orders } => {
            let removed =
                store.remove_many(orders.iter().map(|text| (category.as_str(), text.as_str())))?;
            println!("Removed {} of {} from {}", removed, orders.len(), category);
        }
        Command::Draw { category } => {
            let filter = DrawFilter::from_option(category);
            match draw::draw(store.catalog(), &filter, &mut rand::rng()) {
                Ok(text) => println!("{}", text),
                Err(DrawError::EmptyPool { filter }) => {
                    eprintln!("Empty deck: there are no {} orders. Add some first.", filter);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_tui(store: OrderStore, config: Config) -> Result<()> {
    let theme = config.resolve_theme();
    let mut app = App::new(store, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app, &theme);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    theme: &ui::theme::Theme,
) -> Result<()> {
    while !app.should_exit() {
        terminal.draw(|f| ui::draw(f, app, theme))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key)?;
            }
        }
    }
    tracing::info!("Exiting with {} orders", app.store().total());
    Ok(())
}
