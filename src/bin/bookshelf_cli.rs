//! Simple CLI for editing a book file offline.
//!
//! Usage:
//!   bookshelf_cli <book_path> list
//!   bookshelf_cli <book_path> count
//!   bookshelf_cli <book_path> insert <text> [--position N]
//!   bookshelf_cli <book_path> update <id> <text>
//!   bookshelf_cli <book_path> delete <id>
//!   bookshelf_cli <book_path> reset
//!
//! A missing book file starts from the default seed. Mutating commands
//! store the book when they succeed.

use anyhow::Result;
use bookshelf::{default_seed, Book, BookError, Bookshelf, Config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit a bookshelf book file", long_about = None)]
struct Cli {
    /// Path to the book file
    book_path: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every page with its index
    List,
    /// Print the number of pages
    Count,
    /// Insert a page, appending when no position is given
    Insert {
        text: String,
        #[arg(short, long, allow_negative_numbers = true)]
        position: Option<i64>,
    },
    /// Replace the text of a page
    Update { id: usize, text: String },
    /// Remove a page
    Delete { id: usize },
    /// Discard every page and start over from the default seed
    Reset,
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let shelf = Bookshelf::open(Config::new(&cli.book_path))?;
    let store = shelf.store();

    let outcome = match cli.command {
        Command::List => {
            let book = Book::from(store.read_all()?);
            if book.is_empty() {
                println!("(no pages)");
            }
            for (index, page) in book.pages.iter().enumerate() {
                println!("{}: {}", index, page);
            }
            return Ok(());
        }
        Command::Count => {
            println!("{}", store.len()?);
            return Ok(());
        }
        Command::Insert { text, position } => store
            .insert(position, text)
            .map(|pos| format!("page {} inserted successfully.", pos)),
        Command::Update { id, text } => store
            .update_at(id, text)
            .map(|()| format!("page {} updated successfully.", id)),
        Command::Delete { id } => store
            .delete_at(id)
            .map(|_| format!("page {} deleted successfully.", id)),
        Command::Reset => store
            .replace(default_seed())
            .map(|old| format!("book reset, {} pages discarded.", old.len())),
    };

    match outcome {
        Ok(message) => {
            shelf.close()?;
            println!("{}", message);
            Ok(())
        }
        Err(e @ (BookError::OutOfRange { .. } | BookError::NotFound { .. })) => {
            eprintln!("ERROR: {}", e);
            exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
