// Bookshelf - Book Catalog Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{Context, Result};
use bookshelf_core::catalog::{BookCatalogQuery, SearchOptions};
use bookshelf_core::storage::models::{
    NewAuthor, NewBook, NewBookFormatType, NewBookReview, NewPublisher,
};
use bookshelf_core::storage::{queries, Database};
use bookshelf_core::{init_logging, CatalogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookshelf-cli")]
#[command(about = "Bookshelf CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Database file (overrides BOOKSHELF_DATABASE_PATH)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and check its integrity
    Init,
    /// Add an author
    AddAuthor {
        first_name: String,
        last_name: String,
    },
    /// Add a publisher
    AddPublisher { name: String },
    /// Add a format type
    AddFormat {
        name: String,
        /// Tangible format (hardcover, paperback)
        #[arg(long)]
        physical: bool,
    },
    /// Add a book
    AddBook {
        title: String,
        #[arg(long)]
        publisher: i64,
        #[arg(long)]
        author: i64,
    },
    /// List books in creation order
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// List format types
    Formats,
    /// Make a book available in a format
    LinkFormat { book: i64, format: i64 },
    /// Review a book
    Review { book: i64, rating: i64 },
    /// Delete a book with its reviews and format links
    Delete { book: i64 },
    /// Show a book with its derived values
    Show { book: i64 },
    /// Search the catalog
    Search {
        query: String,
        #[arg(long)]
        title_only: bool,
        /// Only books available in this format type
        #[arg(long)]
        format: Option<i64>,
        /// Only books available in a physical format
        #[arg(long)]
        physical: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CatalogConfig::from_env().context("Failed to read configuration")?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    init_logging(&config.log_filter)?;

    let db = Database::with_config(&config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let pool = db.pool().clone();
    let catalog = BookCatalogQuery::new(db);

    match cli.command {
        Commands::Init => {
            let ok = catalog.store().check_integrity().await?;
            println!(
                "Catalog at {}: {}",
                config.database_path.display(),
                if ok { "ok" } else { "integrity check failed" }
            );
        }
        Commands::AddAuthor {
            first_name,
            last_name,
        } => {
            let id = queries::insert_author(&pool, &NewAuthor::new(first_name, last_name)).await?;
            println!("Author {}", id);
        }
        Commands::AddPublisher { name } => {
            let id = queries::insert_publisher(&pool, &NewPublisher::new(name)).await?;
            println!("Publisher {}", id);
        }
        Commands::AddFormat { name, physical } => {
            let id =
                queries::insert_book_format_type(&pool, &NewBookFormatType::new(name, physical))
                    .await?;
            println!("Format type {}", id);
        }
        Commands::AddBook {
            title,
            publisher,
            author,
        } => match catalog.create_book(&NewBook::new(title, publisher, author)).await {
            Ok(id) => println!("Book {}", id),
            Err(e) if e.is_validation_error() => {
                eprintln!("{}", e.user_message());
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::List { limit, offset } => {
            let books = queries::list_books(&pool, limit, offset).await?;
            let total = queries::count_books(&pool).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                for book in &books {
                    println!("{:>5}  {}", book.book_id, book.title);
                }
                println!("{} of {} books", books.len(), total);
            }
        }
        Commands::Formats => {
            let types = queries::list_book_format_types(&pool).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else {
                for format_type in types {
                    let kind = if format_type.physical { "physical" } else { "digital" };
                    println!("{:>5}  {} ({})", format_type.book_format_type_id, format_type.name, kind);
                }
            }
        }
        Commands::LinkFormat { book, format } => {
            let id = queries::add_book_format(&pool, book, format).await?;
            println!("Format link {}", id);
        }
        Commands::Review { book, rating } => {
            let id = queries::insert_book_review(&pool, &NewBookReview::new(book, rating)).await?;
            println!("Review {}", id);
        }
        Commands::Delete { book } => {
            queries::delete_book(&pool, book).await?;
            println!("Deleted book {}", book);
        }
        Commands::Show { book } => {
            let book = queries::find_book_by_id(&pool, book)
                .await?
                .with_context(|| format!("Book {} not found", book))?;
            let author = catalog.author_name(&book).await?;
            let publisher = catalog.publisher(&book).await?;
            let formats = catalog.format_types(&book).await?;
            let physical = catalog.physical_available(&book).await?;
            let rating = catalog.average_rating(&book).await?;

            if cli.json {
                let value = serde_json::json!({
                    "book": book,
                    "author_name": author,
                    "publisher": publisher,
                    "format_types": formats,
                    "physical_available": physical,
                    "average_rating": rating,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", book.title);
                println!("  Author:    {}", author);
                println!("  Publisher: {}", publisher.name);
                let names: Vec<&str> = formats.iter().map(|f| f.name.as_str()).collect();
                println!("  Formats:   {}", names.join(", "));
                println!("  Physical:  {}", if physical { "yes" } else { "no" });
                match rating {
                    Some(rating) => println!("  Rating:    {}", rating),
                    None => println!("  Rating:    no reviews yet"),
                }
            }
        }
        Commands::Search {
            query,
            title_only,
            format,
            physical,
        } => {
            let options = SearchOptions {
                title_only,
                book_format_type_id: format,
                book_format_physical: physical.then_some(true),
            };
            let hits = catalog.search(&query, &options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No books match '{}'", query);
            } else {
                for hit in hits {
                    let rating = hit
                        .average_rating
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:>5}  {:>4}  {}", hit.book.book_id, rating, hit.book.title);
                }
            }
        }
    }

    Ok(())
}
