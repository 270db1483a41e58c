//! Bookshelf - Entry point

use std::path::PathBuf;
use std::process::ExitCode;

use bookshelf::{BookshelfResult, ServeOptions};
use bookshelf_config::ServiceMode;
use bookshelf_server::Lifecycle;
use bookshelf_telemetry::{init_logging, LogConfig};
use tracing::{error, info};

/// What to run.
enum Command {
    /// Run the HTTP service.
    Serve(ServeOptions),
    /// Print the books served at a URL.
    Fetch(String),
}

impl Command {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1).peekable();
        match args.peek().map(String::as_str) {
            Some("fetch") => {
                args.next();
                match (args.next(), args.next()) {
                    (Some(url), None) => Self::Fetch(url),
                    _ => usage_error("fetch takes exactly one URL"),
                }
            }
            Some("serve") => {
                args.next();
                Self::Serve(parse_serve(args))
            }
            _ => Self::Serve(parse_serve(args)),
        }
    }
}

fn parse_serve(mut args: impl Iterator<Item = String>) -> ServeOptions {
    let mut options = ServeOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                options.config = Some(PathBuf::from(required(&arg, args.next())));
            }
            "--mode" | "-m" => {
                let value = required(&arg, args.next());
                match value.parse::<ServiceMode>() {
                    Ok(mode) => options.mode = Some(mode),
                    Err(e) => usage_error(&e),
                }
            }
            "--addr" | "-a" => {
                options.addr = Some(required(&arg, args.next()));
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-v" => {
                println!("bookshelf {}", bookshelf::VERSION);
                std::process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {other}")),
        }
    }

    options
}

fn required(flag: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| usage_error(&format!("{flag} requires a value")))
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    eprintln!("Use --help for usage information");
    std::process::exit(2);
}

fn print_help() {
    println!(
        r"Bookshelf - in-memory book catalog over HTTP

USAGE:
    bookshelf [serve] [OPTIONS]
    bookshelf fetch <URL>

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -m, --mode <MODE>      Service mode: crud (default) or demo
    -a, --addr <ADDR>      Listen address (default: 0.0.0.0:8080)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    BOOKSHELF__SERVER__HTTP_ADDR              Listen address
    BOOKSHELF__SERVER__MODE                   crud or demo
    BOOKSHELF__SERVER__SHUTDOWN_TIMEOUT_SECS  Graceful shutdown deadline (default: 5)
    BOOKSHELF__SITE__PAGE_PATH                Landing page file (default: template.html)
    BOOKSHELF__SITE__STATIC_DIR               Static directory (default: static)
    BOOKSHELF__LOGGING__LEVEL                 Log filter (default: info)
    BOOKSHELF__LOGGING__FILE                  Append logs to this file instead of stdout

EXAMPLES:
    # CRUD service on port 8080
    bookshelf

    # Demo service, logging to server.log
    bookshelf serve --mode demo

    # List the books of a running service
    bookshelf fetch http://127.0.0.1:8080/books
"
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    match Command::parse() {
        Command::Serve(options) => serve(&options).await,
        Command::Fetch(url) => fetch(&url).await,
    }
}

async fn serve(options: &ServeOptions) -> ExitCode {
    let config = match bookshelf::load_config(options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&bookshelf::log_config(&config.logging)) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    info!(
        version = bookshelf::VERSION,
        mode = %config.server.mode,
        addr = %config.server.http_addr,
        "Starting bookshelf"
    );

    let result: BookshelfResult<()> = async {
        let server = bookshelf::build_server(&config)?;
        Lifecycle::new().run_until_signal(server).await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn fetch(url: &str) -> ExitCode {
    let logging = LogConfig {
        level: "warn".to_string(),
        ..LogConfig::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match bookshelf::fetch_books(url).await {
        Ok(books) => {
            for book in &books {
                match serde_json::to_string(book) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        eprintln!("{e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
