//! Depot CLI Binary
//!
//! Interactive client over one persistent connection.
//!
//! ```text
//! LIST                 list stored files
//! GET <file>           download a file into the current directory
//! UPLOAD <file>        upload a local file
//! DELETE <file>        delete a stored file
//! STATS                query the server's operation counters
//! RECONNECT            drop the connection and connect again
//! EXIT                 quit
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use depot::client::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use depot::{DepotClient, DepotError};

/// Depot interactive client
#[derive(Parser, Debug)]
#[command(name = "depot-cli")]
#[command(about = "Interactive client for the depot file server")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6666")]
    addr: String,
}

fn main() {
    // Quiet by default so the prompt stays readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let mut client = try_connect(&args.addr);
    if client.is_none() {
        std::process::exit(1);
    }
    println!("Connected to {}. Type EXIT to quit.", args.addr);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("depot> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            // EOF or a broken stdin both end the session
            _ => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (verb, argument) = match input.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim().trim_matches('"')),
            None => (input, ""),
        };

        match verb.to_ascii_uppercase().as_str() {
            "EXIT" => break,
            "RECONNECT" => {
                client = try_connect(&args.addr);
                if client.is_some() {
                    println!("Reconnected to {}", args.addr);
                }
            }
            "STATS" => {
                match client.take() {
                    Some(c) => match c.server_stats() {
                        Ok(s) => println!("success: {}  failed: {}", s.successful, s.failed),
                        Err(e) => println!("stats query failed: {}", e),
                    },
                    None => {
                        println!("not connected; type RECONNECT to try again");
                        continue;
                    }
                }
                // The stats query closes the connection, so open a new one
                // for whatever comes next
                client = try_connect(&args.addr);
            }
            "LIST" => with_client(&mut client, |c| {
                let filenames = c.list()?;
                println!("Files on server:");
                for name in &filenames {
                    println!("- {}", name);
                }
                if filenames.is_empty() {
                    println!("(none)");
                }
                Ok(())
            }),
            "GET" => {
                if argument.is_empty() {
                    println!("usage: GET <file>");
                    continue;
                }
                with_client(&mut client, |c| {
                    let bytes = c.get(argument)?;
                    fs::write(argument, &bytes)?;
                    println!("Downloaded '{}' ({} bytes)", argument, bytes.len());
                    Ok(())
                });
            }
            "UPLOAD" => {
                if argument.is_empty() {
                    println!("usage: UPLOAD <file>");
                    continue;
                }
                if !Path::new(argument).is_file() {
                    println!("local file '{}' not found", argument);
                    continue;
                }
                with_client(&mut client, |c| {
                    let content = fs::read(argument)?;
                    let confirmation = c.upload(argument, &content)?;
                    println!("{}", confirmation);
                    Ok(())
                });
            }
            "DELETE" => {
                if argument.is_empty() {
                    println!("usage: DELETE <file>");
                    continue;
                }
                with_client(&mut client, |c| {
                    let confirmation = c.delete(argument)?;
                    println!("{}", confirmation);
                    Ok(())
                });
            }
            _ => println!(
                "unknown command; available: LIST, GET <file>, UPLOAD <file>, DELETE <file>, \
                 STATS, RECONNECT, EXIT"
            ),
        }
    }
}

/// Connect with the standard retry policy, reporting failure to the user
fn try_connect(addr: &str) -> Option<DepotClient> {
    match DepotClient::connect_with_retry(addr, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY) {
        Ok(client) => Some(client),
        Err(e) => {
            println!("connection failed: {}", e);
            None
        }
    }
}

/// Run one operation against the current connection, printing any failure.
///
/// Server-side errors come back as `Remote` and are shown as the server
/// worded them; everything else is a local problem.
fn with_client<F>(client: &mut Option<DepotClient>, op: F)
where
    F: FnOnce(&mut DepotClient) -> depot::Result<()>,
{
    match client.as_mut() {
        Some(c) => {
            if let Err(e) = op(c) {
                match e {
                    DepotError::Remote(message) => println!("server: {}", message),
                    other => println!("error: {}", other),
                }
            }
        }
        None => println!("not connected; type RECONNECT to try again"),
    }
}
