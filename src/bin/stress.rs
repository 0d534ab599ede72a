//! Depot Stress Binary
//!
//! Load-test harness: drives a matrix of operations, file sizes, and client
//! worker counts against a running server, prints per-worker timings, then
//! writes a CSV report and fetches the server's global counters.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use depot::client::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use depot::{DepotClient, Result, StatsSnapshot};

/// Depot stress-test harness
#[derive(Parser, Debug)]
#[command(name = "depot-stress")]
#[command(about = "Load-test harness for the depot file server")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6666")]
    addr: String,

    /// File sizes to test, in MB
    #[arg(long, value_delimiter = ',', default_values_t = vec![10, 50, 100])]
    sizes_mb: Vec<u64>,

    /// Client worker counts to test
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 5, 50])]
    workers: Vec<usize>,

    /// Directory for generated test files
    #[arg(long, default_value = "./stress_files")]
    work_dir: PathBuf,

    /// Directory for CSV reports
    #[arg(long, default_value = "./stress_results")]
    results_dir: PathBuf,
}

/// Operations exercised by the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Upload,
    Get,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Upload => "UPLOAD",
            Operation::Get => "GET",
        }
    }
}

/// Outcome of one client worker
struct WorkerOutcome {
    worker_id: usize,
    elapsed_s: f64,
    success: bool,
    bytes: u64,
}

/// Aggregated outcome of one matrix combination
struct Combination {
    operation: Operation,
    size_mb: u64,
    client_workers: usize,
    avg_time_s: f64,
    throughput_bps: f64,
    succeeded: usize,
    failed: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("Stress run failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    fs::create_dir_all(&args.work_dir)?;
    fs::create_dir_all(&args.results_dir)?;

    let mut combinations = Vec::new();

    for &size_mb in &args.sizes_mb {
        let local_path = args.work_dir.join(test_filename(size_mb));
        generate_test_file(&local_path, size_mb)?;

        for &client_workers in &args.workers {
            // UPLOAD runs first so the file exists on the server for GET
            for operation in [Operation::Upload, Operation::Get] {
                combinations.push(run_combination(
                    &args.addr,
                    operation,
                    size_mb,
                    client_workers,
                    &local_path,
                ));
            }
        }

        fs::remove_file(&local_path)?;
    }

    // One global fetch covers every row, the counters being process-wide
    let stats = fetch_server_stats(&args.addr);

    let report_path = args.results_dir.join(report_filename());
    write_csv(&report_path, &combinations, stats)?;
    println!("Report written to {}", report_path.display());

    Ok(())
}

/// Run every worker of one (operation, size, workers) combination
fn run_combination(
    addr: &str,
    operation: Operation,
    size_mb: u64,
    client_workers: usize,
    local_path: &Path,
) -> Combination {
    let size_bytes = size_mb * 1024 * 1024;
    let filename = test_filename(size_mb);

    println!(
        "--- {} {} MB with {} client worker(s) ---",
        operation.name(),
        size_mb,
        client_workers
    );

    let mut handles = Vec::with_capacity(client_workers);
    for worker_id in 1..=client_workers {
        let addr = addr.to_string();
        let filename = filename.clone();
        let local_path = local_path.to_path_buf();
        handles.push(thread::spawn(move || {
            run_worker(worker_id, &addr, operation, &filename, &local_path, size_bytes)
        }));
    }

    let mut outcomes: Vec<WorkerOutcome> = handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .collect();
    outcomes.sort_by_key(|o| o.worker_id);

    for outcome in &outcomes {
        println!(
            "  worker {:>3}: {:>9.3} s  {}",
            outcome.worker_id,
            outcome.elapsed_s,
            if outcome.success { "ok" } else { "FAILED" }
        );
    }

    let succeeded = outcomes.iter().filter(|o| o.success).count();
    let failed = client_workers - succeeded;
    let total_time: f64 = outcomes
        .iter()
        .filter(|o| o.success)
        .map(|o| o.elapsed_s)
        .sum();
    let total_bytes: u64 = outcomes.iter().map(|o| o.bytes).sum();

    let avg_time_s = if succeeded > 0 {
        total_time / succeeded as f64
    } else {
        0.0
    };
    let throughput_bps = if succeeded > 0 && avg_time_s > 0.0 {
        (total_bytes as f64 / succeeded as f64) / avg_time_s
    } else {
        0.0
    };

    println!(
        "  avg {:.3} s/client, {:.2} MB/s/client, {} ok / {} failed",
        avg_time_s,
        throughput_bps / (1024.0 * 1024.0),
        succeeded,
        failed
    );

    Combination {
        operation,
        size_mb,
        client_workers,
        avg_time_s,
        throughput_bps,
        succeeded,
        failed,
    }
}

/// One client worker: connect, perform the operation once, time it
fn run_worker(
    worker_id: usize,
    addr: &str,
    operation: Operation,
    filename: &str,
    local_path: &Path,
    size_bytes: u64,
) -> WorkerOutcome {
    let started = Instant::now();
    let success = match perform(addr, operation, filename, local_path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("worker {}: {} failed: {}", worker_id, operation.name(), e);
            false
        }
    };

    WorkerOutcome {
        worker_id,
        elapsed_s: started.elapsed().as_secs_f64(),
        success,
        bytes: if success { size_bytes } else { 0 },
    }
}

fn perform(addr: &str, operation: Operation, filename: &str, local_path: &Path) -> Result<()> {
    let mut client = DepotClient::connect_with_retry(addr, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY)?;
    match operation {
        Operation::Upload => {
            let content = fs::read(local_path)?;
            client.upload(filename, &content)?;
        }
        Operation::Get => {
            // Received bytes are dropped; the transfer is the point
            client.get(filename)?;
        }
    }
    Ok(())
}

/// Create a zero-filled file of the given size (sparse where supported)
fn generate_test_file(path: &Path, size_mb: u64) -> Result<()> {
    let file = File::create(path)?;
    file.set_len(size_mb * 1024 * 1024)?;
    Ok(())
}

fn fetch_server_stats(addr: &str) -> Option<StatsSnapshot> {
    let fetched = DepotClient::connect_with_retry(addr, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY)
        .and_then(|client| client.server_stats());
    match fetched {
        Ok(snapshot) => {
            println!(
                "server stats: success={} failed={}",
                snapshot.successful, snapshot.failed
            );
            Some(snapshot)
        }
        Err(e) => {
            tracing::warn!("could not fetch server statistics: {}", e);
            None
        }
    }
}

fn test_filename(size_mb: u64) -> String {
    format!("stress_{}MB.bin", size_mb)
}

fn report_filename() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("stress_results_{}.csv", timestamp)
}

fn write_csv(
    path: &Path,
    combinations: &[Combination],
    stats: Option<StatsSnapshot>,
) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "No,Operation,Volume_MB,Client_Workers,Avg_Time_Per_Client_s,\
         Throughput_Per_Client_Bps,Client_Success,Client_Failed,Server_Success,Server_Failed"
    )?;

    let (server_success, server_failed) = match stats {
        Some(s) => (s.successful.to_string(), s.failed.to_string()),
        None => ("N/A".to_string(), "N/A".to_string()),
    };

    for (index, c) in combinations.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{:.4},{:.2},{},{},{},{}",
            index + 1,
            c.operation.name(),
            c.size_mb,
            c.client_workers,
            c.avg_time_s,
            c.throughput_bps,
            c.succeeded,
            c.failed,
            server_success,
            server_failed
        )?;
    }

    Ok(())
}
