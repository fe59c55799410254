//! telegraf-bacnet
//!
//! Reads JSON readings from stdin, one per line, and prints aggregated
//! InfluxDB line protocol on stdout. Meant to sit behind a BACnet poller as a
//! Telegraf `execd` input. End of input or Ctrl+C stops the printer.

use std::io;
use std::thread;

use crossbeam_channel::{bounded, select};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use telegraf_bacnet::{pump, Printer, PrinterConfig, ShutdownToken};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries line protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(filter)
        .init();
}

/// Cancel the printer on Ctrl+C.
fn ctrlc_handler(token: ShutdownToken) {
    if let Err(err) = ctrlc::set_handler(move || token.cancel()) {
        tracing::warn!(error = %err, "failed to install Ctrl+C handler");
    }
}

fn print_help() {
    println!("telegraf-bacnet - BACnet readings to InfluxDB line protocol");
    println!();
    println!("USAGE:");
    println!("    telegraf-bacnet [OPTIONS] < readings.jsonl");
    println!();
    println!("OPTIONS:");
    println!("    -t, --trigger <NAME>      Measurement that flushes a group [default: presentValue]");
    println!("    -p, --prefix <TOKEN>      Line protocol measurement name [default: bacnet]");
    println!("    -h, --help                Print help information");
}

fn parse_args() -> Result<PrinterConfig, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = PrinterConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--trigger" | "-t" => {
                config.aggregator.trigger = args.get(i + 1).ok_or("--trigger requires a value")?.clone();
                i += 2;
            }
            "--prefix" | "-p" => {
                config.prefix = args.get(i + 1).ok_or("--prefix requires a value")?.clone();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => return Err(format!("unknown argument: {arg}")),
        }
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    };

    init_tracing();

    let printer = Printer::start(config, io::stdout())?;
    let token = printer.shutdown_token();
    ctrlc_handler(token.clone());

    // stdin reads cannot be interrupted, so the reader runs on its own thread
    // and is left behind on Ctrl+C.
    let (done_tx, done_rx) = bounded(1);
    let submitter = printer.submitter();
    let reader_token = token.clone();
    thread::Builder::new()
        .name("bacnet-lp-stdin".to_string())
        .spawn(move || {
            let result = pump(io::stdin().lock(), &submitter, &reader_token);
            drop(submitter);
            let _ = done_tx.send(result);
        })?;

    let read_result = select! {
        recv(done_rx) -> msg => msg.ok(),
        recv(token.receiver()) -> _ => None,
    };

    let stats = if token.is_cancelled() {
        info!("interrupted, stopping");
        printer.shutdown()?
    } else {
        // The reader dropped its submitter, so close() drains and returns.
        printer.close()?
    };
    info!(
        submitted = stats.submitted,
        lines = stats.worker.lines_written,
        unflushed_groups = stats.worker.aggregator.discarded_groups,
        "printer stopped"
    );

    match read_result {
        Some(Err(err)) => Err(err.into()),
        Some(Ok(input)) => {
            info!(lines = input.lines, skipped = input.skipped, "input closed");
            Ok(())
        }
        None => Ok(()),
    }
}
