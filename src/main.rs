//! pagesentry CLI entry point

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use pagesentry::browser::SessionOptions;
use pagesentry::cli::{Args, OutputFormat};
use pagesentry::crawl::{self, CrawlOptions};
use pagesentry::output::{format_json, print_report, print_summary, write_report_file};
use pagesentry::scan::{ScanOptions, Scanner};
use pagesentry::ScanError;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args);

    if let Err(message) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), message);
        return ExitCode::from(2);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            match e {
                ScanError::InvalidInput { .. } => ExitCode::from(2),
                ScanError::Canceled => ExitCode::from(130),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn setup_logging(args: &Args) {
    let level = if args.quiet {
        Level::ERROR
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Cancel the token on Ctrl-C so the scan releases the browser cleanly
fn hook_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, canceling...");
            cancel.cancel();
        }
    });
}

async fn run(args: Args) -> Result<(), ScanError> {
    let cancel = CancellationToken::new();
    hook_ctrl_c(cancel.clone());

    let session = SessionOptions {
        chrome_path: args.chrome_path.clone(),
        no_sandbox: args.no_sandbox,
        timeout_secs: args.timeout,
    };
    let scan_options = ScanOptions {
        device: args.device,
        skip_heavy: args.skip_heavy,
        cancel: cancel.clone(),
    };

    if args.crawl {
        let options = CrawlOptions {
            max_pages: args.max_pages,
            scan: scan_options,
        };

        let progress = (!args.quiet).then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_message(format!("Crawling {}...", args.url));
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar
        });

        let summary = crawl::crawl_site(&args.url, &options, session).await;
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        let summary = summary?;

        match (&args.output, args.format) {
            (Some(path), _) => {
                write_report_file(&summary, path)?;
                info!("Summary written to {}", path.display());
            }
            (None, OutputFormat::Json) => println!("{}", format_json(&summary, true)?),
            (None, OutputFormat::Table) => print_summary(&summary),
        }
    } else {
        let scanner = Scanner::with_options(session).await?;
        let result = scanner.scan(&args.url, &scan_options).await;
        if let Err(e) = scanner.close().await {
            tracing::warn!("Browser teardown failed: {}", e);
        }
        let report = result?;

        match (&args.output, args.format) {
            (Some(path), _) => {
                write_report_file(&report, path)?;
                info!("Report written to {}", path.display());
            }
            (None, OutputFormat::Json) => println!("{}", format_json(&report, true)?),
            (None, OutputFormat::Table) => print_report(&report),
        }
    }

    Ok(())
}
