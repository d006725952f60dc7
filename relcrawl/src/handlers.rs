use clap::ArgMatches;
use colored::Colorize;
use relcrawl_core::config::{Config, FetcherKind};
use relcrawl_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
use relcrawl_core::report::{ReportFormat, render_report, write_report};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

// Helper functions for crawl handler

/// Use the seed argument when given, otherwise the first non-empty line of
/// `reader` (stdin in the CLI).
pub fn read_seed<R: BufRead>(seed: Option<&String>, reader: R) -> Result<String, String> {
    if let Some(seed) = seed {
        return parse_seed_line(seed).ok_or_else(|| "Seed must not be empty".to_string());
    }

    for line in reader.lines() {
        let line = line.map_err(|e| format!("Failed to read seed from stdin: {}", e))?;
        if let Some(seed) = parse_seed_line(&line) {
            return Ok(seed);
        }
    }

    Err("No seed provided: pass a video URL or id, or pipe one on stdin".to_string())
}

/// Trim a seed line, rejecting blanks and comment lines
pub fn parse_seed_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_string())
}

pub fn log_level(quiet: bool, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    }
}

// Status output goes to stderr; stdout carries only the report

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn print_banner() {
    print_divider();
    eprintln!(
        "{} {}",
        "  RELCRAWL".bright_white().bold(),
        env!("CARGO_PKG_VERSION").cyan()
    );
    eprintln!("{}", "  bounded related-video crawler".bright_black());
    print_divider();
    eprintln!();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    let quiet = sub_matches.get_flag("quiet");
    let verbose = sub_matches.get_flag("verbose");

    // Logs go to stderr as well
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(quiet, verbose))
        .init();

    let seed = match read_seed(sub_matches.get_one::<String>("SEED"), io::stdin().lock()) {
        Ok(seed) => seed,
        Err(e) => fail(e),
    };

    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let max_fanout = *sub_matches.get_one::<usize>("fanout").unwrap_or(&10);
    let concurrency = *sub_matches.get_one::<usize>("concurrency").unwrap_or(&16);
    let fetcher = sub_matches
        .get_one::<String>("fetcher")
        .and_then(|kind| FetcherKind::from_str(kind))
        .unwrap_or_default();
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");
    let env_file = sub_matches.get_one::<PathBuf>("env-file");

    let mut config = match Config::load(env_file.map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(e) => fail(format!("{:#}", e)),
    };
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        config = config.with_timeout(*timeout);
    }

    if !quiet {
        eprintln!("{} Seed: {}", "→".blue(), seed.bright_white());
        eprintln!(
            "{} Max depth: {}  Max fanout: {}  Concurrency: {}",
            "→".blue(),
            max_depth.to_string().cyan(),
            max_fanout.to_string().cyan(),
            concurrency.to_string().cyan()
        );
        let fetcher_str = match fetcher {
            FetcherKind::Scrape => "scrape (watch pages)",
            FetcherKind::Api => "api (hosted metadata)",
        };
        eprintln!("{} Fetcher: {}\n", "→".blue(), fetcher_str);
    }

    let options = CrawlOptions {
        seed,
        max_depth,
        max_fanout,
        fetcher,
        concurrency,
        show_progress_bars: !quiet,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(move |msg: String| {
        if !quiet {
            eprintln!("{}", msg);
        }
    });

    let summary = match execute_crawl(options, &config, Some(progress_callback), None).await {
        Ok(summary) => summary,
        Err(e) => fail(format!("Crawl failed: {}", e)),
    };

    if !quiet {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
    }

    let report = match render_report(&summary, format) {
        Ok(report) => report,
        Err(e) => fail(format!("{:#}", e)),
    };

    match output {
        Some(path) => {
            if let Err(e) = write_report(path, &report) {
                fail(format!("{:#}", e));
            }
            if !quiet {
                eprintln!(
                    "{} Report written to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }
}
