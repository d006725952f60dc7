use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("relcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("relcrawl")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Show debug logging on stderr")
                .required(false)
                .global(true)
                .conflicts_with("quiet"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl the related-videos graph from a seed video, visiting every video at \
                most once.",
                )
                .arg(
                    arg!([SEED])
                        .required(false)
                        .help("Seed video URL or id (read from stdin when omitted)"),
                )
                .arg(
                    arg!(-d --"depth" <HOPS>)
                        .required(false)
                        .help("Maximum number of relation hops from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(-r --"fanout" <COUNT>)
                        .required(false)
                        .help("Maximum related videos followed per video")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"fetcher" <KIND>)
                        .required(false)
                        .help("Metadata source: scrape watch pages or query the hosted API")
                        .value_parser(["scrape", "api"])
                        .default_value("scrape"),
                )
                .arg(
                    arg!(--"env-file" <PATH>)
                        .required(false)
                        .help("Env file with credentials and endpoints (ignored if missing)")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .default_value(".env"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds (overrides RELCRAWL_TIMEOUT_SECS)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM_FETCHES>)
                        .required(false)
                        .help("Maximum number of fetches in flight at once")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("16"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv")
                        .value_parser(["text", "json", "csv"])
                        .default_value("text"),
                ),
        )
}
