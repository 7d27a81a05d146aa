use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegraph")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log crawl progress (RUST_LOG overrides)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("map")
                .about(
                    "Build the page hierarchy from a sitemap, crawl every listed page for its \
                reference links and render the results.",
                )
                .arg(
                    arg!(<SITEMAP>)
                        .required(true)
                        .help("Path to a sitemap.xml file"),
                )
                .arg(
                    arg!(--"origin" <URL>)
                        .required(false)
                        .help(
                            "Site origin stripped from each URL (default: taken from the first \
                        sitemap entry)",
                        ),
                )
                .arg(
                    arg!(-s --"selector" <CSS>)
                        .required(false)
                        .help("CSS selector matching the anchors that count as page links")
                        .default_value(sitegraph_scanner::DEFAULT_LINK_SELECTOR),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory the rendered documents are written to")
                        .default_value("."),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: html, json, all")
                        .value_parser(["html", "json", "all"])
                        .default_value("html"),
                )
                .arg(
                    arg!(-t --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of pages fetched concurrently")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds (default: none)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"user-agent" <UA>)
                        .required(false)
                        .help("User-Agent header sent with every request"),
                )
                .arg(
                    arg!(--"resolve-relative")
                        .required(false)
                        .help("Resolve relative hrefs against the page URL before matching")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-crawl")
                        .required(false)
                        .help("Skip fetching pages; render the hierarchy only")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("tree")
                .about("Print the sitemap's page hierarchy as a text tree")
                .arg(
                    arg!(<SITEMAP>)
                        .required(true)
                        .help("Path to a sitemap.xml file"),
                )
                .arg(
                    arg!(--"origin" <URL>)
                        .required(false)
                        .help("Site origin stripped from each URL"),
                ),
        )
}
