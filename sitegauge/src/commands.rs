use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegauge")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegauge")
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Audit a website: crawl it, score it, detect issues and emit a \
                generation brief.",
                )
                .arg(
                    arg!(<URL>)
                        .help("The seed URL to audit")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Concurrent page fetches during the crawl")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"seed" <SEED>)
                        .required(false)
                        .help("RNG seed for placeholder page data, for reproducible runs")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"lab-endpoint" <URL>)
                        .required(false)
                        .help("Override the lab performance service endpoint"),
                )
                .arg(
                    arg!(--"insight-endpoint" <URL>)
                        .required(false)
                        .help("Creative insight service endpoint (brand analysis uses a local fallback when omitted)"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_requires_a_url() {
        let result = command_argument_builder().try_get_matches_from(["sitegauge", "audit"]);
        assert!(result.is_err());
    }

    #[test]
    fn audit_rejects_a_non_url_argument() {
        let result = command_argument_builder()
            .try_get_matches_from(["sitegauge", "audit", "definitely not a url"]);
        assert!(result.is_err());
    }

    #[test]
    fn audit_parses_url_and_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["sitegauge", "audit", "https://example.com/"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "audit");
        assert_eq!(
            sub.get_one::<Url>("URL").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(*sub.get_one::<usize>("threads").unwrap(), 4);
        assert_eq!(sub.get_one::<String>("format").unwrap(), "text");
        assert!(sub.get_one::<u64>("seed").is_none());
    }

    #[test]
    fn audit_accepts_overrides() {
        let matches = command_argument_builder()
            .try_get_matches_from([
                "sitegauge",
                "audit",
                "https://example.com/",
                "--threads",
                "8",
                "--seed",
                "42",
                "--format",
                "json",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(*sub.get_one::<usize>("threads").unwrap(), 8);
        assert_eq!(*sub.get_one::<u64>("seed").unwrap(), 42);
        assert_eq!(sub.get_one::<String>("format").unwrap(), "json");
    }

    #[test]
    fn format_rejects_unknown_values() {
        let result = command_argument_builder().try_get_matches_from([
            "sitegauge",
            "audit",
            "https://example.com/",
            "--format",
            "pdf",
        ]);
        assert!(result.is_err());
    }
}
