use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use indicatif::{ProgressBar, ProgressStyle};
use sitegauge_core::audit::{audit_website_with, AuditOptions, AuditResult};
use sitegauge_core::issues::Severity;
use sitegauge_core::report::{
    generate_json_report, generate_text_report, save_report, ReportFormat,
};
use sitegauge_crawler::CrawlOptions;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

mod commands;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command, quiet).await,
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

async fn handle_audit(args: &ArgMatches, quiet: bool) {
    let url = args.get_one::<Url>("URL").expect("URL is required");
    let threads = *args.get_one::<usize>("threads").expect("has default");
    let timeout = *args.get_one::<u64>("timeout").expect("has default");
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");

    let mut crawl = CrawlOptions {
        concurrency: threads,
        timeout_secs: timeout,
        ..CrawlOptions::default()
    };
    if let Some(seed) = args.get_one::<u64>("seed") {
        crawl.synthetic_seed = *seed;
    }

    let options = AuditOptions {
        crawl,
        performance_endpoint: args.get_one::<String>("lab-endpoint").cloned(),
        insight_endpoint: args.get_one::<String>("insight-endpoint").cloned(),
        cancel: None,
    };
    debug!("Auditing {} with {} workers, {}s timeout", url, threads, timeout);

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Auditing {}...", url));
        Some(pb)
    };

    let result = audit_website_with(url.as_str(), options).await;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(result) => {
            let report = match format {
                ReportFormat::Text => generate_text_report(&result),
                ReportFormat::Json => match generate_json_report(&result) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("{} Failed to serialize report: {}", "[!]".red().bold(), e);
                        std::process::exit(1);
                    }
                },
            };

            match output {
                Some(path) => match save_report(&report, path) {
                    Ok(()) => println!("Report saved to {}", path.display()),
                    Err(e) => {
                        eprintln!(
                            "{} Failed to write {}: {}",
                            "[!]".red().bold(),
                            path.display(),
                            e
                        );
                        std::process::exit(1);
                    }
                },
                None => println!("{}", report),
            }

            if !quiet {
                print_score_summary(&result);
            }
        }
        Err(e) => {
            eprintln!("{} Audit failed: {}", "[!]".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn print_score_summary(result: &AuditResult) {
    let audit = &result.audit;

    println!("{}", "═".repeat(60).bright_blue().bold());
    println!("{}", "Audit complete".bright_green().bold());
    println!("  Pages audited: {}", audit.page_count());
    println!("  SEO:        {}", format_score(audit.seo_score));
    println!("  Content:    {}", format_score(audit.content_score));
    println!("  Technical:  {}", format_score(audit.technical_score));
    println!("  Overall:    {}", format_score(audit.overall_score));

    let critical = audit
        .site_wide_issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .count();
    if critical > 0 {
        println!(
            "  {}",
            format!("{} critical site-wide issue(s) found", critical)
                .red()
                .bold()
        );
    }
}

fn format_score(score: u8) -> colored::ColoredString {
    let text = format!("{:>3}/100", score);
    match score {
        80..=100 => text.green(),
        50..=79 => text.yellow(),
        _ => text.red(),
    }
}

fn print_banner() {
    println!(
        "{}",
        r#"
     _ _
 ___(_) |_ ___  __ _  __ _ _   _  __ _  ___
/ __| | __/ _ \/ _` |/ _` | | | |/ _` |/ _ \
\__ \ | ||  __/ (_| | (_| | |_| | (_| |  __/
|___/_|\__\___|\__, |\__,_|\__,_|\__, |\___|
               |___/             |___/      "#
            .bright_cyan()
    );
    println!(
        "{}  {}\n",
        "sitegauge".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
}
