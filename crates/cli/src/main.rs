use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use broadsheet_core::{Article, Body, BroadsheetError};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, html, json", s)),
        }
    }
}

/// Download a news article and extract its text
#[derive(Parser, Debug)]
#[command(name = "broadsheet")]
#[command(version, about = "Download and extract news articles", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, html, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Pin the source origin instead of deriving it from the URL
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Article title, used instead of the document title
    #[arg(long)]
    title: Option<String>,

    /// Article URL for file and stdin input
    #[arg(long, default_value = "http://localhost/", value_name = "URL")]
    url: String,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Maximum characters of extracted text
    #[arg(long, value_name = "NUM")]
    max_text: Option<usize>,

    /// Follow a <meta http-equiv="refresh"> redirect once
    #[arg(long)]
    follow_meta_refresh: bool,

    /// Override a configuration option, VALUE is JSON or a plain string
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(String, Value)>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

/// Parse a `KEY=VALUE` override
fn parse_option(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in {:?}", s));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn is_remote(input: &str) -> bool {
    url::Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn build_article(args: &Args, url: &str) -> anyhow::Result<Article> {
    let mut builder = Article::builder(url);
    if let Some(title) = &args.title {
        builder = builder.title(title);
    }
    if let Some(source_url) = &args.source_url {
        builder = builder.source_url(source_url);
    }
    if let Some(timeout) = args.timeout {
        builder = builder.option("request_timeout", timeout);
    }
    if let Some(user_agent) = &args.user_agent {
        builder = builder.option("browser_user_agent", user_agent.as_str());
    }
    if let Some(max_text) = args.max_text {
        builder = builder.option("max_text", max_text);
    }
    if args.follow_meta_refresh {
        builder = builder.option("follow_meta_refresh", true);
    }
    for (key, value) in &args.options {
        builder = builder.option(key, value.clone());
    }

    builder.build().with_context(|| format!("Failed to create article for {}", url))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "broadsheet", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);
    if args.verbose {
        echo::print_banner();
    }

    let input = args.input.clone().unwrap_or_default();
    let remote = is_remote(&input);
    let url = if remote { input.as_str() } else { args.url.as_str() };
    let mut article = build_article(&args, url)?;
    tracing::debug!(%input, remote, url = %article.url(), "input resolved");

    if remote {
        if args.verbose {
            echo::print_step(1, 3, &format!("Downloading {}", article.url().bright_white().underline()));
        }
        article.download(None).await;
    } else {
        if args.verbose {
            let source = if input == "-" { "stdin".to_string() } else { format!("file {}", input) };
            echo::print_step(1, 3, &format!("Reading from {}", source));
        }
        let bytes = read_input(&input)?;
        article.download(Some(Body::Bytes(bytes))).await;
    }

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(article.html().len()));
        echo::print_step(2, 3, "Parsing article");
    }

    let text = match article.parse() {
        Ok(text) => text,
        Err(e @ (BroadsheetError::NotDownloaded { .. } | BroadsheetError::DownloadFailed { .. })) => {
            echo::print_download_diagnostic(&article);
            return Err(e.into());
        }
        Err(e) => return Err(e).context("Failed to parse article"),
    };

    if !article.is_parsed() {
        echo::print_warning("No document could be built from the input");
        bail!("Unparseable document at {}", article.url());
    }

    if args.verbose {
        if !article.title().is_empty() {
            echo::print_detail("Title", article.title());
        }
        match article.top_node() {
            Some(node) => echo::print_detail("Content node", &format!("<{}> score {:.1}", node.tag_name, node.score)),
            None => echo::print_warning("No content node found"),
        }
        if let Some(hash) = article.link_hash() {
            echo::print_detail("Link hash", hash);
        }
        echo::print_step(3, 3, "Writing output");
    }

    tracing::debug!(format = ?args.format, text_len = text.len(), "writing output");
    let output = match args.format {
        OutputFormat::Text => text,
        OutputFormat::Html => article.article_html().to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&article.to_json()).context("Failed to serialize article")?
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            if args.verbose {
                echo::print_success(&format!("Output written to {}", path.display().bright_white()));
            }
        }
        None => println!("{}", output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(parse_option("max_text=10").unwrap(), ("max_text".to_string(), Value::from(10)));
        assert_eq!(parse_option("keep_article_html=false").unwrap().1, Value::Bool(false));
        assert_eq!(parse_option("language=de").unwrap().1, Value::String("de".to_string()));
        assert_eq!(parse_option("browser_user_agent=a=b").unwrap().1, Value::String("a=b".to_string()));
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=1").is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a"));
        assert!(!is_remote("article.html"));
        assert!(!is_remote("-"));
        assert!(!is_remote("ftp://example.com/a"));
    }

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }
}
