use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("broadsheet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download and extract news articles")
        .arg(clap::arg!([INPUT] "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, html, json)")
                .default_value("text")
                .value_parser(["text", "html", "json"]),
        )
        .arg(clap::arg!(--"source-url" <URL> "Pin the source origin instead of deriving it from the URL"))
        .arg(clap::arg!(--title <TITLE> "Article title, used instead of the document title"))
        .arg(clap::arg!(--url <URL> "Article URL for file and stdin input").default_value("http://localhost/"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(--"max-text" <NUM> "Maximum characters of extracted text"))
        .arg(clap::arg!(--"follow-meta-refresh" "Follow a <meta http-equiv=\"refresh\"> redirect once"))
        .arg(
            clap::arg!(-O --option <KEY_VALUE> "Override a configuration option, VALUE is JSON or a plain string")
                .value_name("KEY=VALUE")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "broadsheet", &completions_dir).unwrap();
}
