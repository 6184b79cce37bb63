//! xp-extract — run a captured provider payload through its extractor.
//!
//! Usage:
//!   xp-extract <kind> <file.json>     kind: chat | openrouter-image | getimg
//!   xp-extract <kind> -               read the payload from stdin
//!
//! Exit codes: 0 extracted, 2 no output (empty or safety-blocked), 1 error.

use anyhow::{bail, Context};
use std::io::Read;
use std::process::ExitCode;
use xpressionist_resilience::providers::{
    extract_chat_content, extract_image_result_a, extract_image_result_b, ImageOutcome,
    ProviderKind,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && matches!(args[1].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if args.len() != 3 {
        print_usage();
        return ExitCode::from(1);
    }

    match run(&args[1], &args[2]) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"xp-extract — validate and extract a captured provider response

USAGE:
    xp-extract <KIND> <FILE|->

KINDS:
    chat                 chat completion (first choice's content)
    openrouter-image     OpenRouter image generation (url or safety block)
    getimg               GetImg generation (image, url, data[0].url)

ENVIRONMENT:
    RUST_LOG             tracing filter, e.g. debug"#
    );
}

/// Returns whether anything was extracted.
fn run(kind: &str, source: &str) -> anyhow::Result<bool> {
    let kind: ProviderKind = kind.parse()?;
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {}", source))?
    };
    if raw.trim().is_empty() {
        bail!("payload is empty");
    }
    let payload: serde_json::Value = serde_json::from_str(&raw).context("parsing JSON")?;
    tracing::debug!(%kind, bytes = raw.len(), "extracting");

    let found = match kind {
        ProviderKind::Chat => {
            println!("{}", extract_chat_content(&payload)?);
            true
        }
        ProviderKind::OpenRouterImage => match extract_image_result_a(&payload)? {
            Some(ImageOutcome::Url(url)) => {
                println!("{}", url);
                true
            }
            Some(ImageOutcome::SafetyBlocked { reason }) => {
                println!("safety-blocked: {}", reason);
                false
            }
            None => {
                println!("no image");
                false
            }
        },
        ProviderKind::GetImg => match extract_image_result_b(&payload)? {
            Some(image) => {
                println!("{}", image);
                true
            }
            None => {
                println!("no image");
                false
            }
        },
    };
    Ok(found)
}
