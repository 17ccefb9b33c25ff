//! Migration gateway CLI
//!
//! Command-line interface for administration and troubleshooting.

#![allow(clippy::print_stdout)]

use clap::Parser;
use infrastructure::{LogFormat, init_tracing};
use presentation_cli::{
    Cli, Commands, StatusReport, build_payload, issue_token, load_config,
    log_filter_from_verbosity, search_logs, status, token_service, verify_token,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(LogFormat::Text, log_filter_from_verbosity(cli.verbose))?;

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::IssueToken {
            region,
            user_id,
            payload,
            signing_key,
            expires_in,
        } => {
            let payload = build_payload(region, user_id.as_deref(), payload.as_deref())?;
            let tokens = token_service(&config, signing_key.as_deref(), expires_in);
            println!("{}", issue_token(&tokens, &payload)?);
        },

        Commands::VerifyToken { token, signing_key } => {
            let tokens = token_service(&config, signing_key.as_deref(), None);
            match verify_token(&tokens, &token) {
                Ok(payload) => {
                    println!("✅ Token is valid");
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                },
                Err(e) => {
                    println!("❌ Token rejected: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::SearchLogs {
            text,
            file,
            skip,
            limit,
        } => {
            let file = file.unwrap_or_else(|| config.logging.file.clone());
            let page = search_logs(file, text.as_deref(), skip, limit).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        },

        Commands::Status { json } => {
            let report = status(&config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_status(&report);
            }
            if !report.is_ok() {
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn print_status(report: &StatusReport) {
    println!("📊 Migration gateway v{}", report.version);
    println!("   Environment: {}", report.environment);
    println!("   Listen address: {}", report.bind_address);
    println!(
        "   Signing key: {}",
        if report.signing_key_configured {
            "configured"
        } else {
            "missing"
        }
    );
    println!("   Session store: {}", report.storage_path.display());
    println!("   Request log: {}", report.log_file.display());

    if !report.findings.is_empty() {
        println!();
        println!("🔐 Security findings:");
        for finding in &report.findings {
            println!(
                "   [{}] {}: {}",
                finding.severity, finding.code, finding.message
            );
        }
        if report.blocks_startup {
            println!("   ❌ The server would refuse to start in production");
        }
    }

    println!();
    println!("🩺 Dependencies:");
    for (name, health) in &report.health.services {
        match (&health.error, health.response_time_ms) {
            (None, Some(ms)) => println!("   ✅ {name} ({ms}ms)"),
            (None, None) => println!("   ✅ {name}"),
            (Some(error), _) => println!("   ❌ {name}: {error}"),
        }
    }
}
