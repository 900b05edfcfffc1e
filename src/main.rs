//! Main entry point for the zipsnip CLI.
//!
//! Parses arguments, opens an extraction session over HTTP, and either
//! lists the archive's members or extracts the requested one. Every
//! failure is terminal: the diagnostic names the failing step and the
//! process exits non-zero.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;

use zipsnip::{CentralDirectoryFileHeader, Cli, ExtractionSession, HttpRangeClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.is_http_url() {
        bail!("only http:// and https:// URLs are supported");
    }

    let client = Arc::new(HttpRangeClient::new(cli.url.clone())?);
    let transferred_before = client.transferred_bytes();

    let mut session = ExtractionSession::open(client.clone(), cli.verbose).await?;
    if !cli.quiet {
        let archive = session.archive();
        eprintln!("archive: {} ({})", archive.name(), format_size(archive.size));
    }

    session.load_directory().await?;

    if cli.list {
        for entry in session.entries() {
            println!("{}", entry.file_name);
        }
        return Ok(());
    }

    let member = match &cli.member {
        Some(name) => name.clone(),
        None => prompt_for_member(session.entries())?,
    };

    let path = session
        .extract_to_file(&member, Path::new(&cli.output_dir))
        .await?;

    if !cli.quiet {
        println!("extracted: {}", path.display());
        println!(
            "note: the output is a raw local-header + data span, not a standalone archive;"
        );
        println!(
            "      use an external archive tool to recover the file, e.g. `7z x {}`",
            path.display()
        );
        eprintln!(
            "\nTotal bytes transferred: {}",
            format_size(client.transferred_bytes() - transferred_before)
        );
    }

    Ok(())
}

/// List the member names and read the user's choice from stdin.
fn prompt_for_member(entries: &[CentralDirectoryFileHeader]) -> Result<String> {
    for entry in entries {
        println!("{}", entry.file_name);
    }

    print!("Which file do you want to download:\n> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::format_size;

    #[test]
    fn format_size_picks_the_unit() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }
}
