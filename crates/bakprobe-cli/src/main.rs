//! bakprobe - Identify the SQL Server release that produced a backup file
//!
//! This tool locates the `MSCI` block of a `.bak` file, reads the internal
//! version code stored in it, and prints the matching product release.

use anyhow::{Context, Result};
use bakprobe_core::{inspect_file_with_config, BackupVersion, ScannerConfig};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Identify the SQL Server release that produced a backup file
#[derive(Parser, Debug)]
#[command(name = "bakprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the backup to analyze
    #[arg(short, long, value_parser = non_empty_path)]
    filename: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Output format for the inspection result
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// The internal version and the release name, one per line
    Text,
    /// A JSON object with offset, code and release
    Json,
}

fn non_empty_path(value: &str) -> std::result::Result<PathBuf, String> {
    if value.trim().is_empty() {
        return Err("a backup path is required".to_string());
    }
    Ok(PathBuf::from(value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let backup = inspect_backup(&cli.filename)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&backup, cli.format, &mut out)?;
    out.flush().context("Failed to flush output")?;

    Ok(())
}

/// Inspect a single backup file
fn inspect_backup(file: &Path) -> Result<BackupVersion> {
    debug!("Inspecting {}", file.display());

    let backup = inspect_file_with_config(file, &ScannerConfig::default())
        .with_context(|| format!("Failed to read version from backup: {}", file.display()))?;

    debug!(
        "Signature block at offset {} holds version code {}",
        backup.block_offset, backup.code
    );
    Ok(backup)
}

/// Write the inspection result in the requested format
fn render(backup: &BackupVersion, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "Internal Version: {}", backup.code)?;
            writeln!(out, "{}", backup.info)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, backup)
                .context("Failed to serialize inspection result")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakprobe_core::{VersionCode, VersionInfo};
    use bytes::{BufMut, BytesMut};

    fn sample() -> BackupVersion {
        let code = VersionCode::new(782);
        BackupVersion {
            block_offset: 512,
            code,
            info: VersionInfo::from(code),
        }
    }

    #[test]
    fn test_render_text() {
        let mut out = Vec::new();
        render(&sample(), OutputFormat::Text, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Internal Version: 782\nSQL Server 2014 (12.0)\n"
        );
    }

    #[test]
    fn test_render_json() {
        let mut out = Vec::new();
        render(&sample(), OutputFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["block_offset"], 512);
        assert_eq!(value["code"], 782);
        assert_eq!(value["info"]["product_name"], "2014");
        assert_eq!(value["info"]["major_version"], 12);
    }

    #[test]
    fn test_inspect_backup() {
        let mut image = BytesMut::zeroed(4096);
        image[1024..1028].copy_from_slice(b"MSCI");
        (&mut image[1024 + 0xAC..1024 + 0xAE]).put_u16_le(611);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.bak");
        std::fs::write(&path, &image).unwrap();

        let backup = inspect_backup(&path).unwrap();
        assert_eq!(backup.code.get(), 611);
        assert_eq!(backup.info.to_string(), "SQL Server 2005 (9.0)");
    }

    #[test]
    fn test_inspect_backup_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bak");

        let err = inspect_backup(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.bak"));
    }

    #[test]
    fn test_filename_is_required() {
        assert!(Cli::try_parse_from(["bakprobe"]).is_err());
        assert!(Cli::try_parse_from(["bakprobe", "--filename", ""]).is_err());

        let cli = Cli::try_parse_from(["bakprobe", "-f", "db.bak", "--format", "json"]).unwrap();
        assert_eq!(cli.filename, PathBuf::from("db.bak"));
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
