//! Financial Data Dashboard - Main entry point
//!
//! Provides commands for:
//! - `serve`: build the dashboard and serve it locally (default)
//! - `render`: write the dashboard to a self-contained HTML file
//! - `inspect`: print what was loaded and how it was cleaned

use anyhow::Result;
use clap::{Parser, Subcommand};
use fin_dashboard::dashboard::DashboardServer;
use fin_dashboard::finance::properties::{registry, PropertyReader};
use fin_dashboard::finance::FinancialData;
use fin_dashboard::pipeline::{load_workbook, render_dashboard_html, write_dashboard_html};
use fin_dashboard::{DashboardConfig, DashboardError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Financial statement dashboard
#[derive(Parser, Debug)]
#[command(name = "fin_dashboard")]
#[command(about = "Tabbed dashboard of income, balance sheet, cash flow and stock metrics")]
#[command(version)]
struct Cli {
    /// Workbook with the four statement sheets
    #[arg(short, long, global = true, default_value = "Intel_Financial_Data.xlsx")]
    input: PathBuf,

    /// JSON file of property overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Serve the dashboard on a local port until Ctrl-C
    Serve {
        /// Bind address (default from serve.host)
        #[arg(long)]
        host: Option<String>,
        /// Bind port, 0 lets the OS choose (default from serve.port)
        #[arg(long)]
        port: Option<u16>,
        /// Open the dashboard in the default browser once listening
        #[arg(long)]
        open: bool,
    },
    /// Write the dashboard to an HTML file
    Render {
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
    },
    /// Print the loaded tables and the cleaning applied to them
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("fin_dashboard=info".parse()?))
        .init();

    let cli = Cli::parse();

    let props = match &cli.config {
        Some(path) => PropertyReader::from_json_file(path)?,
        None => PropertyReader::default(),
    };
    let config = DashboardConfig::from_properties(&props);

    let data = match load_workbook(&cli.input) {
        Ok(data) => {
            println!("Data loaded successfully!");
            data
        }
        Err(e) => {
            eprintln!("{}", load_error_message(&cli.input, &e));
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        open: false,
    });

    match command {
        Commands::Serve { host, port, open } => {
            let page = render_dashboard_html(&data, &config)?;
            let host = host.unwrap_or_else(|| config.serve_host.clone());
            let port = port.unwrap_or(config.serve_port);

            let server = DashboardServer::bind(&host, port, page).await?;
            let addr = server.local_addr()?;
            info!(%addr, "dashboard server listening");
            let url = format!("http://{}/", addr);
            println!("Dashboard available at {} (Ctrl-C to stop)", url);
            if open {
                open_in_browser(&url);
            }
            server.run().await?;
        }
        Commands::Render { output } => {
            write_dashboard_html(&data, &config, &output)?;
            println!("Dashboard written to {}", output.display());
        }
        Commands::Inspect => {
            print_properties(&props);
            print_inspection(&data)?;
        }
    }

    Ok(())
}

/// Platform command that opens a URL in the default browser
fn browser_command(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "windows") {
        ("cmd", vec!["/C".into(), "start".into(), String::new(), url.into()])
    } else if cfg!(target_os = "macos") {
        ("open", vec![url.into()])
    } else {
        ("xdg-open", vec![url.into()])
    }
}

fn open_in_browser(url: &str) {
    let (program, args) = browser_command(url);
    match std::process::Command::new(program).args(&args).spawn() {
        Ok(_) => info!(url, program, "opened browser"),
        Err(e) => warn!(url, program, error = %e, "could not open browser"),
    }
}

/// User-facing message for a failed load
fn load_error_message(path: &Path, err: &DashboardError) -> String {
    match err {
        DashboardError::FileNotFound(_) => format!(
            "Error: The file '{}' was not found. Make sure it's in the correct directory.",
            path.display()
        ),
        DashboardError::SheetNotFound(name) => format!(
            "Error: Sheet name '{}' not found in the Excel file. Please check sheet names.",
            name
        ),
        other => format!("An unexpected error occurred: {}", other),
    }
}

fn print_properties(props: &PropertyReader) {
    println!("Properties");
    for def in registry().definitions() {
        println!("  {} = {}", def.name, props.get_string(&def.name));
    }
}

fn print_inspection(data: &FinancialData) -> Result<()> {
    for table in data.tables() {
        println!("{}", table.statement());
        println!("  rows: {}, columns: {}", table.height(), table.frame().width());
        if let Some((first, last)) = table.date_range()? {
            println!("  dates: {} .. {}", first, last);
        }

        let report = table.report();
        for (from, to) in &report.renamed {
            println!("  renamed: {} -> {}", from, to);
        }
        if !report.scaled.is_empty() {
            println!("  scaled to millions: {}", report.scaled.join(", "));
        }
        if !report.zero_filled.is_empty() {
            println!("  missing values set to 0: {}", report.zero_filled.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["fin_dashboard"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("Intel_Financial_Data.xlsx"));
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::try_parse_from([
            "fin_dashboard",
            "render",
            "--output",
            "out.html",
            "--input",
            "data.xlsx",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("data.xlsx"));
        assert_eq!(
            cli.command,
            Some(Commands::Render {
                output: PathBuf::from("out.html")
            })
        );

        let cli = Cli::try_parse_from(["fin_dashboard", "serve", "--port", "8050"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: Some(8050),
                open: false,
            })
        );

        let cli = Cli::try_parse_from(["fin_dashboard", "serve", "--open"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: None,
                open: true,
            })
        );
    }

    #[test]
    fn test_browser_command_targets_url() {
        let (program, args) = browser_command("http://127.0.0.1:8050/");
        assert!(!program.is_empty());
        assert_eq!(args.last().map(String::as_str), Some("http://127.0.0.1:8050/"));
    }

    #[test]
    fn test_load_error_messages() {
        let path = Path::new("Intel_Financial_Data.xlsx");
        assert_eq!(
            load_error_message(path, &DashboardError::FileNotFound("x".into())),
            "Error: The file 'Intel_Financial_Data.xlsx' was not found. Make sure it's in the correct directory."
        );
        assert_eq!(
            load_error_message(path, &DashboardError::SheetNotFound("Balance Sheet".into())),
            "Error: Sheet name 'Balance Sheet' not found in the Excel file. Please check sheet names."
        );
        assert!(load_error_message(path, &DashboardError::EmptySheet("Balance Sheet".into()))
            .starts_with("An unexpected error occurred: "));
    }
}
