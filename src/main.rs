use assist_gateway::config::GatewayConfig;
use assist_gateway::domain::order::OrderFacts;
use assist_gateway::domain::ports::{CallbackUrls, RedirectGateway};
use assist_gateway::gateway::AssistGateway;
use assist_gateway::interfaces::csv::order_reader::OrderReader;
use assist_gateway::interfaces::csv::verdict_writer::VerdictWriter;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gateway settings as JSON. Without it, ASSIST_* environment variables are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the form that redirects a shopper to the payment page
    Redirect {
        /// Order snapshot as JSON
        #[arg(long)]
        order: PathBuf,
        /// Callback for successful payments
        #[arg(long)]
        return_ok: String,
        /// Callback for failed payments
        #[arg(long)]
        return_fail: String,
        /// Print an auto-submitting HTML page instead of JSON
        #[arg(long)]
        html: bool,
    },
    /// Ask the gateway whether an order was paid
    Check {
        /// Order snapshot as JSON
        #[arg(long)]
        order: PathBuf,
    },
    /// Check every order of a CSV file and print the verdicts as CSV
    Reconcile {
        /// Orders CSV file
        input: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path).into_diagnostic(),
        None => GatewayConfig::from_env().into_diagnostic(),
    }
}

fn load_order(path: &Path) -> Result<OrderFacts> {
    let raw = std::fs::read_to_string(path).into_diagnostic()?;
    serde_json::from_str(&raw).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let gateway = AssistGateway::new(load_config(cli.config.as_deref())?);

    match cli.command {
        Command::Redirect {
            order,
            return_ok,
            return_fail,
            html,
        } => {
            let order = load_order(&order)?;
            let callbacks = CallbackUrls {
                return_ok,
                return_fail,
            };
            let form = gateway.initiate_redirect(&order, &callbacks);
            if html {
                println!("{}", form.to_html());
            } else {
                println!("{}", serde_json::to_string_pretty(&form).into_diagnostic()?);
            }
        }
        Command::Check { order } => {
            let order = load_order(&order)?;
            if gateway.check_payment_status(&order).await {
                println!("order {} approved", order.order_id);
            } else {
                println!("order {} not approved", order.order_id);
            }
        }
        Command::Reconcile { input } => {
            let file = File::open(input).into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = VerdictWriter::new(stdout.lock());

            for order in OrderReader::new(file).orders() {
                match order {
                    Ok(order) => {
                        let approved = gateway.check_payment_status(&order).await;
                        writer.write(&order, approved).into_diagnostic()?;
                    }
                    Err(e) => {
                        eprintln!("Error reading order: {}", e);
                    }
                }
            }
            writer.flush().into_diagnostic()?;
        }
    }

    Ok(())
}
