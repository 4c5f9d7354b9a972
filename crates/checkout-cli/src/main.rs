//! Checkout CLI
//!
//! Talks to the same payment API as the web form: check a form, open a
//! payment session, or verify an order without going through the browser.

use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_core::{
    CheckoutAttempt, CheckoutConfig, CheckoutOrchestrator, FormData, FormField, Notifier, OrderId,
    Verification,
};
use checkout_runtime::{BackendConfig, HttpPaymentBackend};

#[derive(Debug, Parser)]
#[command(name = "checkout", version, about = "Payment API client")]
struct Cli {
    /// Payment API origin (overrides CHECKOUT_API_BASE_URL)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the form constraints without contacting the API
    Validate(FormArgs),
    /// Request a payment session and print its identifiers
    Session(FormArgs),
    /// Ask the API to verify an order
    Verify {
        #[arg(long)]
        order_id: String,
    },
}

#[derive(Debug, Args)]
struct FormArgs {
    #[arg(long, default_value = "")]
    customer_id: String,
    #[arg(long, default_value = "")]
    customer_phone: String,
    #[arg(long, default_value = "")]
    customer_name: String,
    #[arg(long, default_value = "")]
    customer_email: String,
    #[arg(long, default_value = "")]
    amount: String,
}

impl FormArgs {
    fn into_form(self) -> FormData {
        FormData::new()
            .with(FormField::CustomerId, self.customer_id)
            .with(FormField::CustomerPhone, self.customer_phone)
            .with(FormField::CustomerName, self.customer_name)
            .with(FormField::CustomerEmail, self.customer_email)
            .with(FormField::Amount, self.amount)
    }
}

/// Prints notifications to stdout
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

fn build_orchestrator(api_base_url: Option<String>, form: FormData) -> anyhow::Result<CheckoutOrchestrator> {
    let mut backend_config = BackendConfig::from_env();
    if let Some(url) = api_base_url {
        backend_config.base_url = url;
    }
    tracing::debug!(base_url = %backend_config.base_url, "Using payment API");

    let orchestrator = CheckoutOrchestrator::builder()
        .backend(Rc::new(HttpPaymentBackend::new(backend_config)?))
        .notifier(Rc::new(TerminalNotifier))
        .config(CheckoutConfig::from_env()?)
        .form(form)
        .build()?;

    Ok(orchestrator)
}

fn check_form(form: &FormData) -> anyhow::Result<()> {
    if let Err(err) = form.validate() {
        for issue in err.issues() {
            eprintln!("  {}: {}", issue.field, issue);
        }
        bail!("form has {} invalid field(s)", err.issues().len());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate(args) => {
            let form = args.into_form();
            check_form(&form)?;
            let amount = form.amount().context("amount did not parse")?;
            println!("Form is valid, amount {amount}");
        }
        Command::Session(args) => {
            let form = args.into_form();
            check_form(&form)?;

            let orchestrator = build_orchestrator(cli.api_base_url, form)?;
            let mut attempt = CheckoutAttempt::new();
            orchestrator.request_session(&mut attempt).await?;

            let grant = attempt.grant().context("session request returned no grant")?;
            println!("{}", serde_json::to_string_pretty(grant)?);
        }
        Command::Verify { order_id } => {
            let orchestrator = build_orchestrator(cli.api_base_url, FormData::new())?;
            let order_id = OrderId::new(order_id);

            match orchestrator.verify_payment(&order_id).await? {
                Verification::Confirmed => {}
                Verification::Unconfirmed => bail!("order {order_id} is not verified"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_args_build_form() {
        let cli = Cli::try_parse_from([
            "checkout",
            "session",
            "--customer-id",
            "C1",
            "--customer-phone",
            "9999999999",
            "--customer-name",
            "Jane",
            "--customer-email",
            "j@x.com",
            "--amount",
            "100.50",
        ])
        .unwrap();

        let Command::Session(args) = cli.command else {
            panic!("expected session subcommand");
        };
        let form = args.into_form();
        assert!(form.validate().is_ok());
        assert_eq!(form.customer_name, "Jane");
    }

    #[test]
    fn test_missing_fields_fail_check() {
        let cli = Cli::try_parse_from(["checkout", "validate", "--amount", "1.234"]).unwrap();
        let Command::Validate(args) = cli.command else {
            panic!("expected validate subcommand");
        };
        assert!(check_form(&args.into_form()).is_err());
    }

    #[test]
    fn test_global_api_override() {
        let cli = Cli::try_parse_from([
            "checkout",
            "verify",
            "--order-id",
            "ord_1",
            "--api-base-url",
            "http://localhost:3000",
        ])
        .unwrap();
        assert_eq!(cli.api_base_url.as_deref(), Some("http://localhost:3000"));
    }
}
