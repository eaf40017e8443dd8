//! # depot
//!
//! Command-line host for the back-office rules in depot-core.
//!
//! ## Usage
//! ```bash
//! # Check a discount definition
//! depot validate-discount discount.json
//!
//! # Price an item with a discount
//! depot apply-discount discount.json --price 49.90 --currency EUR
//!
//! # Best of several discounts for one product in one category
//! depot best-discount discounts.json --price 49.90 --product p-7 --category cat-2
//!
//! # Rent dates for the first quarter
//! depot occurrences rent.json --from 2025-01-01 --to 2025-03-31
//!
//! # Fixed-rate conversion
//! depot convert 100 EUR CZK
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`, or `-v`).

mod commands;
mod config;
mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use depot_core::{Currency, LineItem, Money};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::config::DepotConfig;
use crate::error::{CliError, CliResult};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "depot")]
#[command(about = "Discount and recurring-expense rules for the Depot back office")]
#[command(version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Command {
    /// List every problem with a discount definition
    ValidateDiscount {
        /// Discount record (JSON)
        file: PathBuf,
    },

    /// Price one item with one discount
    ApplyDiscount {
        /// Discount record (JSON)
        file: PathBuf,

        #[command(flatten)]
        item: ItemArgs,
    },

    /// Pick the lowest final price among active discounts
    BestDiscount {
        /// Array of discount records (JSON)
        file: PathBuf,

        #[command(flatten)]
        item: ItemArgs,

        /// Point in time for the active check, RFC 3339 (default: now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },

    /// Dates a recurring expense falls on
    Occurrences {
        /// Expense record (JSON)
        file: PathBuf,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },

    /// Validate an array of expenses
    ValidateExpenses {
        /// Array of expense records (JSON)
        file: PathBuf,
    },

    /// Total an array of expenses in one currency
    ExpenseTotal {
        /// Array of expense records (JSON)
        file: PathBuf,

        /// Report currency (default: from config)
        #[arg(long, value_parser = parse_currency)]
        currency: Option<Currency>,
    },

    /// Generate a new expense id
    ExpenseId {
        /// Expense date (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Convert an amount at the configured fixed rates
    Convert {
        #[arg(allow_negative_numbers = true, value_parser = parse_money)]
        amount: Money,

        #[arg(value_parser = parse_currency)]
        from: Currency,

        #[arg(value_parser = parse_currency)]
        to: Currency,
    },
}

/// The line item a discount is priced against.
#[derive(Debug, PartialEq, Args)]
struct ItemArgs {
    /// Original price (decimal)
    #[arg(long, value_parser = parse_money)]
    price: Money,

    /// Price currency (default: EUR)
    #[arg(long, value_parser = parse_currency)]
    currency: Option<Currency>,

    /// Product id, for product-scoped discounts
    #[arg(long)]
    product: Option<String>,

    /// Category id, for category-scoped discounts
    #[arg(long)]
    category: Option<String>,
}

impl ItemArgs {
    fn into_line_item(self) -> LineItem {
        LineItem::priced(self.price, self.currency.unwrap_or_default())
            .identified(self.product, self.category)
    }
}

fn parse_money(raw: &str) -> Result<Money, String> {
    let amount: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    Money::from_major(amount).map_err(|e| e.to_string())
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    raw.parse::<Currency>().map_err(|e| e.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("{} (expected YYYY-MM-DD)", e))
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> ExitCode {
    // clap prints help and version itself and exits with 2 on bad arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            if let CliError::Core(depot_core::CoreError::Validation(errors)) = &e {
                // Field errors go to stdout too, so callers can show them per field.
                if let Ok(json) = serde_json::to_string_pretty(errors) {
                    println!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `-v` - Same as `RUST_LOG=debug`
/// - Default: INFO level
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let config = DepotConfig::load(cli.config)?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::ValidateDiscount { file } => {
            print_json(&commands::validate_discount_json(&read(&file)?)?)
        }
        Command::ApplyDiscount { file, item } => {
            print_json(&commands::apply_discount_json(&read(&file)?, &item.into_line_item())?)
        }
        Command::BestDiscount { file, item, at } => print_json(&commands::best_discount_json(
            &read(&file)?,
            &item.into_line_item(),
            at.unwrap_or_else(Utc::now),
        )?),
        Command::Occurrences { file, from, to } => {
            print_json(&commands::occurrences_json(&read(&file)?, from, to)?)
        }
        Command::ValidateExpenses { file } => {
            print_json(&commands::validate_expenses_json(&read(&file)?)?)
        }
        Command::ExpenseTotal { file, currency } => {
            print_json(&commands::expense_total_json(&read(&file)?, currency, &config)?)
        }
        Command::ExpenseId { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            print_json(&commands::expense_id(date, &config))
        }
        Command::Convert { amount, from, to } => {
            print_json(&commands::convert_amount(amount, from, to, &config)?)
        }
    }
}

fn read(path: &Path) -> CliResult<String> {
    debug!(?path, "Reading input");
    Ok(std::fs::read_to_string(path)?)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("depot").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn parse_error(args: &[&str]) -> ErrorKind {
        Cli::try_parse_from(std::iter::once("depot").chain(args.iter().copied()))
            .unwrap_err()
            .kind()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_error(&["-h"]), ErrorKind::DisplayHelp);
        assert_eq!(parse_error(&["convert", "--help"]), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["depot", "expense-id", "-v", "--config", "depot.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("depot.toml")));
        assert_eq!(cli.command, Command::ExpenseId { date: None });
    }

    #[test]
    fn test_apply_discount_args() {
        let Command::ApplyDiscount { file, item } =
            command(&["apply-discount", "d.json", "--price", "19.99", "--currency", "czk"])
        else {
            panic!("expected apply-discount");
        };
        assert_eq!(file, PathBuf::from("d.json"));

        let item = item.into_line_item();
        assert_eq!(item.original_price, Money::from_minor(1999));
        assert_eq!(item.currency, Currency::Czk);
        assert_eq!(item.product_id, None);

        assert_eq!(
            parse_error(&["apply-discount", "d.json"]),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_item_identity_args() {
        let Command::BestDiscount { item, at, .. } = command(&[
            "best-discount",
            "all.json",
            "--price",
            "20",
            "--product",
            "p-scarf",
            "--category",
            "cat-winter",
            "--at",
            "2025-06-01T12:00:00Z",
        ]) else {
            panic!("expected best-discount");
        };
        assert!(at.is_some());

        let item = item.into_line_item();
        assert_eq!(item.product_id.as_deref(), Some("p-scarf"));
        assert_eq!(item.category_id.as_deref(), Some("cat-winter"));
        assert_eq!(item.currency, Currency::Eur);
    }

    #[test]
    fn test_occurrences_args() {
        assert_eq!(
            command(&["occurrences", "e.json", "--from", "2025-01-01", "--to", "2025-12-31"]),
            Command::Occurrences {
                file: PathBuf::from("e.json"),
                from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            }
        );
        assert_eq!(
            parse_error(&["occurrences", "e.json", "--from", "01/01/2025", "--to", "2025-12-31"]),
            ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_convert_args() {
        assert_eq!(
            command(&["convert", "100", "EUR", "CZK"]),
            Command::Convert {
                amount: Money::from_minor(10_000),
                from: Currency::Eur,
                to: Currency::Czk,
            }
        );
        assert!(matches!(
            command(&["convert", "-5", "EUR", "CZK"]),
            Command::Convert { amount, .. } if amount.minor() == -500
        ));
        assert_eq!(parse_error(&["convert", "100", "EUR", "GBP"]), ErrorKind::ValueValidation);
        assert_eq!(parse_error(&["convert", "ten", "EUR", "CZK"]), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_unknown_command_and_option() {
        assert_eq!(parse_error(&["refund"]), ErrorKind::InvalidSubcommand);
        assert_eq!(parse_error(&["expense-id", "--bogus"]), ErrorKind::UnknownArgument);
        assert!(Cli::try_parse_from(["depot"]).is_err());
    }
}
