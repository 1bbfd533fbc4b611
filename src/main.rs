use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use hearthbook::app;
use hearthbook::autoregister::AutoRegistrar;
use hearthbook::clock::Clock;
use hearthbook::config::{default_config_path, ResolvedConfig};
use hearthbook::dates::{parse_date, MonthKey};
use hearthbook::models::TransactionType;
use hearthbook::storage::JsonFileStorage;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "hearthbook")]
#[command(about = "Household budget book with recurring fixed expenses")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,

    /// Register today's due recurring expenses (at most once per day)
    AutoRegister,

    /// Register one recurring expense on a given date
    RegisterRecurring {
        id: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Record a transaction
    AddTransaction {
        #[arg(long = "type", value_parser = parse_kind_arg)]
        kind: TransactionType,
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: i64,
        /// Defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Defaults to the configured user
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },

    /// Delete a transaction by id
    DeleteTransaction { id: String },

    /// Define a recurring fixed expense
    AddRecurring {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: i64,
        /// Day of month to register on (1-31)
        #[arg(long)]
        day: u32,
        #[arg(long, default_value_t = 0)]
        monthly_increase: i64,
        /// Escalation anchor (YYYY-MM-DD); defaults to today
        #[arg(long)]
        base_date: Option<String>,
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },

    /// Pause or resume a recurring expense
    SetRecurringActive {
        id: String,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// Delete a recurring expense (its transactions are kept)
    RemoveRecurring { id: String },

    /// List transactions, newest first
    ListTransactions {
        #[arg(long, value_parser = parse_month_arg)]
        month: Option<MonthKey>,
    },

    /// List recurring expenses with today's amounts
    ListRecurring,

    /// Monthly summary with comparison against the previous month
    Report {
        /// Defaults to the current month
        #[arg(long, value_parser = parse_month_arg)]
        month: Option<MonthKey>,
    },

    /// Month-by-month totals ending at the current month
    Trend {
        #[arg(long)]
        months: Option<usize>,
    },

    /// Value stock holdings
    Portfolio,

    /// Add or replace a stock holding
    AddHolding {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        average_price: i64,
        #[arg(long)]
        current_price: Option<i64>,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_month_arg(s: &str) -> Result<MonthKey, String> {
    s.parse().map_err(|e: hearthbook::dates::MonthError| e.to_string())
}

fn parse_kind_arg(s: &str) -> Result<TransactionType, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load hearthbook config: {}", cli.config.display()))?;
    let storage = JsonFileStorage::new(&config.data_dir);
    let clock = config.clock();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Config => print_json(&app::config_output(&cli.config, &config))?,
        Command::AutoRegister => print_json(&app::auto_register(&storage, &config).await?)?,
        Command::RegisterRecurring { id, date } => {
            let registrar = AutoRegistrar::new(Arc::new(storage.check_marker(&config.user_id)?))
                .with_clock(Arc::new(clock.clone()));
            let date = date.unwrap_or_else(|| clock.today());
            let output =
                app::register_recurring(&storage, &storage, &registrar, &config, &id, date)
                    .await?;
            print_json(&output)?;
        }
        Command::AddTransaction {
            kind,
            category,
            amount,
            date,
            user,
            subcategory,
            payment_method,
            memo,
        } => {
            let input = app::NewTransaction {
                kind,
                category,
                amount,
                date,
                user_id: user,
                subcategory,
                payment_method,
                memo,
            };
            print_json(&app::add_transaction(&storage, &config, input).await?)?;
        }
        Command::DeleteTransaction { id } => {
            print_json(&app::delete_transaction(&storage, &id).await?)?
        }
        Command::AddRecurring {
            name,
            category,
            amount,
            day,
            monthly_increase,
            base_date,
            start,
            end,
            subcategory,
            payment_method,
            memo,
        } => {
            let input = app::NewRecurring {
                name,
                category,
                amount,
                auto_register_date: day,
                monthly_increase,
                base_date,
                start_date: start,
                end_date: end,
                subcategory,
                payment_method,
                memo,
            };
            print_json(&app::add_recurring(&storage, &config, input).await?)?;
        }
        Command::SetRecurringActive { id, active } => {
            print_json(&app::set_recurring_active(&storage, &id, active).await?)?
        }
        Command::RemoveRecurring { id } => {
            print_json(&app::remove_recurring(&storage, &id).await?)?
        }
        Command::ListTransactions { month } => {
            print_json(&app::list_transactions(&storage, &config, month).await?)?
        }
        Command::ListRecurring => {
            print_json(&app::list_recurring(&storage, &config, clock.today()).await?)?
        }
        Command::Report { month } => {
            let month = month.unwrap_or_else(|| MonthKey::of(clock.today()));
            print_json(&app::monthly_report(&storage, &config, month).await?)?;
        }
        Command::Trend { months } => {
            let end = MonthKey::of(clock.today());
            print_json(&app::trend(&storage, &config, end, months).await?)?;
        }
        Command::Portfolio => print_json(&app::portfolio(&storage, &config).await?)?,
        Command::AddHolding {
            symbol,
            name,
            quantity,
            average_price,
            current_price,
        } => {
            let input = app::NewHolding {
                symbol,
                name,
                quantity,
                average_price,
                current_price,
            };
            print_json(&app::add_holding(&storage, input).await?)?;
        }
    }

    Ok(())
}
