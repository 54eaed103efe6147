//! Terminal front-end.
//!
//! Each subcommand drives one page container and prints its view model to
//! stdout as pretty JSON. Logs go to stderr.

use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    configuration::{get_configuration, set_configuration, AppState, Config, State},
    error::Error,
    handler::{
        applications::ApplicationsPage, banks::BanksPage, dashboard::DashboardPage,
        new_application::NewApplicationForm, transactions::TransactionsPage, PageState,
    },
    helpers::chart::render_donut_svg,
    model::User,
    types::{RegisterRequest, TransactionQuery},
};

/// EasyFund loan marketplace
#[derive(Parser)]
#[command(name = "easyfund")]
#[command(about = "EasyFund loan marketplace client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Drop the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Balances, debt, spending and recent activity
    Dashboard {
        /// Also write the debt donut chart to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Loans and applications as one list of credit offers
    Applications {
        #[arg(long, default_value = "")]
        search: String,

        /// Status code, or `all`
        #[arg(long)]
        status: Option<String>,
    },

    /// Submit an application to one or more banks
    Apply {
        /// PERSONAL, MORTGAGE, AUTO or OTHER
        #[arg(long, default_value = "PERSONAL")]
        template: String,

        /// Bank id, repeat for several banks
        #[arg(long = "bank", required = true)]
        banks: Vec<i64>,

        /// Percentage per bank, in the same order as --bank
        #[arg(long = "share")]
        shares: Vec<u32>,

        #[arg(long)]
        amount: String,
    },

    /// Partner banks with their rates
    Banks,

    /// Transaction history
    Transactions {
        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        offset: Option<i64>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        bank: Option<i64>,
    },
}

pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub fn init_state() -> Result<AppState<State>, Error> {
    let config = init_config()?;
    let state = State::new(config)?;
    Ok(AppState::new(state))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Commands, app_state: AppState<State>) -> Result<(), Error> {
    match command {
        Commands::Login { email, password } => {
            let session = app_state.auth.login(&email, &password).await?;
            print_json(&session.user)
        },
        Commands::Register {
            full_name,
            email,
            phone,
            password,
        } => {
            let request = RegisterRequest {
                full_name,
                email,
                phone,
                password,
            };
            let session = app_state.auth.register(&request).await?;
            print_json(&session.user)
        },
        Commands::Logout => {
            app_state.auth.logout().await?;
            print_json(&json!({ "state": "anonymous" }))
        },
        Commands::Whoami => run_whoami(app_state).await,
        Commands::Dashboard { svg } => run_dashboard(app_state, svg).await,
        Commands::Applications { search, status } => {
            let page = ApplicationsPage::new(app_state);
            match page.load().await? {
                PageState::Ready(_) => print_json(&page.filtered(&search, status.as_deref())),
                state => print_json(&state),
            }
        },
        Commands::Apply {
            template,
            banks,
            shares,
            amount,
        } => run_apply(app_state, template, banks, shares, amount).await,
        Commands::Banks => {
            let page = BanksPage::new(app_state);
            print_json(&page.load().await?)
        },
        Commands::Transactions {
            limit,
            offset,
            category,
            from,
            to,
            bank,
        } => {
            let query = TransactionQuery {
                limit,
                offset,
                category,
                from,
                to,
                bank_id: bank,
            };
            let page = TransactionsPage::new(app_state);
            print_json(&page.load(&query).await?)
        },
    }
}

/// Confirms the stored session with the backend; the stored user is
/// printed when the backend cannot be reached.
async fn run_whoami(app_state: AppState<State>) -> Result<(), Error> {
    let session = app_state.require_session()?;

    match app_state.api.me().await {
        Ok(raw) => print_json(&User::decode(raw)?),
        Err(Error::Unauthorized()) => Err(Error::Unauthorized()),
        Err(e) => {
            warn!("Could not refresh profile: {}", e);
            print_json(&session.user)
        },
    }
}

async fn run_dashboard(app_state: AppState<State>, svg: Option<PathBuf>) -> Result<(), Error> {
    let geometry = app_state.dashboard_options().geometry;
    let page = DashboardPage::new(app_state);
    let state = page.load().await?;

    if let (Some(path), PageState::Ready(dashboard)) = (svg, &state) {
        fs::write(&path, render_donut_svg(&dashboard.debt_segments, &geometry))?;
        info!("Debt chart written to {}", path.display());
    }

    print_json(&state)
}

async fn run_apply(
    app_state: AppState<State>,
    template: String,
    banks: Vec<i64>,
    shares: Vec<u32>,
    amount: String,
) -> Result<(), Error> {
    let mut form = NewApplicationForm::new(app_state);
    form.load().await?;
    form.select_template(&template)?;

    for bank_id in &banks {
        form.select_bank(*bank_id)?;
    }

    if shares.is_empty() {
        form.distribute_evenly();
    } else {
        let weights: Vec<(i64, u32)> = banks.iter().copied().zip(shares).collect();
        form.set_shares(&weights);
    }

    form.set_amount_text(&amount);

    let result = form.submit().await;

    print_json(&json!({
        "message": form.message(),
        "history": form.history.state(),
    }))?;

    result.map(|created| info!("{} applications created", created.len()))
}
