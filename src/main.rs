// teamgate/src/main.rs
mod backend;
mod cli;
mod config;
mod db;
mod form;
mod models;
mod storage;
mod utils;

use crate::backend::http::HttpBackend;
use crate::backend::store::StoreBackend;
use crate::backend::AuthBackend;
use crate::cli::{Cli, Command, LoginArgs, SignupArgs};
use crate::config::{BackendKind, Config};
use crate::db::Database;
use crate::form::banner::TerminalBanner;
use crate::form::controller::{FormController, SubmitOutcome};
use crate::form::fields::{InputField, LoginForm, SignupForm};
use crate::storage::client_state::{ClientState, USER_EMAIL_KEY};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const APPROVAL_NOTICE: &str = "Your account has been created and is pending approval from a coach. \
You will be able to log in once approved.";

async fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn AuthBackend>> {
    match config.backend {
        BackendKind::Http => {
            tracing::info!("🔌 Using portal API at {}", config.backend_url);
            let backend = HttpBackend::new(config.backend_url.clone(), config.request_timeout())?;
            Ok(Arc::new(backend))
        }
        BackendKind::Store => {
            tracing::info!("📊 Opening document store: {}", config.store_database_url);
            let db = Database::new(&config.store_database_url).await?;
            db.migrate().await?;
            Ok(Arc::new(StoreBackend::new(db)))
        }
    }
}

async fn build_controller(config: &Config) -> anyhow::Result<FormController> {
    let backend = build_backend(config).await?;
    let client_state = ClientState::open(&config.client_state_path)?;
    Ok(FormController::new(
        backend,
        Arc::new(TerminalBanner::new()),
        client_state,
        config.form_settings(),
    ))
}

fn summarize(fields: &[(&str, &InputField)]) {
    for (label, field) in fields {
        println!("  {:<18}{}", format!("{}:", label), field.rendered());
    }
}

async fn run_login(controller: &FormController, args: LoginArgs) -> anyhow::Result<SubmitOutcome> {
    let mut form = LoginForm::new(
        cli::value_or_prompt(args.email, "Email")?,
        cli::secret_or_prompt(args.password, "Password")?,
    );
    if args.show_password {
        form.password.toggle_visibility();
    }
    summarize(&[("Email", &form.email), ("Password", &form.password)]);

    Ok(controller.login(&form).await)
}

async fn run_signup(controller: &FormController, args: SignupArgs) -> anyhow::Result<SubmitOutcome> {
    let mut form = SignupForm::new(
        cli::value_or_prompt(args.email, "Email")?,
        cli::value_or_prompt(args.username, "Username")?,
        cli::secret_or_prompt(args.password, "Password")?,
        cli::secret_or_prompt(args.confirm_password, "Confirm password")?,
    );
    if args.show_password {
        form.password.toggle_visibility();
        form.confirm_password.toggle_visibility();
    }
    summarize(&[
        ("Email", &form.email),
        ("Username", &form.username),
        ("Password", &form.password),
        ("Confirm password", &form.confirm_password),
    ]);

    Ok(controller.signup(&mut form).await)
}

fn show_status(config: &Config) -> anyhow::Result<()> {
    let state = ClientState::open(&config.client_state_path)?;
    match state.current_user() {
        Some(user) => {
            println!("✓ Logged in as {}", user.email);
            if let Some(name) = user.name {
                println!("  Name: {}", name);
            }
            if let Some(role) = user.role {
                println!("  Role: {}", role);
            }
        }
        None => match state.get_item(USER_EMAIL_KEY) {
            Some(email) => println!("Last login: {}", email),
            None => println!("Not logged in"),
        },
    }
    println!("  State file: {}", state.path().display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; .env may also carry the form fields
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(cli::verbosity_level(args.verbose).into())
                .from_env_lossy(),
        )
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let (controller, outcome) = match args.command {
        Command::Status => return show_status(&config),
        Command::Login(login) => {
            let controller = build_controller(&config).await?;
            let outcome = run_login(&controller, login).await?;
            (controller, outcome)
        }
        Command::Signup(signup) => {
            let controller = build_controller(&config).await?;
            let outcome = run_signup(&controller, signup).await?;
            (controller, outcome)
        }
    };

    match &outcome {
        SubmitOutcome::LoggedIn { user, redirect } => {
            println!("✅ Welcome, {}", user.name.as_deref().unwrap_or(&user.email));
            println!("➡️  Redirecting to {}", redirect);
        }
        SubmitOutcome::SignedUp {
            pending_approval: true,
        } => {
            println!("{}", APPROVAL_NOTICE);
        }
        _ => {}
    }

    if !outcome.is_success() {
        tracing::debug!(
            "Submit ended with {:?}; banner: {:?}; queued: {:?}",
            outcome,
            controller.current_message().await,
            controller.error_codes().await
        );
        std::process::exit(1);
    }

    Ok(())
}
