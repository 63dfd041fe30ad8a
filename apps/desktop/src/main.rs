mod controller;
mod render;
mod shell;

use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, ApiClient, FileTokenStore, MemoryTokenStore, TokenStore};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

use controller::{LoginForm, RegisterForm, SessionController, UserAction};
use shell::{parse_line, ShellCommand, ShellDefaults, HELP};

#[derive(Parser, Debug)]
#[command(name = "glowup-desktop", about = "Terminal client for the Glow-Up AI backend")]
struct Args {
    /// TOML settings file; defaults to `client.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Keep the session token in memory only.
    #[arg(long)]
    ephemeral: bool,
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = client_core::config::normalize_base_url(&url)?;
    }
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    let store: Arc<dyn TokenStore> = if args.ephemeral {
        Arc::new(MemoryTokenStore::new())
    } else {
        Arc::new(FileTokenStore::in_dir(&settings.data_dir))
    };
    let gateway = Arc::new(ApiClient::new(&settings, store).context("building API client")?);
    info!(api = %settings.api_base_url, "starting glow-up client");

    let controller = SessionController::new(gateway);
    controller.bootstrap().await;
    print!("{}", render::render(&controller.snapshot().await));

    let defaults = ShellDefaults {
        plan_weeks: settings.default_plan_weeks,
        progress_days: settings.default_progress_days,
    };
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = prompt(&mut input, "> ").await? {
        let command = match parse_line(&line, defaults) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        if let Some(form) = command.form_view() {
            if !controller.open_form(form).await {
                println!("sign out first to use the {form} form");
                continue;
            }
        }

        let action = match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ShellCommand::Action(action) => action,
            ShellCommand::Register => match read_register_form(&mut input).await? {
                Some(form) => UserAction::SubmitRegister(form),
                None => break,
            },
            ShellCommand::Login => match read_login_form(&mut input).await? {
                Some(form) => UserAction::SubmitLogin(form),
                None => break,
            },
        };

        controller.handle(action).await;
        print!("{}", render::render(&controller.snapshot().await));
    }

    info!("shell closed");
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn read_login_form(input: &mut Input) -> Result<Option<LoginForm>> {
    let Some(email) = prompt(input, "email: ").await? else {
        return Ok(None);
    };
    let Some(password) = prompt(input, "password: ").await? else {
        return Ok(None);
    };
    Ok(Some(LoginForm { email, password }))
}

async fn read_register_form(input: &mut Input) -> Result<Option<RegisterForm>> {
    let mut fields = Vec::with_capacity(7);
    for label in [
        "name: ",
        "email: ",
        "password: ",
        "age: ",
        "weight (kg): ",
        "height (cm): ",
        "goal (lose_weight|gain_muscle|maintain_weight|improve_endurance): ",
    ] {
        match prompt(input, label).await? {
            Some(value) => fields.push(value),
            None => return Ok(None),
        }
    }
    let [name, email, password, age, weight, height, goal]: [String; 7] = fields
        .try_into()
        .map_err(|_| anyhow::anyhow!("incomplete register form"))?;
    Ok(Some(RegisterForm {
        name,
        email,
        password,
        age,
        weight,
        height,
        goal,
    }))
}
