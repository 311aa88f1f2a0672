//! `lessonlog` - CLI for the lessonlog record book
//!
//! Each invocation loads the record, applies one command, prints the result
//! to stdout and any notifications to stderr.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use lessonlog::cli::{
    sort_state, Cli, Command, ConfigCommand, FormCommand, SchoolCommand, StrategyCommand,
    SubjectCommand,
};
use lessonlog::confirm::{AssumeYes, Confirm, StdinConfirm};
use lessonlog::generation::{GeminiClient, TextGenerator};
use lessonlog::notify::Kind;
use lessonlog::view::{self, RenderOptions, Reports, StrategyTable, NO_SUBJECTS_MESSAGE};
use lessonlog::{init_logging, App, Config, Error, Snapshot, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    let command = match cli.command {
        Command::Config(cmd) => return handle_config(&config, cmd),
        command => command,
    };

    let store = Store::open(config.database_path())?;
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config.generation)?);
    let mut app = App::new(store, generator, &config);

    let result = run(&mut app, &config, command).await;
    print_notifications(&mut app, cli.quiet);

    match result {
        Err(e) if e.downcast_ref::<Error>().is_some_and(Error::is_cancelled) => {
            eprintln!("Cancelled.");
            Ok(())
        }
        other => other,
    }
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &AssumeYes
    } else {
        &StdinConfirm
    }
}

fn print_notifications(app: &mut App, quiet: bool) {
    for note in app.take_notifications().iter().rev() {
        if quiet && note.kind != Kind::Error {
            continue;
        }
        eprintln!("{note}");
    }
}

async fn run(app: &mut App, config: &Config, command: Command) -> anyhow::Result<()> {
    let bar_width = config.display.bar_width;

    match command {
        Command::Show(show) => {
            app.set_view(show.view.into());
            let options = RenderOptions {
                sort: sort_state(&show.sort),
                bar_width,
            };
            print!("{}", view::render(app.state(), &options));
        }
        Command::Form(FormCommand::Set { field, value }) => {
            app.set_form_field(&field, &value)?;
            println!("Updated {field}.");
        }
        Command::Strategy(cmd) => handle_strategy(app, cmd).await?,
        Command::Report(cmd) => {
            let report = if cmd.generate {
                app.generate_report().await?
            } else {
                app.report()
            };
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", Reports::new(&report, bar_width));
            }
        }
        Command::School(cmd) => match cmd {
            SchoolCommand::Set { field, value } => {
                app.set_school_field(&field, &value)?;
                println!("Updated {field}.");
            }
            SchoolCommand::Logo { file } => app.set_logo(&file).await?,
            SchoolCommand::ClearLogo => app.clear_logo(),
        },
        Command::Subject(cmd) => match cmd {
            SubjectCommand::List => {
                let subjects = &app.state().subjects;
                if subjects.is_empty() {
                    println!("{NO_SUBJECTS_MESSAGE}");
                }
                for subject in subjects {
                    println!("{subject}");
                }
            }
            SubjectCommand::Add { name } => app.add_subject(&name)?,
            SubjectCommand::Delete { name, yes } => app.delete_subject(&name, confirmer(yes))?,
        },
        Command::Font(cmd) => {
            let size = app.set_font_size(cmd.size);
            println!("Font size: {size}px");
        }
        Command::Reset(cmd) => app.reset(confirmer(cmd.yes))?,
        Command::Export => {
            println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
        }
        Command::Import(cmd) => {
            let text = tokio::fs::read_to_string(&cmd.file)
                .await
                .with_context(|| format!("failed to read {}", cmd.file.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a lessonlog export", cmd.file.display()))?;
            app.import(snapshot, confirmer(cmd.yes))?;
        }
        Command::Status(cmd) => handle_status(app, config, cmd.json)?,
        Command::Config(cmd) => handle_config(config, cmd)?,
    }
    Ok(())
}

async fn handle_strategy(app: &mut App, cmd: StrategyCommand) -> lessonlog::Result<()> {
    match cmd {
        StrategyCommand::List { sort } => {
            let rows = &app.state().form_data.strategies;
            print!("{}", StrategyTable::new(rows, sort_state(&sort)));
        }
        StrategyCommand::Add => {
            let id = app.add_strategy()?;
            println!("Added strategy {id}.");
        }
        StrategyCommand::Edit { id, field, value } => {
            app.edit_strategy(id, &field, &value)?;
            println!("Updated strategy {id}.");
        }
        StrategyCommand::Delete { id, yes } => app.delete_strategy(id, confirmer(yes))?,
        StrategyCommand::Describe { id, text, generate } => {
            if generate {
                let text = app.generate_description(id).await?;
                println!("{text}");
            } else if let Some(text) = text {
                app.set_description(id, &text)?;
            }
        }
        StrategyCommand::Suggest { id } => {
            let id = app.suggest_strategy(id).await?;
            if let Some(row) = app.state().form_data.strategy(id) {
                println!("{id}: {}", row.name);
            }
        }
    }
    Ok(())
}

fn handle_status(app: &App, config: &Config, json: bool) -> lessonlog::Result<()> {
    let stats = app.store().stats()?;
    let keys = app.store().keys()?;
    let has_key = config.generation.resolved_api_key().is_some();

    if json {
        let status = serde_json::json!({
            "database_path": app.store().path(),
            "keys": keys,
            "key_count": stats.key_count,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
            "model": config.generation.model,
            "api_key_configured": has_key,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("lessonlog status");
        println!("----------------");
        println!("Database:      {}", app.store().path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Stored keys:   {}", keys.join(", "));
        match stats.last_updated {
            Some(at) => println!("Last updated:  {}", at.to_rfc3339()),
            None => println!("Last updated:  never"),
        }
        println!("Model:         {}", config.generation.model);
        println!(
            "API key:       {}",
            if has_key { "configured" } else { "not configured" }
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut value = serde_json::to_value(config)?;
                if let Some(key) = value.pointer_mut("/generation/api_key") {
                    if !key.is_null() {
                        *key = serde_json::Value::String("<redacted>".to_string());
                    }
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Generation]");
                println!("  Model:               {}", config.generation.model);
                println!("  Endpoint:            {}", config.generation.endpoint);
                println!("  Timeout (secs):      {}", config.generation.timeout_secs);
                println!(
                    "  Suggestion attempts: {}",
                    config.generation.suggestion_attempts
                );
                println!(
                    "  API key:             {}",
                    if config.generation.resolved_api_key().is_some() {
                        "configured"
                    } else {
                        "not configured"
                    }
                );
                println!();
                println!("[Notifications]");
                println!("  TTL (secs):          {}", config.notifications.ttl_secs);
                println!();
                println!("[Display]");
                println!("  Bar width:           {}", config.display.bar_width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
