//! TravelCare terminal chat client.
//!
//! Signs in against the mock auth backend, loads the policy holder's
//! profile and runs a chat session on stdin/stdout.

mod cli;
mod commands;
mod render;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use travelcare_assist::{ChatError, ChatSession, SessionDriver};
use travelcare_core::{AuthBackend, Catalog, MockAuthBackend, Route, SessionEvent, TravelCareConfig};

use crate::cli::CliArgs;
use crate::commands::Command;

const UPDATE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let mut config = TravelCareConfig::load_or_default(&config_path);
    let log_level = args.resolve_log_level(&config.general.log_level);

    // stdout carries the transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting TravelCare v{}", env!("CARGO_PKG_VERSION"));
    config.chat.dispatch_mode = args.resolve_dispatch_mode(config.chat.dispatch_mode);
    info!(
        config = %config_path.display(),
        mode = ?config.chat.dispatch_mode,
        "Configuration resolved"
    );

    // --- Sign in ---
    let auth: Arc<dyn AuthBackend> = Arc::new(MockAuthBackend::with_demo_account(
        Duration::from_millis(config.auth.latency_ms),
    ));
    let mut events = auth.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::SignedIn(session) => {
                    info!(user = %session.user_id, email = %session.email, "Signed in")
                }
                SessionEvent::SignedOut => info!("Signed out"),
            }
        }
    });

    let session = match auth.login(&args.resolve_credentials()).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Sign-in failed: {}", e);
            return Err(e.into());
        }
    };
    let route = Route::Chat.guard(auth.current_session().await.is_some());
    info!(route = %route, "Opening chat");

    let profile = auth.fetch_profile(session.user_id).await?;
    if profile.is_none() {
        warn!(user = %session.user_id, "Profile not available yet");
    }

    // --- Chat session ---
    let catalog = Arc::new(Catalog::demo());
    let mut chat = ChatSession::new(&config, catalog);
    if let Some(profile) = profile {
        chat = chat.with_profile(profile);
    }
    let (driver, handle, mut updates) = SessionDriver::new(chat, UPDATE_CAPACITY);
    let driver_task = tokio::spawn(driver.run());

    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            if let Err(e) = render::write_update(&mut std::io::stdout().lock(), &update, json) {
                debug!(error = %e, "Transcript write failed");
                break;
            }
        }
    });

    if !json {
        println!("{}\n", commands::HELP);
    }

    // Input ending lets pending replies land; /quit and ctrl-c drop them.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut drain = false;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => {
                    drain = true;
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("  ! {}", e);
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{}", commands::HELP),
            command => {
                let Some(input) = command.into_input() else { continue };
                if let Err(ChatError::SessionClosed) = handle.send(input).await {
                    warn!("Chat session closed");
                    break;
                }
            }
        }
    }

    // --- Shutdown ---
    if drain {
        info!("Input closed, waiting for pending replies");
    } else {
        handle.shutdown();
    }
    drop(handle);
    let chat = driver_task.await?;
    printer.await?;
    auth.logout().await?;

    info!(
        session = %chat.id(),
        messages = chat.messages().len(),
        "Chat ended"
    );
    Ok(())
}
