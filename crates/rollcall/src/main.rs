//! `rollcall` - CLI for attendance capture
//!
//! This binary provides the command-line interface for capturing scanned
//! attendance codes, watching a wedge scanner session, and inspecting the
//! roster and sync configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use rollcall::cli::{
    Cli, Command, ConfigCommand, RosterCommand, ScanCommand, StatusCommand, WatchCommand,
};
use rollcall::config::validate_endpoint_url;
use rollcall::scanner::{ScanSource, WedgeSource};
use rollcall::store::StoreEvent;
use rollcall::sync::hydrate_roster;
use rollcall::{
    init_logging, AttendanceRecord, AttendanceStats, CaptureFlow, CaptureOutcome, Config,
    InsightClient, ScanMethod, SheetClient, Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Scan(cmd) => handle_scan(&config, cmd).await,
        Command::Watch(cmd) => handle_watch(&config, cmd).await,
        Command::Roster(cmd) => handle_roster(&config, cmd).await,
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cli.config, cmd),
    }
}

async fn handle_scan(config: &Config, cmd: ScanCommand) -> Result<()> {
    let store = Arc::new(Store::with_seed());
    let sync = Arc::new(SheetClient::from_config(&config.sync));

    if sync.is_configured() {
        hydrate_roster(&store, &sync).await;
    }

    let flow = CaptureFlow::new(Arc::clone(&store), Arc::clone(&sync), config.match_policy());
    let outcome = flow.capture(&cmd.code, cmd.method.into());
    flow.drain().await;

    match outcome {
        CaptureOutcome::Recorded(record) => {
            // The store's copy carries the settled sync state.
            let final_state = store
                .log()
                .iter()
                .find(|entry| entry.id == record.id)
                .map(|entry| entry.sync_state);

            if cmd.json {
                let payload = serde_json::json!({
                    "outcome": "recorded",
                    "record": record,
                    "syncState": final_state.map(|state| state.to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Recorded: {}", format_record(&record));
                match final_state {
                    Some(state) if sync.is_configured() => println!("Sync:     {state}"),
                    Some(state) => println!("Sync:     {state} (local mode)"),
                    None => {}
                }
            }
        }
        CaptureOutcome::NotRegistered { code, method } => {
            if cmd.json {
                let payload = serde_json::json!({
                    "outcome": "notRegistered",
                    "code": code,
                    "method": method,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("No student matches \"{code}\" via {method}.");
            }
        }
    }
    Ok(())
}

async fn handle_watch(config: &Config, cmd: WatchCommand) -> Result<()> {
    let store = Arc::new(Store::with_seed());
    let sync = Arc::new(SheetClient::from_config(&config.sync));

    if sync.is_configured() {
        let applied = hydrate_roster(&store, &sync).await;
        if applied > 0 {
            println!("Roster hydrated: {applied} students");
        } else {
            println!("Could not hydrate the roster; using the seed roster.");
        }
    }

    let flow = CaptureFlow::new(Arc::clone(&store), Arc::clone(&sync), config.match_policy());
    let mut store_events = store.subscribe();

    let method: ScanMethod = cmd.method.into();
    let mut source = WedgeSource::stdin(method);
    let scan_handle = source.stop_handle();
    let (tx, mut scans) = mpsc::channel(64);
    let scanner = tokio::spawn(async move { source.start(tx).await });

    println!("Watching for {method} scans. End input or press Ctrl-C to finish.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            maybe_scan = scans.recv() => {
                let Some(scan) = maybe_scan else { break };
                if let CaptureOutcome::NotRegistered { code, method } =
                    flow.capture(&scan.code, scan.method)
                {
                    println!("? no student matches \"{code}\" via {method}");
                }
            }
            maybe_event = store_events.recv() => {
                let Some(event) = maybe_event else { break };
                render_store_event(&event);
            }
            _ = &mut ctrl_c => {
                println!();
                scan_handle.stop();
                break;
            }
        }
    }

    // Stdin reads cannot be interrupted, so the scanner task is dropped
    // rather than joined.
    scanner.abort();

    flow.drain().await;
    while let Ok(event) = store_events.try_recv() {
        render_store_event(&event);
    }

    print_session_summary(&store, cmd.limit);

    if cmd.insight {
        let insight = InsightClient::from_config(&config.insight);
        println!();
        println!("Insight: {}", insight.insight(&store.log()).await);
    }

    Ok(())
}

async fn handle_roster(config: &Config, cmd: RosterCommand) -> Result<()> {
    let store = Store::with_seed();
    let mut origin = "seed";

    if cmd.sync {
        let client = SheetClient::from_config(&config.sync);
        if client.is_configured() {
            if hydrate_roster(&store, &client).await > 0 {
                origin = "sheet";
            } else {
                println!("Could not hydrate the roster; showing the seed roster.");
            }
        } else {
            println!("No sheet endpoint configured; showing the seed roster.");
        }
    }

    let students = match &cmd.search {
        Some(term) => store.search_roster(term),
        None => store.roster(),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&students)?);
        return Ok(());
    }

    if students.is_empty() {
        match &cmd.search {
            Some(term) => println!("No students match \"{term}\"."),
            None => println!("The roster is empty."),
        }
        return Ok(());
    }

    println!("Roster ({} students, {origin})", students.len());
    for student in &students {
        println!(
            "  {:<4} {:<24} {:<12} qr: {:<12} nfc: {}",
            student.id,
            student.name,
            student.class_name,
            student.qr_code,
            student.nfc_id.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> Result<()> {
    let store = Store::with_seed();
    let stats = AttendanceStats::from_store(&store);
    let mode = if config.sync_endpoint().is_some() {
        "remote sync"
    } else {
        "local"
    };

    if cmd.json {
        let status = serde_json::json!({
            "mode": mode,
            "sheetEndpoint": config.sync_endpoint(),
            "insightEndpoint": config.insight_endpoint(),
            "crossMethodFallback": config.capture.cross_method_fallback,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("rollcall status");
        println!("---------------");
        println!("Mode:              {mode}");
        println!(
            "Sheet endpoint:    {}",
            config.sync_endpoint().unwrap_or("(not set)")
        );
        println!(
            "Insight endpoint:  {}",
            config.insight_endpoint().unwrap_or("(not set)")
        );
        println!(
            "Fallback matching: {}",
            config.capture.cross_method_fallback
        );
        println!();
        println!("Roster:   {} students", stats.total_students);
        println!("Present:  {}", stats.present);
        println!("Late:     {}", stats.late);
        println!("Absent:   {}", stats.absent);
    }
    Ok(())
}

fn handle_config(config: &Config, config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[sync]");
                println!(
                    "  Endpoint URL:          {}",
                    config.sync_endpoint().unwrap_or("(not set, local mode)")
                );
                println!();
                println!("[capture]");
                println!(
                    "  Cross-method fallback: {}",
                    config.capture.cross_method_fallback
                );
                println!();
                println!("[insight]");
                println!(
                    "  Endpoint URL:          {}",
                    config.insight_endpoint().unwrap_or("(not set)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::SetUrl { url } => {
            validate_endpoint_url(&url)?;
            let path = config_path
                .clone()
                .unwrap_or_else(Config::default_config_path);
            let mut file_config = Config::load_file_layer(config_path)?;
            file_config.sync.endpoint_url = Some(url.clone());
            file_config.save_to(&path)?;
            println!("Sheet endpoint set to {url}");
            println!("Saved to {}", path.display());
        }
        ConfigCommand::ClearUrl => {
            let path = config_path
                .clone()
                .unwrap_or_else(Config::default_config_path);
            let mut file_config = Config::load_file_layer(config_path)?;
            if file_config.sync.endpoint_url.take().is_some() {
                file_config.save_to(&path)?;
                println!("Sheet endpoint cleared; rollcall now runs in local mode.");
            } else {
                println!("No sheet endpoint was set.");
            }
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

fn format_record(record: &AttendanceRecord) -> String {
    format!(
        "{} ({}) {} at {} [{}]",
        record.student_name, record.class_name, record.direction, record.timestamp, record.method
    )
}

fn render_store_event(event: &StoreEvent) {
    match event {
        StoreEvent::RosterReplaced(count) => println!("Roster replaced: {count} students"),
        StoreEvent::RecordAppended(record) => println!("+ {}", format_record(record)),
        StoreEvent::SyncStateChanged { record_id, state } => {
            let short = record_id.get(..8).unwrap_or(record_id);
            println!("  sync {state} [{short}]");
        }
    }
}

fn print_session_summary(store: &Store, limit: usize) {
    let stats = AttendanceStats::from_store(store);
    println!();
    println!("Session summary");
    println!("---------------");
    println!("Roster:   {}", stats.total_students);
    println!("Present:  {}", stats.present);
    println!("Late:     {}", stats.late);
    println!("Absent:   {}", stats.absent);

    let recent = store.recent(limit);
    if !recent.is_empty() {
        println!();
        println!("Recent records:");
        for record in &recent {
            println!("  {} ({})", format_record(record), record.sync_state);
        }
    }
}
