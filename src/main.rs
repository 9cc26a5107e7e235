use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use pass_board::client::{
    HttpBackend, PassBoardView, PersistenceRouter, RefreshCoordinator, SaveTarget,
    DEFAULT_REFRESH_DELAY,
};
use pass_board::settings::SettingsRecord;
use pass_board::web::{run_server, Config};

#[derive(Parser)]
#[command(name = "pass-board")]
#[command(about = "Ground station settings and satellite pass board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web backend
    Serve {
        #[arg(long, default_value = "pass-board.yaml")]
        config: String,
    },
    /// Validate a settings JSON file
    Validate { settings: String },
    /// Save a settings JSON file to a running backend
    Push {
        #[arg(long)]
        url: String,
        /// Save action: `database` (account) or `session`
        #[arg(long)]
        target: SaveTarget,
        /// Identity provider token to sign in with first
        #[arg(long)]
        token: Option<String>,
        #[arg(long, value_parser = humantime::parse_duration)]
        refresh_delay: Option<Duration>,
        settings: String,
    },
    /// Print the settings and passes a backend currently serves
    Show {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Validate { settings } => validate(&settings),
        Commands::Push {
            url,
            target,
            token,
            refresh_delay,
            settings,
        } => {
            push(
                &url,
                target,
                token.as_deref(),
                refresh_delay.unwrap_or(DEFAULT_REFRESH_DELAY),
                &settings,
            )
            .await
        }
        Commands::Show { url } => show(&url).await,
    }
}

async fn serve(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_settings(path: &str) -> Result<SettingsRecord, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("Error reading file: {}", e))?;
    serde_json::from_str(&json).map_err(|e| format!("Parse error: {}", e))
}

fn validate(path: &str) -> ExitCode {
    let record = match read_settings(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = record.validate() {
        eprintln!("Invalid settings: {}", e);
        return ExitCode::FAILURE;
    }

    println!(
        "Settings are valid ({} satellites)",
        record.roster().len()
    );
    for (priority, entry) in record.roster().iter() {
        println!("  {}: {} (NORAD {})", priority, entry.name, entry.norad_id);
    }
    ExitCode::SUCCESS
}

async fn push(
    url: &str,
    target: SaveTarget,
    token: Option<&str>,
    refresh_delay: Duration,
    path: &str,
) -> ExitCode {
    let record = match read_settings(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let backend = match HttpBackend::new(url) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let session = match token {
        Some(token) => backend.authenticate(token).await,
        None => backend.fetch_session().await,
    };
    let session = match session {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading session: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let refresh = Arc::new(RefreshCoordinator::new(backend.clone(), refresh_delay));
    let router = PersistenceRouter::new(backend, refresh.clone());

    let outcome = router.save(target, record, session.as_ref()).await;
    match &outcome {
        Ok(message) => println!("{}", message),
        Err(e) => eprintln!("Save failed: {}", e),
    }

    refresh.settle().await;
    print_view(&refresh.view().await);

    if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn show(url: &str) -> ExitCode {
    let backend = match HttpBackend::new(url) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let refresh = RefreshCoordinator::new(backend, DEFAULT_REFRESH_DELAY);
    refresh.initial_load().await;
    let view = refresh.view().await;
    print_view(&view);

    if view.settings.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_view(view: &PassBoardView) {
    match &view.session {
        Some(user) => println!("Signed in as {}", user.email),
        None => println!("Not signed in"),
    }

    match &view.settings {
        Some(settings) => {
            println!(
                "Station {:.4}, {:.4}; {:?} window of {} h; min elevation {}°",
                settings.station_latitude(),
                settings.station_longitude(),
                settings.prediction_mode(),
                settings.prediction_hours(),
                settings.minimum_elevation()
            );
            for (priority, entry) in settings.roster().iter() {
                println!("  {}: {} (NORAD {})", priority, entry.name, entry.norad_id);
            }
        }
        None => println!("Settings: loading"),
    }

    match view.pass_data.as_ref().and_then(|d| d["passes"].as_array()) {
        Some(passes) => {
            println!("{} passes", passes.len());
            for pass in passes {
                println!(
                    "  {} {} -> {} max {}°{}",
                    pass["satellite"].as_str().unwrap_or("?"),
                    pass["aos"].as_str().unwrap_or("?"),
                    pass["los"].as_str().unwrap_or("?"),
                    pass["max_elevation_deg"],
                    if pass["take"].as_bool() == Some(false) {
                        " (skipped)"
                    } else {
                        ""
                    }
                );
            }
        }
        None => println!("Passes: loading"),
    }
}
