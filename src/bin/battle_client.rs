use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use pokemon_battle::client::HttpBattleClient;
use pokemon_battle::config::{ClientConfig, DEFAULT_CLIENT_CONFIG_FILE};
use pokemon_battle::history::HistoryBrowser;
use pokemon_battle::orchestrator::{BattleOrchestrator, Phase};
use pokemon_battle::presentation::{render_battle, render_history_row};
use pokemon_battle::router::View;

/// Runs a random Pokemon battle or browses the battle history.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// View to open: `battle` or `history`. Anything else opens `battle`.
    #[arg(default_value = "battle")]
    path: String,

    /// Name filter for the history view.
    #[arg(short, long, default_value = "")]
    query: String,

    /// Overrides the configured battle API root.
    #[arg(long, env = "BATTLE_API_URL")]
    base_url: Option<String>,

    #[arg(long, default_value = DEFAULT_CLIENT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match ClientConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let client = match HttpBattleClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("using battle api at {}", client.base_url());

    let view = View::resolve(&args.path);
    println!("{}", view.title());
    match view {
        View::Battle => {
            let orchestrator = BattleOrchestrator::new(&client);
            orchestrator.start_new_battle().await;
            let state = orchestrator.state();
            print!("{}", render_battle(&state));
            if state.phase == Phase::Failed {
                return ExitCode::FAILURE;
            }
        }
        View::History => {
            let browser = HistoryBrowser::mount_with_query(&client, &args.query).await;
            let state = browser.state();
            if let Some(message) = &state.error_message {
                println!("{}", message);
                return ExitCode::FAILURE;
            }
            if state.battles.is_empty() {
                println!("No battles yet.");
            }
            for battle in &state.battles {
                println!("{}", render_history_row(battle));
            }
        }
    }
    ExitCode::SUCCESS
}
