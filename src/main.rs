use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use adgen_cli::{
    TerminalKeySelector, campaign_json, display_banner, extension_for, print_help,
    read_line_with_history, render_ad_preview, render_notice, render_sources, render_status,
    render_strategy_panel, render_view, with_progress, write_creative,
};
use adgen_core::{AdObjective, CreativeType, KeySelector};
use adgen_gemini::GeminiClient;
use adgen_store::{InMemoryArtifactStore, InMemoryCampaignStore};
use adgen_workflow::{View, WorkflowController};

type Controller = WorkflowController<GeminiClient, InMemoryCampaignStore, InMemoryArtifactStore>;

#[derive(Parser)]
#[command(name = "adgen")]
#[command(about = "AI-powered Meta ad campaign generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Client website; runs the whole pipeline once instead of the REPL
    #[arg(long, requires = "client")]
    url: Option<String>,

    /// Client name for a one-shot run
    #[arg(long, requires = "url")]
    client: Option<String>,

    /// Campaign objective (leads or clicks)
    #[arg(long, value_parser = parse_objective, default_value = "leads")]
    objective: AdObjective,

    /// Creative format (image or video)
    #[arg(long, value_parser = parse_format, default_value = "image")]
    format: CreativeType,

    /// Write the generated creative to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_objective(raw: &str) -> std::result::Result<AdObjective, String> {
    AdObjective::parse(raw).ok_or_else(|| format!("unknown objective '{}', expected leads or clicks", raw))
}

fn parse_format(raw: &str) -> std::result::Result<CreativeType, String> {
    CreativeType::parse(raw).ok_or_else(|| format!("unknown format '{}', expected image or video", raw))
}

/// REPL command
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Navigate(View),
    Url(String),
    Client(String),
    Objective(AdObjective),
    Format(CreativeType),
    Scan,
    Build,
    Save,
    Export { index: usize, path: Option<PathBuf> },
    Status,
    Help,
    Exit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let require = |usage: &str| {
        if rest.is_empty() {
            Err(format!("Usage: {}", usage))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_lowercase().as_str() {
        "dashboard" => Ok(Command::Navigate(View::Dashboard)),
        "lab" => Ok(Command::Navigate(View::StrategyLab)),
        "factory" => Ok(Command::Navigate(View::AdFactory)),
        "url" => require("url <address>").map(Command::Url),
        "client" => require("client <name>").map(Command::Client),
        "objective" => {
            let value = require("objective <leads|clicks>")?;
            parse_objective(&value).map(Command::Objective)
        }
        "format" => {
            let value = require("format <image|video>")?;
            parse_format(&value).map(Command::Format)
        }
        "scan" => Ok(Command::Scan),
        "build" => Ok(Command::Build),
        "save" => Ok(Command::Save),
        "export" => {
            let args = require("export <n> [path]")?;
            let (number, path) = match args.split_once(char::is_whitespace) {
                Some((number, path)) => (number, Some(PathBuf::from(path.trim()))),
                None => (args.as_str(), None),
            };
            match number.parse::<usize>() {
                Ok(index) if index > 0 => Ok(Command::Export { index, path }),
                _ => Err(format!("'{}' is not a campaign number", number)),
            }
        }
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Exit),
        other => Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
    }
}

struct App {
    client: Arc<GeminiClient>,
    selector: Arc<TerminalKeySelector>,
    controller: Controller,
}

impl App {
    fn new() -> Result<Self> {
        let client = Arc::new(GeminiClient::from_env()?);
        let selector = Arc::new(TerminalKeySelector::new(client.clone()));
        let controller = WorkflowController::new(
            client.clone(),
            Arc::new(InMemoryCampaignStore::new()),
            Arc::new(InMemoryArtifactStore::new()),
        )
        .with_key_selector(selector.clone());

        Ok(Self {
            client,
            selector,
            controller,
        })
    }

    async fn show(&self) -> Result<()> {
        let state = self.controller.snapshot();
        let campaigns = self.controller.campaigns().await?;
        println!("{}", render_view(&state, &campaigns));
        if state.view == View::Dashboard {
            if let Some(notice) = &state.notice {
                println!("{}", render_notice(notice));
            }
        }
        Ok(())
    }

    /// Prompt for a key up front so the ticker does not overwrite the prompt
    async fn ensure_video_key(&self) -> Result<()> {
        if self.controller.snapshot().intake.format == CreativeType::Video
            && !self.selector.has_selected_key().await
        {
            self.selector.open_select_key().await?;
        }
        Ok(())
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Navigate(view) => {
                self.controller.navigate(view);
                self.show().await?;
            }
            Command::Url(url) => {
                self.controller.set_url(url);
                println!("{} Website set", "✓".green());
            }
            Command::Client(name) => {
                self.controller.set_client_name(name);
                println!("{} Client set", "✓".green());
            }
            Command::Objective(objective) => {
                self.controller.set_objective(objective);
                println!("{} Objective: {}", "✓".green(), objective.display_name());
            }
            Command::Format(format) => {
                self.controller.set_format(format);
                println!("{} Format: {}", "✓".green(), format.display_name());
            }
            Command::Scan => {
                if !self.controller.snapshot().view.is_workspace() {
                    self.controller.navigate(View::StrategyLab);
                }
                let result = with_progress("Extracting stock data...", self.controller.start_research()).await;
                if let Err(e) = result {
                    debug!(error = %e, "scan failed");
                }
                self.show().await?;
            }
            Command::Build => {
                if !self.controller.snapshot().can_generate_creative() {
                    println!("{} Run 'scan' before building a creative.", "⚠️".yellow());
                    return Ok(());
                }
                if let Err(e) = self.ensure_video_key().await {
                    println!("{} {}", "❌".red(), e);
                    return Ok(());
                }
                let result = with_progress("Generating creative...", self.controller.generate_creative()).await;
                match result {
                    Ok(false) => println!("{} Run 'scan' before building a creative.", "⚠️".yellow()),
                    Ok(true) => self.show().await?,
                    Err(e) => {
                        debug!(error = %e, "build failed");
                        self.show().await?;
                    }
                }
            }
            Command::Save => {
                if !self.controller.snapshot().can_save() {
                    println!("{} Scan and build a creative before saving.", "⚠️".yellow());
                    return Ok(());
                }
                match self.controller.save_campaign().await {
                    Ok(Some(_)) => self.show().await?,
                    Ok(None) => println!("{} Scan and build a creative before saving.", "⚠️".yellow()),
                    Err(e) => println!("{} {}", "❌".red(), e),
                }
            }
            Command::Export { index, path } => self.export(index, path).await?,
            Command::Status => println!("{}", render_status(&self.controller.snapshot())),
            Command::Help => print_help(),
            Command::Exit => {}
        }
        Ok(())
    }

    async fn export(&self, index: usize, path: Option<PathBuf>) -> Result<()> {
        let campaigns = self.controller.campaigns().await?;
        let Some(campaign) = campaigns.get(index - 1) else {
            println!("{} No campaign #{} ({} saved)", "⚠️".yellow(), index, campaigns.len());
            return Ok(());
        };

        let Some(path) = path else {
            println!("{}", campaign_json(campaign)?);
            return Ok(());
        };

        let artifact = match campaign.artifact_id() {
            Some(id) => self.controller.artifact(&id).await?,
            None => None,
        };
        let artifact = artifact.ok_or_else(|| anyhow!("Creative for campaign {} is not stored", campaign.id))?;
        let written = write_creative(&artifact, &path)?;
        println!("{} Wrote {} bytes to {}", "✅".green(), written, path.display());
        Ok(())
    }

    async fn run_repl(&self) -> Result<()> {
        display_banner();
        if !self.client.has_api_key() {
            println!(
                "{} No API key configured. Set GEMINI_API_KEY or API_KEY before scanning.",
                "⚠️".yellow()
            );
            println!();
        }

        let mut history = Vec::new();
        loop {
            let Some(line) = read_line_with_history(&mut history)? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(Command::Exit) => break,
                Ok(command) => {
                    if let Err(e) = self.execute(command).await {
                        println!("{} {}", "❌".red(), e);
                    }
                }
                Err(message) => println!("{} {}", "⚠️".yellow(), message),
            }
        }

        println!("{}", "👋 Goodbye!".green());
        Ok(())
    }

    async fn run_once(
        &self,
        url: String,
        client: String,
        objective: AdObjective,
        format: CreativeType,
        out: Option<PathBuf>,
    ) -> Result<()> {
        self.controller.set_url(url);
        self.controller.set_client_name(client);
        self.controller.set_objective(objective);
        self.controller.set_format(format);

        with_progress("Extracting stock data...", self.controller.start_research()).await?;
        self.ensure_video_key().await?;
        with_progress("Generating creative...", self.controller.generate_creative()).await?;

        let state = self.controller.snapshot();
        let analysis = state.analysis.as_ref().context("research produced no analysis")?;
        println!("{}", render_ad_preview(&state.intake, Some(&analysis.copy), state.creative.as_ref()));
        println!("{}", render_strategy_panel(&analysis.strategy));
        let sources = render_sources(&analysis.sources);
        if !sources.is_empty() {
            println!("{}", sources);
        }

        let campaign = self
            .controller
            .save_campaign()
            .await?
            .context("campaign could not be saved")?;
        println!("{} Campaign {} saved", "✅".green(), campaign.id);

        if let Some(out) = out {
            let id = campaign.artifact_id().context("campaign has no stored creative")?;
            let artifact = self
                .controller
                .artifact(&id)
                .await?
                .context("creative artifact missing")?;
            let path = if out.extension().is_none() {
                out.with_extension(extension_for(&artifact.mime_type))
            } else {
                out
            };
            let written = write_creative(&artifact, &path)?;
            println!("{} Wrote {} bytes to {}", "✅".green(), written, path.display());
        }
        Ok(())
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = App::new()?;

    match (cli.url, cli.client) {
        (Some(url), Some(client)) => {
            app.run_once(url, client, cli.objective, cli.format, cli.out)
                .await
        }
        _ => app.run_repl().await,
    }
}
