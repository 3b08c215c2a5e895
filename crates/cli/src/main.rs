use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context as _,
    clap::Parser,
    relay_channels::LockRegistry,
    relay_chat::{CommandDispatcher, MessageRouter},
    relay_config::{
        BotConfig, ConfigStore, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_API_BASE, DEFAULT_COMMAND_PREFIX,
        DEFAULT_MODEL, DEFAULT_STATE_FILE,
    },
    relay_providers::{CompletionInvoker, OpenAiCompatProvider},
    relay_sessions::ConversationManager,
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "relay-bot",
    about = "Relay a Discord channel to an OpenAI-compatible chat model"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Discord bot token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// Discord user id allowed to run administrative commands.
    #[arg(long, env = "OWNER_ID")]
    owner_id: Option<u64>,

    /// Model used until one is set with the `setmodel` command.
    #[arg(long, env = "RELAY_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "RELAY_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// API key sent as a bearer token.
    #[arg(long, env = "RELAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON file holding the binding, model, and conversation logs.
    #[arg(long, env = "RELAY_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Seconds to wait for a completion before giving up.
    #[arg(long, env = "RELAY_AI_TIMEOUT_SECS", default_value_t = DEFAULT_AI_TIMEOUT_SECS)]
    ai_timeout_secs: u64,

    /// Prefix for administrative commands.
    #[arg(long, env = "RELAY_COMMAND_PREFIX", default_value = DEFAULT_COMMAND_PREFIX)]
    command_prefix: String,
}

impl Cli {
    fn bot_config(&self) -> BotConfig {
        let mut config = BotConfig::new(
            self.discord_token.clone().unwrap_or_default(),
            self.owner_id.unwrap_or_default(),
        );
        config.default_model = self.model.clone();
        config.api_base = self.api_base.clone();
        config.api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new);
        config.state_file = self.state_file.clone();
        config.ai_timeout = Duration::from_secs(self.ai_timeout_secs);
        config.command_prefix = self.command_prefix.clone();
        config
    }
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "relay-bot starting");

    let config = cli.bot_config();
    config.validate().context("invalid configuration")?;

    let store = ConfigStore::load(&config.state_file, &config.default_model).with_context(|| {
        format!(
            "failed to load state file {}",
            config.state_file.display()
        )
    })?;
    store.save().context("failed to write state file")?;
    let store = Arc::new(store);
    info!(
        path = %config.state_file.display(),
        bound_channel = ?store.read(|s| s.bound_channel.clone()),
        model = %store.read(|s| s.model.clone()),
        "state loaded"
    );

    let provider = OpenAiCompatProvider::new(config.api_base.clone(), config.api_key.clone())
        .context("failed to build completion client")?;
    if config.api_key.is_none() {
        warn!(api_base = %config.api_base, "no API key configured; requests are unauthenticated");
    }
    let invoker = CompletionInvoker::new(Arc::new(provider));
    info!(
        provider = invoker.provider_name(),
        api_base = %config.api_base,
        timeout_secs = config.ai_timeout.as_secs(),
        "completion provider ready"
    );

    let conversations = Arc::new(ConversationManager::new(Arc::clone(&store)));
    let router = Arc::new(
        MessageRouter::new(
            Arc::clone(&conversations),
            Arc::new(LockRegistry::new()),
            invoker,
        )
        .with_timeout(config.ai_timeout),
    );

    let shutdown = CancellationToken::new();
    let commands = Arc::new(
        CommandDispatcher::new(config.owner_id, conversations, shutdown.clone())
            .with_prefix(config.command_prefix.clone()),
    );

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for ctrl-c");
                    return;
                }
                info!("interrupt received, shutting down");
                ctrl_c.cancel();
            },
            () = ctrl_c.cancelled() => {},
        }
    });

    relay_discord::run(&config.discord_token, router, commands, shutdown)
        .await
        .context("discord client failed")?;

    info!("relay-bot stopped");
    Ok(())
}
