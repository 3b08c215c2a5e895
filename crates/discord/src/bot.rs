use std::sync::Arc;

use {
    relay_chat::{CommandDispatcher, MessageRouter},
    secrecy::{ExposeSecret, Secret},
    serenity::Client,
    tokio_util::sync::CancellationToken,
    tracing::info,
};

use crate::{
    Result,
    handler::{RelayHandler, ShardManagerContainer},
};

/// Connect to the gateway and process events until `shutdown` is cancelled
/// or the connection fails.
///
/// Cancelling the token closes every shard, which makes the client return.
pub async fn run(
    token: &Secret<String>,
    router: Arc<MessageRouter>,
    commands: Arc<CommandDispatcher>,
    shutdown: CancellationToken,
) -> Result<()> {
    let handler = RelayHandler::new(router, commands);
    let mut client = Client::builder(token.expose_secret(), RelayHandler::intents())
        .event_handler(handler)
        .await?;

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(Arc::clone(&client.shard_manager));
    }

    let shard_manager = Arc::clone(&client.shard_manager);
    let stop = shutdown.clone();
    tokio::spawn(async move {
        stop.cancelled().await;
        info!("closing discord gateway connection");
        shard_manager.shutdown_all().await;
    });

    info!("connecting to discord gateway");
    let result = client.start().await;
    // Release the shutdown watcher if the client stopped on its own.
    shutdown.cancel();
    result?;
    info!("discord client stopped");
    Ok(())
}
