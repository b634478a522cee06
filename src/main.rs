use std::sync::Arc;

use phone_relay::clickup::{ClickUpSink, TaskSink};
use phone_relay::config::RelayConfig;
use phone_relay::contacts::{ContactLookup, GoogleContacts};
use phone_relay::directory::TeamDirectory;
use phone_relay::relay::Relay;
use phone_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let sink = ClickUpSink::new(config.access_token.clone(), config.sink_timeout)?;

    // Operator helpers for discovering list ids, mirroring the webhook's
    // outbound credentials. `phone-relay workspaces` / `phone-relay lists <space>`.
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("workspaces") => {
            for ws in sink.workspaces().await? {
                println!("{}\t{}", ws.id, ws.name);
            }
            return Ok(());
        }
        Some("lists") => {
            let space_id = args.next().ok_or_else(|| {
                anyhow::anyhow!("usage: phone-relay lists <space-id>")
            })?;
            for list in sink.lists(&space_id).await? {
                println!("{}\t{}", list.id, list.name);
            }
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: phone-relay [workspaces | lists <space-id>]");
            std::process::exit(2);
        }
        None => {}
    }

    let directory = match &config.directory_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            TeamDirectory::from_json_str(&json)?
        }
        None => TeamDirectory::builtin()?,
    };
    let directory = Arc::new(directory);

    let contacts: Option<Arc<dyn ContactLookup>> = config
        .google
        .clone()
        .map(|credentials| Arc::new(GoogleContacts::new(credentials)) as Arc<dyn ContactLookup>);

    eprintln!("📞 Phone Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Directory: {} teams, {} employees",
        directory.team_count(),
        directory.employee_count()
    );
    eprintln!(
        "   Contacts lookup: {}",
        if contacts.is_some() { "enabled" } else { "disabled" }
    );
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook\n", config.port);

    let sink: Arc<dyn TaskSink> = Arc::new(sink);
    let relay = Arc::new(Relay::new(directory, sink, contacts, config.lists.clone()));
    let app = server::router(relay);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
