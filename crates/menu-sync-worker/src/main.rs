use menu_sync_worker::config::Settings;
use menu_sync_worker::database::{
    AccountRepository, DbPool, EventRepository, MaterialRepository, MenuRepository,
};
use menu_sync_worker::menu::{EventService, MenuSyncService};
use menu_sync_worker::platform::PlatformClient;
use menu_sync_worker::utils::error::SyncError;
use menu_sync_worker::utils::logger::init_logger;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let (command, account_id) = parse_args()?;

    let settings = Settings::load()?;

    let pool = DbPool::new(&settings.database).await?;
    sqlx::migrate!().run(pool.get_pool()).await?;

    let accounts = AccountRepository::new(pool.clone());
    let events = Arc::new(EventService::new(Arc::new(EventRepository::new(
        pool.clone(),
    ))));

    let sync = MenuSyncService::new(
        Arc::new(MenuRepository::new(pool.clone())),
        events,
        Arc::new(MaterialRepository::new(pool.clone())),
        Arc::new(PlatformClient::new(settings.platform.clone())?),
    );

    let account = accounts
        .get_by_id(account_id)
        .await?
        .ok_or(SyncError::AccountNotFound(account_id))?;

    match command.as_str() {
        "pull" => {
            let buttons = sync.pull(&account).await?;
            info!(
                "Done: {} top-level buttons synced to local storage",
                buttons.len()
            );
        }
        "push" => {
            sync.push(&account).await?;
            info!("Done: local menu published to the platform");
        }
        _ => unreachable!("validated in parse_args"),
    }

    pool.close().await;

    Ok(())
}

fn parse_args() -> anyhow::Result<(String, i64)> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [command, account_id] if command == "pull" || command == "push" => {
            let account_id = account_id
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("account id must be an integer: {}", account_id))?;
            Ok((command.clone(), account_id))
        }
        _ => anyhow::bail!("Usage: menu-sync-worker <pull|push> <account-id>"),
    }
}
