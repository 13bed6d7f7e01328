//! Drive import walkthrough against a running backend.
//!
//! Run with:
//! ```bash
//! # Open the consent page in the system browser
//! DRIVE_IMPORT_CLIENT_ID=xxx.apps.googleusercontent.com \
//!     cargo run -p core-service --example drive_import_demo
//!
//! # Finish with the URL the provider redirected to, then import a folder
//! DRIVE_IMPORT_CLIENT_ID=xxx.apps.googleusercontent.com \
//!     cargo run -p core-service --example drive_import_demo -- \
//!     "http://localhost:5173/callback?code=..." <folder-id>
//! ```

use anyhow::Context;
use bridge_traits::log::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{CallbackOutcome, ClientConfig, CoreConfig, DriveImportService};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let client_id =
        env::var("DRIVE_IMPORT_CLIENT_ID").context("DRIVE_IMPORT_CLIENT_ID is not set")?;
    let mut client = ClientConfig::new(client_id);
    if let Ok(base_url) = env::var("DRIVE_IMPORT_BASE_URL") {
        client = client.with_base_url(base_url);
    }

    let config = CoreConfig::builder().client(client).build().await?;
    let service = DriveImportService::new(config)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(callback_url) = args.first() else {
        let url = service.begin_authorization().await?;
        info!(%url, "Complete consent in the browser, then rerun with the callback URL");
        return Ok(());
    };

    if let Some(browser) = service.desktop_browser() {
        browser.set_current_url(callback_url.as_str());
    }

    match service.handle_page_load().await? {
        CallbackOutcome::Authenticated { folder_count } => {
            info!(folder_count, "Connected to Google Drive");
        }
        other => {
            info!(?other, "Nothing to exchange");
            return Ok(());
        }
    }

    for folder in &service.state().folders {
        println!("{}\t{}", folder.id, folder.name);
    }

    if let Some(folder_id) = args.get(1) {
        let result = service.import_folder(folder_id).await?;
        if let Some(message) = service.state().message {
            println!("{}", message.text);
        }
        for skipped in &result.skipped_files {
            println!(
                "  skipped {}: {}",
                skipped.filename,
                skipped.reason.as_deref().unwrap_or("no reason given")
            );
        }
    }

    Ok(())
}
