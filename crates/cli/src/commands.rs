use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_bridge::InspectorSession;
use cdp_bridge_protocol::PageListing;
use cdp_bridge_protocol::relay::{LIST_PATH, PageQuery};
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use crate::agent::{page_endpoint, run_page_agent};
use crate::cli::{Cli, Commands, RelayArgs};
use crate::demo;
use crate::relay::{RelayConfig, run_relay_server};

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::Serve { relay } => run_relay_server(&RelayConfig::from(relay)).await,
		Commands::Pages { relay, json } => pages(&relay, json).await,
		Commands::Demo { relay, id } => run_demo(&relay, &id).await,
	}
}

async fn pages(relay: &RelayArgs, json: bool) -> Result<()> {
	let url = format!("http://{}:{}{LIST_PATH}", relay.host, relay.port);
	let listing: Vec<PageListing> = reqwest::get(&url)
		.await
		.with_context(|| format!("Failed to reach relay at {url}"))?
		.error_for_status()?
		.json()
		.await
		.context("Parsing page listing")?;

	if json {
		println!("{}", serde_json::to_string_pretty(&listing)?);
		return Ok(());
	}

	if listing.is_empty() {
		println!("no pages connected");
	}
	for page in &listing {
		println!("{}\t{}\t{}\t{} inspector(s)", page.id, page.url, page.title, page.inspectors);
	}
	Ok(())
}

async fn run_demo(relay: &RelayArgs, id: &str) -> Result<()> {
	let session = Arc::new(InspectorSession::new(demo::sample_document(), demo::registry_config()));

	let (events_tx, events_rx) = mpsc::unbounded_channel();
	for sheet in demo::sample_style_sheets() {
		match session.style_sheet_added(&sheet) {
			Ok(event) => {
				let _ = events_tx.send(event);
			}
			Err(err) => warn!(target = "cdp_bridge::agent", error = %err, "Failed to announce style sheet"),
		}
	}

	let base = Url::parse(&format!("ws://{}:{}", relay.host, relay.port))
		.with_context(|| format!("Invalid relay address {}:{}", relay.host, relay.port))?;
	let query = PageQuery {
		url: "about:cdp-bridge-demo".into(),
		ua: format!("cdp-bridge/{}", env!("CARGO_PKG_VERSION")),
		title: "cdp-bridge demo".into(),
		..Default::default()
	};
	let endpoint = page_endpoint(&base, id, &query)?;
	info!(target = "cdp_bridge::agent", page = %id, "Attach an inspector at /devtools/<id>?clientId={id}");

	run_page_agent(endpoint, session, events_rx).await
}
