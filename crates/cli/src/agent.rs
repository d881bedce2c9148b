//! Page agent.
//!
//! Connects an in-process [`InspectorSession`] to a relay as an inspected
//! page. Commands arriving from inspectors are answered out of the session;
//! events pushed by instrumentation go out as they come.

use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_bridge::InspectorSession;
use cdp_bridge_protocol::Event;
use cdp_bridge_protocol::relay::{PAGE_SEGMENT, PageQuery};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

/// Builds the page-registration URL for `page_id` on the relay at `relay`.
///
/// `relay` is the relay's base WebSocket URL, e.g. `ws://127.0.0.1:9222`.
pub fn page_endpoint(relay: &Url, page_id: &str, query: &PageQuery) -> Result<Url> {
	let mut endpoint = relay
		.join(&format!("/{PAGE_SEGMENT}/{page_id}"))
		.with_context(|| format!("Invalid relay URL: {relay}"))?;
	endpoint
		.query_pairs_mut()
		.append_pair("url", &query.url)
		.append_pair("ua", &query.ua)
		.append_pair("time", &query.time)
		.append_pair("title", &query.title)
		.append_pair("favicon", &query.favicon);
	Ok(endpoint)
}

/// Answers one inspector frame. Frames that are not CDP commands are dropped.
pub fn answer(session: &InspectorSession, raw: &str) -> Vec<String> {
	let dispatch = match session.handle_message(raw) {
		Ok(dispatch) => dispatch,
		Err(err) => {
			warn!(target = "cdp_bridge::agent", error = %err, "Dropping unparsable inspector frame");
			return Vec::new();
		}
	};
	match dispatch.into_frames() {
		Ok(frames) => frames,
		Err(err) => {
			warn!(target = "cdp_bridge::agent", error = %err, "Failed to encode reply");
			Vec::new()
		}
	}
}

/// Runs until the relay closes the connection.
pub async fn run_page_agent(
	endpoint: Url,
	session: Arc<InspectorSession>,
	mut events: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
	let (ws, _) = tokio_tungstenite::connect_async(endpoint.as_str())
		.await
		.with_context(|| format!("Failed to connect to relay at {endpoint}"))?;
	info!(target = "cdp_bridge::agent", endpoint = %endpoint, "Page agent connected");

	let (mut ws_tx, mut ws_rx) = ws.split();

	loop {
		tokio::select! {
			msg = ws_rx.next() => match msg {
				Some(Ok(Message::Text(text))) => {
					for frame in answer(&session, text.as_str()) {
						ws_tx.send(Message::Text(frame.into())).await.context("Sending reply to relay")?;
					}
				}
				Some(Ok(Message::Close(_))) | None => break,
				Some(Ok(_)) => {}
				Some(Err(err)) => return Err(err).context("Relay connection failed"),
			},
			Some(event) = events.recv() => {
				debug!(target = "cdp_bridge::agent", method = %event.method, "Pushing event");
				let frame = serde_json::to_string(&event)?;
				ws_tx.send(Message::Text(frame.into())).await.context("Sending event to relay")?;
			}
		}
	}

	info!(target = "cdp_bridge::agent", "Page agent disconnected");
	Ok(())
}
