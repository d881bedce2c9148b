//! Session relay.
//!
//! Pairs inspected-page connections with the inspector connections attached
//! to them and shuttles frames between the two without looking inside. A
//! page's frames go to every inspector bound to it; an inspector's frames go
//! to its one page. When a page goes away its inspectors are closed with it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::Uri;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use cdp_bridge_protocol::PageListing;
use cdp_bridge_protocol::relay::{
	DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT, DEVTOOLS_SEGMENT, DevtoolsQuery, LIST_PATH, PAGE_SEGMENT, PageQuery,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::error::RelayError;

type Outbox = mpsc::UnboundedSender<Message>;

struct PageConnection {
	serial: u64,
	tx: Outbox,
	listing: PageListing,
}

struct DevtoolsConnection {
	serial: u64,
	client_id: String,
	tx: Outbox,
}

/// Connection tables. Every accepted connection gets a serial so that a
/// connection replaced under the same id cannot tear down its successor.
#[derive(Default)]
struct RelayState {
	pages: HashMap<String, PageConnection>,
	devtools: HashMap<String, DevtoolsConnection>,
	next_serial: u64,
}

impl RelayState {
	fn next_serial(&mut self) -> u64 {
		self.next_serial += 1;
		self.next_serial
	}

	fn inspectors_of<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a DevtoolsConnection> + 'a {
		self.devtools.values().filter(move |d| d.client_id == page_id)
	}

	fn listings(&self) -> Vec<PageListing> {
		let mut pages: Vec<&PageConnection> = self.pages.values().collect();
		pages.sort_by(|a, b| {
			(b.listing.connected_at, b.serial).cmp(&(a.listing.connected_at, a.serial))
		});
		pages
			.into_iter()
			.map(|page| PageListing {
				inspectors: self.inspectors_of(&page.listing.id).count(),
				..page.listing.clone()
			})
			.collect()
	}

	/// Removes page `id` if `serial` is still the one registered, along with
	/// every inspector bound to it. Returns the detached inspectors' outboxes.
	fn remove_page(&mut self, id: &str, serial: u64) -> Option<Vec<Outbox>> {
		if self.pages.get(id).is_none_or(|page| page.serial != serial) {
			return None;
		}
		self.pages.remove(id);
		let bound: Vec<String> = self
			.devtools
			.iter()
			.filter(|(_, d)| d.client_id == id)
			.map(|(devtools_id, _)| devtools_id.clone())
			.collect();
		Some(
			bound
				.into_iter()
				.filter_map(|devtools_id| self.devtools.remove(&devtools_id))
				.map(|d| d.tx)
				.collect(),
		)
	}
}

type SharedState = Arc<Mutex<RelayState>>;

/// Listen address of the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
	pub host: String,
	pub port: u16,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_RELAY_HOST.to_string(),
			port: DEFAULT_RELAY_PORT,
		}
	}
}

impl RelayConfig {
	pub fn addr(&self) -> Result<SocketAddr> {
		format!("{}:{}", self.host, self.port)
			.parse()
			.with_context(|| format!("Invalid host/port combination: {}:{}", self.host, self.port))
	}
}

/// Builds the relay's routes over a fresh, empty set of connection tables.
pub fn router() -> Router {
	let state: SharedState = Arc::new(Mutex::new(RelayState::default()));

	Router::new()
		.route("/", get(|| async { "OK" }))
		.route(LIST_PATH, get(list_pages))
		.route(&format!("{LIST_PATH}/list"), get(list_pages))
		.route("/{kind}/{id}", get(connect))
		.with_state(state)
}

/// Serves the relay on an already-bound listener.
pub async fn serve(listener: TcpListener) -> Result<()> {
	axum::serve(listener, router().into_make_service())
		.await
		.context("Relay server error")
}

pub async fn run_relay_server(config: &RelayConfig) -> Result<()> {
	let addr = config.addr()?;

	info!(target = "cdp_bridge::relay", host = %config.host, port = config.port, "starting session relay");

	let listener = TcpListener::bind(addr)
		.await
		.with_context(|| format!("Failed to bind relay server to {addr}"))?;

	serve(listener).await
}

async fn list_pages(State(state): State<SharedState>) -> Json<Vec<PageListing>> {
	Json(state.lock().await.listings())
}

async fn connect(
	Path((kind, id)): Path<(String, String)>,
	uri: Uri,
	State(state): State<SharedState>,
	ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, RelayError> {
	match kind.as_str() {
		PAGE_SEGMENT => {
			let Query(query) = Query::<PageQuery>::try_from_uri(&uri)?;
			Ok(ws?.on_upgrade(move |socket| handle_page_socket(socket, state, id, query)))
		}
		DEVTOOLS_SEGMENT => {
			let Query(query) = Query::<DevtoolsQuery>::try_from_uri(&uri)?;
			Ok(ws?.on_upgrade(move |socket| handle_devtools_socket(socket, state, id, query)))
		}
		_ => {
			debug!(target = "cdp_bridge::relay", kind = %kind, id = %id, "rejecting unknown connection kind");
			Err(RelayError::UnknownKind(kind))
		}
	}
}

fn spawn_writer(mut ws_tx: SplitSink<WebSocket, Message>, rx: mpsc::UnboundedReceiver<Message>) -> JoinHandle<()> {
	let mut rx_stream = UnboundedReceiverStream::new(rx);
	tokio::spawn(async move {
		while let Some(msg) = rx_stream.next().await {
			if ws_tx.send(msg).await.is_err() {
				break;
			}
		}
	})
}

async fn handle_page_socket(socket: WebSocket, state: SharedState, id: String, query: PageQuery) {
	let (tx, rx) = mpsc::unbounded_channel();
	let serial = {
		let mut st = state.lock().await;
		let serial = st.next_serial();
		let listing = PageListing {
			id: id.clone(),
			url: query.url,
			title: query.title,
			favicon: query.favicon,
			user_agent: query.ua,
			time: query.time,
			connected_at: now_millis(),
			inspectors: 0,
		};
		if let Some(previous) = st.pages.insert(id.clone(), PageConnection { serial, tx, listing }) {
			warn!(target = "cdp_bridge::relay", page = %id, "Replacing existing page connection");
			let _ = previous.tx.send(Message::Close(None));
		}
		serial
	};
	info!(target = "cdp_bridge::relay", page = %id, serial, "Page connected");

	let (ws_tx, mut ws_rx) = socket.split();
	let send_task = spawn_writer(ws_tx, rx);

	while let Some(msg) = ws_rx.next().await {
		match msg {
			Ok(msg @ (Message::Text(_) | Message::Binary(_))) => {
				forward_to_inspectors(&state, &id, serial, msg).await;
			}
			Ok(Message::Close(_)) => break,
			Ok(_) => {}
			Err(err) => {
				warn!(target = "cdp_bridge::relay", page = %id, error = %err, "Page websocket error");
				break;
			}
		}
	}

	let detached = state.lock().await.remove_page(&id, serial);
	match detached {
		Some(inspectors) => {
			for inspector in &inspectors {
				let _ = inspector.send(Message::Close(None));
			}
			info!(target = "cdp_bridge::relay", page = %id, inspectors = inspectors.len(), "Page disconnected");
		}
		None => debug!(target = "cdp_bridge::relay", page = %id, serial, "Replaced page connection closed"),
	}

	send_task.abort();
}

async fn forward_to_inspectors(state: &SharedState, page_id: &str, serial: u64, msg: Message) {
	let targets: Vec<Outbox> = {
		let st = state.lock().await;
		if st.pages.get(page_id).is_none_or(|page| page.serial != serial) {
			return;
		}
		st.inspectors_of(page_id).map(|d| d.tx.clone()).collect()
	};

	for tx in targets {
		let _ = tx.send(msg.clone());
	}
}

async fn handle_devtools_socket(socket: WebSocket, state: SharedState, id: String, query: DevtoolsQuery) {
	let client_id = query.client_id;
	let (tx, rx) = mpsc::unbounded_channel();
	let serial = {
		let mut st = state.lock().await;
		if st.pages.contains_key(&client_id) {
			let serial = st.next_serial();
			let connection = DevtoolsConnection {
				serial,
				client_id: client_id.clone(),
				tx,
			};
			if let Some(previous) = st.devtools.insert(id.clone(), connection) {
				warn!(target = "cdp_bridge::relay", devtools = %id, "Replacing existing inspector connection");
				let _ = previous.tx.send(Message::Close(None));
			}
			Some(serial)
		} else {
			None
		}
	};

	match serial {
		Some(_) => info!(target = "cdp_bridge::relay", devtools = %id, page = %client_id, "Inspector attached"),
		None => warn!(target = "cdp_bridge::relay", devtools = %id, page = %client_id, "Inspector target not connected; messages will be dropped"),
	}

	let (ws_tx, mut ws_rx) = socket.split();
	let send_task = spawn_writer(ws_tx, rx);

	while let Some(msg) = ws_rx.next().await {
		match msg {
			Ok(msg @ (Message::Text(_) | Message::Binary(_))) => match serial {
				Some(serial) => forward_to_page(&state, &id, serial, msg).await,
				None => debug!(target = "cdp_bridge::relay", devtools = %id, "Dropping message from unattached inspector"),
			},
			Ok(Message::Close(_)) => break,
			Ok(_) => {}
			Err(err) => {
				warn!(target = "cdp_bridge::relay", devtools = %id, error = %err, "Inspector websocket error");
				break;
			}
		}
	}

	if let Some(serial) = serial {
		let mut st = state.lock().await;
		if st.devtools.get(&id).is_some_and(|d| d.serial == serial) {
			st.devtools.remove(&id);
		}
	}

	send_task.abort();
	info!(target = "cdp_bridge::relay", devtools = %id, "Inspector disconnected");
}

async fn forward_to_page(state: &SharedState, devtools_id: &str, serial: u64, msg: Message) {
	let target = {
		let st = state.lock().await;
		st.devtools
			.get(devtools_id)
			.filter(|d| d.serial == serial)
			.and_then(|d| st.pages.get(&d.client_id))
			.map(|page| page.tx.clone())
	};

	match target {
		Some(tx) => {
			let _ = tx.send(msg);
		}
		None => debug!(target = "cdp_bridge::relay", devtools = %devtools_id, "Page gone; dropping inspector message"),
	}
}

fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or_default()
}
