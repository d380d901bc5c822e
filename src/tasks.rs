//! Background fetches.
//!
//! The UI loop never awaits the network. It hands requests to a
//! [`TaskSpawner`], which runs them on tokio tasks and sends an [`ApiMessage`]
//! back over an unbounded channel. The loop drains the channel with
//! `try_recv()` once per iteration.
//!
//! Every fetch carries the sequence number the table issued it with, so a
//! result that arrives after a newer request was made can be recognized and
//! dropped.

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{FrappeClient, ListQuery, Record};
use crate::config::Profile;
use crate::domain::DoctypeKind;
use crate::table::ServerQuery;

/// Results sent from background tasks to the main loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// Connection check finished. Carries the logged-in user on success.
    ClientConnected(Result<(FrappeClient, String), String>),

    /// One server-mode page and its total count.
    PageFetched {
        kind: DoctypeKind,
        seq: u64,
        result: Result<(Vec<Record>, usize), String>,
    },

    /// Every row of a client-mode doctype.
    RowsFetched {
        kind: DoctypeKind,
        seq: u64,
        result: Result<Vec<Record>, String>,
    },
}

/// Spawns fetches whose results come back as [`ApiMessage`]s.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Build a client for the profile and check the credentials.
    pub fn spawn_connect(&self, profile: Profile) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = async {
                let client = FrappeClient::from_profile(&profile).map_err(|e| e.to_string())?;
                let user = client.logged_user().await.map_err(|e| e.to_string())?;
                Ok((client, user))
            }
            .await;
            let _ = tx.send(ApiMessage::ClientConnected(result));
        });
    }

    /// Fetch one page for a server-mode table.
    pub fn spawn_fetch_page(
        &self,
        client: &FrappeClient,
        kind: DoctypeKind,
        seq: u64,
        query: ServerQuery,
    ) {
        debug!(?kind, seq, "Spawning page fetch");
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .get_page(kind.doctype(), kind.fields(), &query)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::PageFetched { kind, seq, result });
        });
    }

    /// Fetch every row for a client-mode table.
    pub fn spawn_fetch_all(&self, client: &FrappeClient, kind: DoctypeKind, seq: u64) {
        debug!(?kind, seq, "Spawning full fetch");
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let query = ListQuery::new(kind.doctype(), kind.fields()).order_by("creation desc");
            let result = client.get_all(&query).await.map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::RowsFetched { kind, seq, result });
        });
    }
}

/// Create the result channel and a spawner feeding it.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
