//! Score persistence: the `username -> score` table and the writer task
//! that drains save requests off the game loop.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::Config;

use super::supabase::{StoreError, SupabaseClient};

/// Row in the scores table, also the save request sent on disconnect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub username: String,
    pub score: u64,
}

/// Score table operations
#[derive(Clone)]
pub struct ScoreStore {
    client: SupabaseClient,
    table: String,
}

impl ScoreStore {
    /// Build the store and check that the table is reachable
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let store = Self {
            client: SupabaseClient::new(config)?,
            table: config.scores_table.clone(),
        };
        store.probe().await?;
        Ok(store)
    }

    /// Read at most one row to prove credentials and table are valid
    pub async fn probe(&self) -> Result<(), StoreError> {
        let _: Vec<ScoreRecord> = self.client.get(&self.table, "select=username,score&limit=1").await?;
        Ok(())
    }

    /// Insert or overwrite the score stored for `username`
    pub async fn upsert_score(&self, username: &str, score: u64) -> Result<(), StoreError> {
        let record = ScoreRecord {
            username: username.to_string(),
            score,
        };
        self.client.upsert(&self.table, &[record], "username").await
    }
}

/// Consumes save requests one at a time. Failures are logged and dropped.
pub struct ScoreWriter {
    store: ScoreStore,
    rx: mpsc::UnboundedReceiver<ScoreRecord>,
}

impl ScoreWriter {
    pub fn new(store: ScoreStore) -> (Self, mpsc::UnboundedSender<ScoreRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { store, rx }, tx)
    }

    /// Run until every sender is dropped
    pub async fn run(mut self) {
        while let Some(save) = self.rx.recv().await {
            match self.store.upsert_score(&save.username, save.score).await {
                Ok(()) => {
                    info!(username = %save.username, score = save.score, "Saved player score");
                }
                Err(e) => {
                    error!(
                        username = %save.username,
                        score = save.score,
                        error = %e,
                        "Failed to save player score"
                    );
                }
            }
        }

        info!("Score writer stopped");
    }
}
