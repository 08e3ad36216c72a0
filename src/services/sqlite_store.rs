//! SQLite persistence layer for prediction history.
//!
//! Redis holds the hot correlation/accuracy mirrors; SQLite holds the
//! prediction archive that should survive restarts, so resolved history
//! keeps feeding accuracy stats after a cold start.

use crate::types::{PredictionRecord, PredictionStatus, TradeAction};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQLite store for durable prediction records.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prediction_history (
                id TEXT PRIMARY KEY,
                indicator TEXT NOT NULL,
                symbol TEXT NOT NULL,
                action TEXT NOT NULL,
                confidence REAL NOT NULL,
                price_at_prediction REAL NOT NULL,
                horizon TEXT NOT NULL,
                status TEXT NOT NULL,
                actual_price REAL,
                resolved_at INTEGER,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_indicator
             ON prediction_history(indicator)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_symbol ON prediction_history(symbol)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_created_at
             ON prediction_history(created_at DESC)",
            [],
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    /// Insert or update a prediction record.
    ///
    /// Resolution re-archives the same id, updating only the fields the
    /// transition touches.
    pub fn archive_prediction(&self, prediction: &PredictionRecord) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO prediction_history (
                id, indicator, symbol, action, confidence, price_at_prediction,
                horizon, status, actual_price, resolved_at, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                actual_price = excluded.actual_price,
                resolved_at = excluded.resolved_at",
            params![
                prediction.id.to_string(),
                prediction.indicator,
                prediction.symbol,
                prediction.action.as_str(),
                prediction.confidence,
                prediction.price_at_prediction,
                prediction.horizon,
                prediction.status.as_str(),
                prediction.actual_price,
                prediction.resolved_at,
                prediction.created_at,
            ],
        )?;

        debug!("Archived prediction {}", prediction.id);
        Ok(())
    }

    /// Get a single prediction by id.
    pub fn get_prediction(&self, id: Uuid) -> Option<PredictionRecord> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, indicator, symbol, action, confidence, price_at_prediction,
                    horizon, status, actual_price, resolved_at, created_at
             FROM prediction_history WHERE id = ?1",
            params![id.to_string()],
            Self::row_to_prediction,
        );

        match result {
            Ok(prediction) => Some(prediction),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                error!("Error fetching prediction {}: {}", id, e);
                None
            }
        }
    }

    /// Get the most recent predictions, newest first.
    pub fn get_all_predictions(&self, limit: usize) -> Vec<PredictionRecord> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = match conn.prepare(
            "SELECT id, indicator, symbol, action, confidence, price_at_prediction,
                    horizon, status, actual_price, resolved_at, created_at
             FROM prediction_history
             ORDER BY created_at DESC
             LIMIT ?1",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                error!("Error preparing prediction query: {}", e);
                return Vec::new();
            }
        };

        let rows = stmt.query_map(params![limit as i64], Self::row_to_prediction);

        match rows {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                error!("Error querying predictions: {}", e);
                Vec::new()
            }
        }
    }

    fn row_to_prediction(row: &rusqlite::Row<'_>) -> Result<PredictionRecord, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let action_str: String = row.get(3)?;
        let status_str: String = row.get(7)?;

        Ok(PredictionRecord {
            id,
            indicator: row.get(1)?,
            symbol: row.get(2)?,
            action: TradeAction::from_str(&action_str).unwrap_or(TradeAction::Hold),
            confidence: row.get(4)?,
            price_at_prediction: row.get(5)?,
            horizon: row.get(6)?,
            status: PredictionStatus::from_str(&status_str).unwrap_or(PredictionStatus::Pending),
            actual_price: row.get(8)?,
            resolved_at: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}
