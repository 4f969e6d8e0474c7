//! `SQLite` implementation of [`ActionRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use switchyard_app::ports::ActionRepository;
use switchyard_domain::action::{Action, ActionStatus, Failure, FailureKind, NewAction, Outcome};
use switchyard_domain::device::DeviceTypeCode;
use switchyard_domain::error::SwitchyardError;
use switchyard_domain::id::ActionId;
use switchyard_domain::time::{Timestamp, from_storage, now, to_storage};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Action`].
struct Wrapper(Action);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Action> {
        value.map(|w| w.0)
    }
}

/// A stored row that does not map onto an [`Action`].
struct Rejected {
    id: Option<i64>,
    reason: String,
}

/// Decode rows one at a time so a single malformed row cannot hide the rest.
fn decode_rows(rows: &[SqliteRow]) -> (Vec<Action>, Vec<Rejected>) {
    let mut actions = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        match Wrapper::from_row(row) {
            Ok(Wrapper(action)) => actions.push(action),
            Err(err) => rejected.push(Rejected {
                id: row.try_get("action_id").ok(),
                reason: format!("malformed action row: {err}"),
            }),
        }
    }
    (actions, rejected)
}

/// Listing queries skip rows they cannot decode.
fn decode_listing(rows: &[SqliteRow]) -> Vec<Action> {
    let (actions, rejected) = decode_rows(rows);
    for row in rejected {
        tracing::warn!(action_id = ?row.id, reason = %row.reason, "skipping action row");
    }
    actions
}

fn decode_err(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    let value: String = row.try_get(column)?;
    from_storage(&value).map_err(decode_err)
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("action_id")?;
        let device_type: i64 = row.try_get("device_type")?;
        let device_id: String = row.try_get("device_id")?;
        let command: String = row.try_get("action")?;
        let actioned_at: Option<String> = row.try_get("actioned_at")?;
        let status: Option<i64> = row.try_get("status")?;
        let failure_kind: Option<String> = row.try_get("failure_kind")?;
        let failure_reason: Option<String> = row.try_get("failure_reason")?;

        let executed_at = actioned_at
            .as_deref()
            .map(from_storage)
            .transpose()
            .map_err(decode_err)?;
        let status = ActionStatus::from_code(status).map_err(decode_err)?;
        let failure = match failure_kind {
            Some(kind) => Some(Failure {
                kind: kind.parse::<FailureKind>().map_err(decode_err)?,
                reason: failure_reason.unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Self(Action {
            id: ActionId::new(id),
            created_at: timestamp(row, "created_at")?,
            scheduled_at: timestamp(row, "action_time")?,
            device_type: DeviceTypeCode(device_type),
            device_id,
            command,
            executed_at,
            status,
            failure,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO action (created_at, action_time, device_type, device_id, action)
    VALUES (?, ?, ?, ?, ?)
    RETURNING *
";
const SELECT_BY_ID: &str = "SELECT * FROM action WHERE action_id = ?";
const SELECT_RECENT: &str = "SELECT * FROM action ORDER BY action_id DESC LIMIT ?";
const SELECT_FOR_DEVICE: &str =
    "SELECT * FROM action WHERE device_id = ? ORDER BY action_id DESC LIMIT ?";
const SELECT_PENDING: &str = "SELECT * FROM action WHERE status IS NULL ORDER BY action_id";
const CANCEL_PENDING: &str =
    "UPDATE action SET status = ? WHERE action_id = ? AND status IS NULL";
const SELECT_DUE: &str = r"
    SELECT * FROM action
    WHERE status IS NULL
      AND actioned_at IS NULL
      AND action_time <= ?
    ORDER BY action_time DESC, action_id DESC
";
const RECORD_OUTCOME: &str = r"
    UPDATE action
    SET status = ?, actioned_at = ?, failure_kind = ?, failure_reason = ?
    WHERE action_id = ? AND status IS NULL
";

/// `SQLite`-backed action repository.
///
/// Pending rows written by other producers may not decode (foreign timestamp
/// text, for instance). The queries feeding the execution cycle mark such rows
/// `Failed` with a `configuration` reason and carry on with the rest.
#[derive(Clone)]
pub struct SqliteActionRepository {
    pool: SqlitePool,
}

impl SqliteActionRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_one<'e, E>(executor: E, action: &NewAction) -> Result<Action, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Wrapper = sqlx::query_as(INSERT)
        .bind(to_storage(action.created_at))
        .bind(to_storage(action.scheduled_at))
        .bind(action.device_type.0)
        .bind(&action.device_id)
        .bind(&action.command)
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

fn limit_param(limit: u32) -> i64 {
    i64::from(limit)
}

async fn write_outcome<'e, E>(
    executor: E,
    id: i64,
    outcome: &Outcome,
    executed_at: Timestamp,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let status = outcome.status();
    let failure = outcome.failure();
    let result = sqlx::query(RECORD_OUTCOME)
        .bind(status.code())
        .bind(status.records_execution().then(|| to_storage(executed_at)))
        .bind(failure.map(|f| f.kind.as_str()))
        .bind(failure.map(|f| f.reason.as_str()))
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Mark pending rows that could not be decoded as failed.
async fn fail_rejected(pool: &SqlitePool, rejected: Vec<Rejected>) -> Result<(), sqlx::Error> {
    let executed_at = now();
    for row in rejected {
        let Some(id) = row.id else {
            tracing::warn!(reason = %row.reason, "skipping pending row without id");
            continue;
        };
        tracing::warn!(action_id = id, reason = %row.reason, "failing malformed pending action");
        let outcome = Outcome::Failed(Failure {
            kind: FailureKind::Configuration,
            reason: row.reason,
        });
        write_outcome(pool, id, &outcome, executed_at).await?;
    }
    Ok(())
}

impl ActionRepository for SqliteActionRepository {
    fn insert(
        &self,
        action: NewAction,
    ) -> impl Future<Output = Result<Action, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let stored = insert_one(&pool, &action)
                .await
                .map_err(StorageError::from)?;
            Ok(stored)
        }
    }

    fn insert_many(
        &self,
        actions: Vec<NewAction>,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let mut stored = Vec::with_capacity(actions.len());
            for action in &actions {
                stored.push(
                    insert_one(&mut *tx, action)
                        .await
                        .map_err(StorageError::from)?,
                );
            }
            tx.commit().await.map_err(StorageError::from)?;
            Ok(stored)
        }
    }

    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_RECENT)
                .bind(limit_param(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(decode_listing(&rows))
        }
    }

    fn find_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        let device_id = device_id.to_string();
        async move {
            let rows = sqlx::query(SELECT_FOR_DEVICE)
                .bind(device_id)
                .bind(limit_param(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(decode_listing(&rows))
        }
    }

    fn find_pending(&self) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_PENDING)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let (actions, rejected) = decode_rows(&rows);
            fail_rejected(&pool, rejected)
                .await
                .map_err(StorageError::from)?;
            Ok(actions)
        }
    }

    fn cancel(
        &self,
        ids: &[ActionId],
    ) -> impl Future<Output = Result<u64, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        let ids = ids.to_vec();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let mut cancelled = 0;
            for id in ids {
                let result = sqlx::query(CANCEL_PENDING)
                    .bind(ActionStatus::Cancelled.code())
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                cancelled += result.rows_affected();
            }
            tx.commit().await.map_err(StorageError::from)?;
            Ok(cancelled)
        }
    }

    fn find_due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_DUE)
                .bind(to_storage(now))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let (actions, rejected) = decode_rows(&rows);
            fail_rejected(&pool, rejected)
                .await
                .map_err(StorageError::from)?;
            Ok(actions)
        }
    }

    fn record_outcome(
        &self,
        id: ActionId,
        outcome: &Outcome,
        executed_at: Timestamp,
    ) -> impl Future<Output = Result<bool, SwitchyardError>> + Send {
        let pool = self.pool.clone();
        let outcome = outcome.clone();
        async move {
            let recorded = write_outcome(&pool, id.as_i64(), &outcome, executed_at)
                .await
                .map_err(StorageError::from)?;
            Ok(recorded)
        }
    }
}
