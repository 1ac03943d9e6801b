use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{MemoRow, MemoWrite};
use crate::query::{Column, Filter, Order, Query};
use crate::schema;
use crate::store::MemoStore;

const ROW_COLUMNS: &str = "id, title, content, category, tags, created_at, updated_at";

/// SQL function `memo_icontains(haystack, needle)`, a substring match that
/// folds case for all of Unicode (`LIKE` only folds ASCII)
const CONTAINS_FN: &str = "memo_icontains";

/// Memo table in a local SQLite database.
///
/// Statements run on the connection's own thread, one at a time.
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
    /// Open or create a memos database at the specified path
    pub async fn open(path: &Path) -> StoreResult<Self> {
        debug!("Opening memos database at {:?}", path);
        let conn = tokio_rusqlite::Connection::open(path).await?;
        Self::from_connection(conn).await
    }

    /// Open a private database that lives as long as the store
    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(tokio_rusqlite::Connection::open_in_memory().await?).await
    }

    async fn from_connection(conn: tokio_rusqlite::Connection) -> StoreResult<Self> {
        let store = Self { conn };
        store
            .run(|conn| {
                register_functions(conn)?;
                schema::migrate(conn)?;
                Ok(())
            })
            .await?;
        Ok(store)
    }

    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        self.conn.call(move |conn| Ok(f(conn))).await?
    }
}

#[async_trait]
impl MemoStore for SqliteStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<MemoRow>> {
        let query = query.clone();
        self.run(move |conn| select_rows(conn, &query)).await
    }

    async fn select_single(&self, query: &Query) -> StoreResult<MemoRow> {
        let query = query.clone();
        self.run(move |conn| select_one(conn, &query)).await
    }

    async fn select_column(&self, column: Column, query: &Query) -> StoreResult<Vec<String>> {
        let (sql, values) = build_select(column.as_str(), query);
        debug!(%sql, "sqlite select column");

        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                read_text(row, 0, column)
            })?;

            let mut out = Vec::new();
            for value in rows {
                out.push(value?);
            }
            Ok(out)
        })
        .await
    }

    async fn insert(&self, row: &MemoWrite) -> StoreResult<MemoRow> {
        let row = row.clone();
        self.run(move |conn| {
            let id = ulid::Ulid::new().to_string();
            let now = Utc::now().timestamp_millis();
            let tags_json = serde_json::to_string(&row.tags)?;

            conn.execute(
                "INSERT INTO memos (id, title, content, category, tags, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, row.title, row.content, row.category, tags_json, now, now],
            )?;

            select_one(conn, &Query::new().filter(Filter::eq(Column::Id, id)))
        })
        .await
    }

    async fn update(&self, row: &MemoWrite, filter: &Filter) -> StoreResult<MemoRow> {
        let row = row.clone();
        let filter = filter.clone();
        self.run(move |conn| {
            let existing = select_one(conn, &Query::new().filter(filter))?;
            let now = Utc::now().timestamp_millis();
            let tags_json = serde_json::to_string(&row.tags)?;

            conn.execute(
                "UPDATE memos SET title = ?1, content = ?2, category = ?3, tags = ?4, updated_at = ?5 WHERE id = ?6",
                params![row.title, row.content, row.category, tags_json, now, existing.id],
            )?;

            select_one(conn, &Query::new().filter(Filter::eq(Column::Id, existing.id)))
        })
        .await
    }

    async fn delete(&self, filter: &Filter) -> StoreResult<()> {
        let mut values = Vec::new();
        let clause = render_filter(filter, &mut values);
        let sql = format!("DELETE FROM memos WHERE {}", clause);
        debug!(%sql, "sqlite delete");

        self.run(move |conn| {
            let removed = conn.execute(&sql, params_from_iter(values.iter()))?;
            debug!(removed, "sqlite rows deleted");
            Ok(())
        })
        .await
    }
}

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<String>(1)?;
            Ok(haystack.is_some_and(|h| contains_ignore_case(&h, &needle)))
        },
    )
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn select_rows(conn: &Connection, query: &Query) -> StoreResult<Vec<MemoRow>> {
    let (sql, values) = build_select(ROW_COLUMNS, query);
    debug!(%sql, "sqlite select");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), read_row)?;

    let mut memos = Vec::new();
    for row in rows {
        memos.push(row?);
    }
    Ok(memos)
}

/// Same contract as a PostgREST single-object request: anything but one row is `NoRows`
fn select_one(conn: &Connection, query: &Query) -> StoreResult<MemoRow> {
    let mut rows = select_rows(conn, query)?;
    if rows.len() != 1 {
        return Err(StoreError::NoRows);
    }
    rows.pop().ok_or(StoreError::NoRows)
}

fn build_select(columns: &str, query: &Query) -> (String, Vec<String>) {
    let mut sql = format!("SELECT {} FROM memos WHERE 1=1", columns);
    let mut values = Vec::new();

    for filter in &query.filters {
        let clause = render_filter(filter, &mut values);
        sql.push_str(" AND ");
        sql.push_str(&clause);
    }

    if let Some(order) = query.order {
        sql.push_str(&render_order(order));
    }

    (sql, values)
}

fn render_filter(filter: &Filter, values: &mut Vec<String>) -> String {
    match filter {
        Filter::Eq(column, value) => {
            values.push(value.clone());
            format!("{} = ?", column)
        }
        Filter::Neq(column, value) => {
            values.push(value.clone());
            format!("{} <> ?", column)
        }
        Filter::AnyContains { columns, needle } => {
            if columns.is_empty() {
                return "0".to_string();
            }
            let parts: Vec<String> = columns
                .iter()
                .map(|column| {
                    values.push(needle.clone());
                    format!("{}({}, ?)", CONTAINS_FN, column)
                })
                .collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// Ties on the order column fall back to insertion order in the same direction
fn render_order(order: Order) -> String {
    let direction = if order.ascending { "ASC" } else { "DESC" };
    format!(
        " ORDER BY {column} {direction}, rowid {direction}",
        column = order.column,
        direction = direction
    )
}

fn read_row(row: &Row) -> rusqlite::Result<MemoRow> {
    let tags_json: String = row.get(4)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(MemoRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags,
        created_at: read_timestamp(row, 5)?,
        updated_at: read_timestamp(row, 6)?,
    })
}

fn read_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn read_text(row: &Row, idx: usize, column: Column) -> rusqlite::Result<String> {
    match column {
        Column::CreatedAt | Column::UpdatedAt => Ok(read_timestamp(row, idx)?.to_rfc3339()),
        _ => row.get(idx),
    }
}
