//! Local backend over the embedded SQLite `single_model` table.
//!
//! # Responsibility
//! - Provide CRUD over one row per record, addressed by integer rowid.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Booleans are stored as 0/1, timestamps as RFC 3339 UTC text.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Delete is idempotent; update of a missing row is `not_found`.

use super::{ModelBackend, TableStatus};
use crate::codec;
use crate::config::OperationContext;
use crate::db::migrations::apply_migrations;
use crate::db::{DbError, SharedStore};
use crate::error::{MappError, MappResult};
use crate::model::single_model::{DateTime, ListResult, ModelId, Page, SingleEnum, SingleModel};
use chrono::SecondsFormat;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

const MODEL_SELECT_SQL: &str = "SELECT
    id,
    single_bool,
    single_int,
    single_float,
    single_string,
    single_enum,
    single_datetime
FROM single_model";

/// SQLite-backed record storage sharing one process-wide handle.
#[derive(Clone)]
pub struct LocalBackend {
    store: Arc<SharedStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<SharedStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SharedStore> {
        &self.store
    }

    fn with_conn<T>(
        &self,
        ctx: &OperationContext,
        op: impl FnOnce(&mut Connection) -> MappResult<T>,
    ) -> MappResult<T> {
        let shared = self.store.acquire(&ctx.store)?;
        let mut conn = shared
            .lock()
            .map_err(|_| MappError::from(DbError::Poisoned))?;
        op(&mut conn)
    }
}

impl ModelBackend for LocalBackend {
    fn create(&self, ctx: &OperationContext, model: SingleModel) -> MappResult<SingleModel> {
        codec::validate(&model)?;

        self.with_conn(ctx, |conn| {
            conn.execute(
                "INSERT INTO single_model (
                    single_bool,
                    single_int,
                    single_float,
                    single_string,
                    single_enum,
                    single_datetime
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    bool_to_int(model.single_bool),
                    model.single_int,
                    model.single_float,
                    model.single_string.as_str(),
                    model.single_enum.as_str(),
                    datetime_to_db(&model.single_datetime),
                ],
            )?;

            let id = conn.last_insert_rowid().to_string();
            debug!("event=model_create module=local status=ok id={id}");
            Ok(model.with_id(id))
        })
    }

    fn read(&self, ctx: &OperationContext, id: &str) -> MappResult<SingleModel> {
        let Some(row_id) = parse_row_id(id) else {
            return Err(MappError::not_found(id));
        };

        self.with_conn(ctx, |conn| {
            let mut stmt = conn.prepare(&format!("{MODEL_SELECT_SQL} WHERE id = ?1;"))?;
            let model = stmt
                .query_row([row_id], |row| Ok(parse_model_row(row)))
                .optional()?;

            match model {
                Some(parsed) => parsed,
                None => Err(MappError::not_found(id)),
            }
        })
    }

    fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        model: SingleModel,
    ) -> MappResult<SingleModel> {
        codec::validate(&model)?;
        let Some(row_id) = parse_row_id(id) else {
            return Err(MappError::not_found(id));
        };

        self.with_conn(ctx, |conn| {
            let changed = conn.execute(
                "UPDATE single_model
                 SET
                    single_bool = ?1,
                    single_int = ?2,
                    single_float = ?3,
                    single_string = ?4,
                    single_enum = ?5,
                    single_datetime = ?6
                 WHERE id = ?7;",
                params![
                    bool_to_int(model.single_bool),
                    model.single_int,
                    model.single_float,
                    model.single_string.as_str(),
                    model.single_enum.as_str(),
                    datetime_to_db(&model.single_datetime),
                    row_id,
                ],
            )?;

            if changed == 0 {
                return Err(MappError::not_found(id));
            }

            Ok(model.with_id(id))
        })
    }

    fn delete(&self, ctx: &OperationContext, id: &str) -> MappResult<()> {
        let Some(row_id) = parse_row_id(id) else {
            return Ok(());
        };

        self.with_conn(ctx, |conn| {
            let changed = conn.execute("DELETE FROM single_model WHERE id = ?1;", [row_id])?;
            debug!("event=model_delete module=local status=ok id={id} changed={changed}");
            Ok(())
        })
    }

    fn list(&self, ctx: &OperationContext, page: Page) -> MappResult<ListResult> {
        self.with_conn(ctx, |conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM single_model;", [], |row| row.get(0))?;
            let total = u64::try_from(count)
                .map_err(|_| MappError::Db(format!("invalid row count `{count}`")))?;

            let mut stmt = conn.prepare(&format!(
                "{MODEL_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
            ))?;
            let mut rows = stmt.query(params![i64::from(page.limit), i64::from(page.offset)])?;
            let mut items = Vec::new();

            while let Some(row) = rows.next()? {
                items.push(parse_model_row(row)?);
            }

            Ok(ListResult { total, items })
        })
    }

    fn create_table(&self, ctx: &OperationContext) -> MappResult<TableStatus> {
        self.with_conn(ctx, |conn| {
            let applied = apply_migrations(conn)?;
            info!(
                "event=create_table module=local status=ok table=single_model applied={applied}"
            );
            Ok(TableStatus {
                message: "table single_model created successfully".to_string(),
                status: "success".to_string(),
            })
        })
    }
}

fn parse_model_row(row: &Row<'_>) -> MappResult<SingleModel> {
    let id: i64 = row.get("id")?;

    let single_bool = match row.get::<_, i64>("single_bool")? {
        0 => false,
        1 => true,
        other => {
            return Err(MappError::Db(format!(
                "invalid single_bool value `{other}` in single_model.single_bool"
            )));
        }
    };

    let enum_text: String = row.get("single_enum")?;
    let single_enum = enum_text.parse::<SingleEnum>().map_err(|()| {
        MappError::Db(format!(
            "invalid enum value `{enum_text}` in single_model.single_enum"
        ))
    })?;

    let datetime_text: String = row.get("single_datetime")?;
    let single_datetime = datetime_from_db(&datetime_text)?;

    Ok(SingleModel {
        id: ModelId::Assigned(id.to_string()),
        single_bool,
        single_int: row.get("single_int")?,
        single_float: row.get("single_float")?,
        single_string: row.get("single_string")?,
        single_enum,
        single_datetime,
    })
}

/// Accepts only the canonical decimal form a row id is rendered in.
fn parse_row_id(id: &str) -> Option<i64> {
    id.parse::<i64>()
        .ok()
        .filter(|row_id| row_id.to_string() == id)
}

fn datetime_to_db(value: &DateTime) -> String {
    value
        .naive()
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn datetime_from_db(value: &str) -> MappResult<DateTime> {
    let invalid = |reason: String| {
        MappError::Db(format!(
            "invalid datetime `{value}` in single_model.single_datetime: {reason}"
        ))
    };
    let parsed =
        chrono::DateTime::parse_from_rfc3339(value).map_err(|err| invalid(err.to_string()))?;
    DateTime::new(parsed.naive_utc()).map_err(|err| invalid(err.to_string()))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
