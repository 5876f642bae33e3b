//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use vesting_api::{
    DistributionMode, EventType, Frequency, Grant, LifecycleStatus, Milestone, Plan, PlanFallback,
    ScheduleDefinition, ScheduleKind, VestingEvent,
};
use vesting_util::{format_date, GrantId, PlanId, ScheduleId, DATE_FORMAT};

use crate::{AuditEvent, AuditEventType, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Schedule templates
            CREATE TABLE IF NOT EXISTS schedules (
                id TEXT PRIMARY KEY,
                duration_months INTEGER NOT NULL,
                cliff_months INTEGER NOT NULL,
                frequency TEXT NOT NULL,
                distribution_mode TEXT NOT NULL,
                kind TEXT NOT NULL
            );

            -- Plans
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                schedule_id TEXT,
                kind TEXT,
                fallback_years INTEGER,
                fallback_cliff_months INTEGER,
                fallback_frequency TEXT
            );

            -- Grants
            CREATE TABLE IF NOT EXISTS grants (
                id TEXT PRIMARY KEY,
                plan_id TEXT,
                schedule_id TEXT,
                total_shares INTEGER NOT NULL,
                vesting_start_date TEXT NOT NULL,
                distribution_mode TEXT
            );

            -- Milestone templates (months_from_start may be NULL in rows
            -- written by older tooling)
            CREATE TABLE IF NOT EXISTS milestones (
                schedule_id TEXT NOT NULL,
                sequence_order INTEGER NOT NULL,
                months_from_start INTEGER,
                vesting_percentage REAL,
                PRIMARY KEY (schedule_id, sequence_order)
            );

            -- Vesting events
            CREATE TABLE IF NOT EXISTS vesting_events (
                grant_id TEXT NOT NULL,
                sequence_number INTEGER NOT NULL,
                event_date TEXT NOT NULL,
                shares INTEGER NOT NULL,
                cumulative_shares INTEGER NOT NULL,
                event_type TEXT NOT NULL,
                lifecycle_status TEXT NOT NULL DEFAULT 'pending',
                actual_vest_date TEXT,
                PRIMARY KEY (grant_id, sequence_number)
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_date ON vesting_events(event_date);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn count_settled_events(conn: &Connection, grant_id: &GrantId) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM vesting_events WHERE grant_id = ? AND lifecycle_status != 'pending'",
        [grant_id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn to_sql_int(value: u64, what: &str) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::Rejected(format!("{} {} is out of range", what, value)))
}

fn from_sql_int(value: i64, what: &str) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {}: {}", what, value)))
}

fn parse_stored<T>(value: &str, parse: fn(&str) -> Option<T>, what: &str) -> StoreResult<T> {
    parse(value).ok_or_else(|| StoreError::Corrupt(format!("unknown {}: {}", what, value)))
}

fn parse_stored_date(value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("bad date '{}': {}", value, e)))
}

// Milestone offsets and percentages that don't decode are read as absent,
// so the reconciliation check sees the row and can replace the set.

fn lenient_months(sequence_order: u32, value: Value) -> Option<u32> {
    if let Value::Integer(i) = value
        && let Ok(months) = u32::try_from(i)
    {
        return Some(months);
    }
    match value {
        Value::Null => None,
        other => {
            warn!(sequence_order, value = ?other, "Unreadable milestone offset");
            None
        }
    }
}

fn lenient_percentage(value: Value) -> Option<f64> {
    match value {
        Value::Real(f) if f.is_finite() => Some(f),
        Value::Integer(i) => Some(i as f64),
        _ => None,
    }
}

type ScheduleRow = (String, u32, u32, String, String, String);

fn decode_schedule(row: ScheduleRow) -> StoreResult<ScheduleDefinition> {
    let (id, duration, cliff, frequency, mode, kind) = row;
    Ok(ScheduleDefinition {
        id: ScheduleId::new(id),
        total_duration_months: duration,
        cliff_months: cliff,
        frequency: parse_stored(&frequency, Frequency::parse, "frequency")?,
        distribution_mode: parse_stored(&mode, DistributionMode::parse, "distribution mode")?,
        schedule_kind: parse_stored(&kind, ScheduleKind::parse, "schedule kind")?,
    })
}

type GrantRow = (String, Option<String>, Option<String>, i64, String, Option<String>);

fn decode_grant(row: GrantRow) -> StoreResult<Grant> {
    let (id, plan_id, schedule_id, shares, start, mode) = row;
    Ok(Grant {
        id: GrantId::new(id),
        plan_id: plan_id.map(PlanId::new),
        schedule_id: schedule_id.map(ScheduleId::new),
        total_shares: from_sql_int(shares, "total_shares")?,
        vesting_start_date: parse_stored_date(&start)?,
        distribution_mode: mode
            .map(|m| parse_stored(&m, DistributionMode::parse, "distribution mode"))
            .transpose()?,
    })
}

fn insert_events(tx: &Transaction<'_>, grant_id: &GrantId, events: &[VestingEvent]) -> StoreResult<()> {
    let mut stmt = tx.prepare(
        r#"
        INSERT INTO vesting_events (
            grant_id, sequence_number, event_date, shares, cumulative_shares,
            event_type, lifecycle_status, actual_vest_date
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )?;

    for event in events {
        stmt.execute(params![
            grant_id.as_str(),
            event.sequence_number,
            format_date(event.event_date),
            to_sql_int(event.shares, "shares")?,
            to_sql_int(event.cumulative_shares, "cumulative_shares")?,
            event.event_type.as_str(),
            event.lifecycle_status.as_str(),
            event.actual_vest_date.map(format_date),
        ])?;
    }

    Ok(())
}

impl Store for SqliteStore {
    fn upsert_schedule(&self, schedule: &ScheduleDefinition) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO schedules (id, duration_months, cliff_months, frequency, distribution_mode, kind)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                duration_months = excluded.duration_months,
                cliff_months = excluded.cliff_months,
                frequency = excluded.frequency,
                distribution_mode = excluded.distribution_mode,
                kind = excluded.kind
            "#,
            params![
                schedule.id.as_str(),
                schedule.total_duration_months,
                schedule.cliff_months,
                schedule.frequency.as_str(),
                schedule.distribution_mode.as_str(),
                schedule.schedule_kind.as_str(),
            ],
        )?;

        debug!(schedule_id = %schedule.id, "Schedule saved");
        Ok(())
    }

    fn get_schedule(&self, id: &ScheduleId) -> StoreResult<Option<ScheduleDefinition>> {
        let conn = self.conn()?;

        let row: Option<ScheduleRow> = conn
            .query_row(
                "SELECT id, duration_months, cliff_months, frequency, distribution_mode, kind FROM schedules WHERE id = ?",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?)),
            )
            .optional()?;

        row.map(decode_schedule).transpose()
    }

    fn list_schedules(&self) -> StoreResult<Vec<ScheduleDefinition>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, duration_months, cliff_months, frequency, distribution_mode, kind FROM schedules ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(decode_schedule(row?)?);
        }
        Ok(schedules)
    }

    fn upsert_plan(&self, plan: &Plan) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO plans (id, name, schedule_id, kind, fallback_years, fallback_cliff_months, fallback_frequency)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                schedule_id = excluded.schedule_id,
                kind = excluded.kind,
                fallback_years = excluded.fallback_years,
                fallback_cliff_months = excluded.fallback_cliff_months,
                fallback_frequency = excluded.fallback_frequency
            "#,
            params![
                plan.id.as_str(),
                plan.name,
                plan.schedule_id.as_ref().map(|s| s.as_str()),
                plan.schedule_kind.map(|k| k.as_str()),
                plan.fallback.map(|f| f.years),
                plan.fallback.map(|f| f.cliff_months),
                plan.fallback.map(|f| f.frequency.as_str()),
            ],
        )?;

        debug!(plan_id = %plan.id, "Plan saved");
        Ok(())
    }

    fn get_plan(&self, id: &PlanId) -> StoreResult<Option<Plan>> {
        let conn = self.conn()?;

        #[allow(clippy::type_complexity)]
        let row: Option<(
            String,
            String,
            Option<String>,
            Option<String>,
            Option<u32>,
            Option<u32>,
            Option<String>,
        )> = conn
            .query_row(
                r#"
                SELECT id, name, schedule_id, kind, fallback_years, fallback_cliff_months, fallback_frequency
                FROM plans WHERE id = ?
                "#,
                [id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, schedule_id, kind, years, cliff, frequency)) = row else {
            return Ok(None);
        };

        let fallback = match (years, frequency) {
            (Some(years), Some(frequency)) => Some(PlanFallback {
                years,
                cliff_months: cliff.unwrap_or(0),
                frequency: parse_stored(&frequency, Frequency::parse, "frequency")?,
            }),
            _ => None,
        };

        Ok(Some(Plan {
            id: PlanId::new(id),
            name,
            schedule_id: schedule_id.map(ScheduleId::new),
            schedule_kind: kind
                .map(|k| parse_stored(&k, ScheduleKind::parse, "schedule kind"))
                .transpose()?,
            fallback,
        }))
    }

    fn upsert_grant(&self, grant: &Grant) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT total_shares, vesting_start_date FROM grants WHERE id = ?",
                [grant.id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let total_shares = to_sql_int(grant.total_shares, "total_shares")?;
        let start = format_date(grant.vesting_start_date);

        if let Some((old_shares, old_start)) = existing
            && (old_shares != total_shares || old_start != start)
            && count_settled_events(&tx, &grant.id)? > 0
        {
            warn!(grant_id = %grant.id, "Refusing to change terms of a grant with settled events");
            return Err(StoreError::Rejected(format!(
                "grant {} has settled events; total_shares and vesting_start_date are frozen",
                grant.id
            )));
        }

        tx.execute(
            r#"
            INSERT INTO grants (id, plan_id, schedule_id, total_shares, vesting_start_date, distribution_mode)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                plan_id = excluded.plan_id,
                schedule_id = excluded.schedule_id,
                total_shares = excluded.total_shares,
                vesting_start_date = excluded.vesting_start_date,
                distribution_mode = excluded.distribution_mode
            "#,
            params![
                grant.id.as_str(),
                grant.plan_id.as_ref().map(|p| p.as_str()),
                grant.schedule_id.as_ref().map(|s| s.as_str()),
                total_shares,
                start,
                grant.distribution_mode.map(|m| m.as_str()),
            ],
        )?;
        tx.commit()?;

        debug!(grant_id = %grant.id, "Grant saved");
        Ok(())
    }

    fn get_grant(&self, id: &GrantId) -> StoreResult<Option<Grant>> {
        let conn = self.conn()?;

        let row: Option<GrantRow> = conn
            .query_row(
                r#"
                SELECT id, plan_id, schedule_id, total_shares, vesting_start_date, distribution_mode
                FROM grants WHERE id = ?
                "#,
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?)),
            )
            .optional()?;

        row.map(decode_grant).transpose()
    }

    fn list_grants(&self) -> StoreResult<Vec<Grant>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, plan_id, schedule_id, total_shares, vesting_start_date, distribution_mode
            FROM grants ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?;

        let mut grants = Vec::new();
        for row in rows {
            grants.push(decode_grant(row?)?);
        }
        Ok(grants)
    }

    fn get_milestones(&self, schedule_id: &ScheduleId) -> StoreResult<Vec<Milestone>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT sequence_order, months_from_start, vesting_percentage
            FROM milestones WHERE schedule_id = ? ORDER BY sequence_order
            "#,
        )?;
        let rows = stmt.query_map([schedule_id.as_str()], |row| {
            let sequence_order: i64 = row.get(0)?;
            let months: Value = row.get(1)?;
            let percentage: Value = row.get(2)?;
            Ok((sequence_order, months, percentage))
        })?;

        let mut milestones = Vec::new();
        for row in rows {
            let (sequence_order, months, percentage) = row?;
            let sequence_order = u32::try_from(sequence_order).map_err(|_| {
                StoreError::Corrupt(format!("milestone sequence_order {}", sequence_order))
            })?;
            milestones.push(Milestone {
                sequence_order,
                months_from_start: lenient_months(sequence_order, months),
                vesting_percentage: lenient_percentage(percentage),
            });
        }
        Ok(milestones)
    }

    fn replace_milestones(
        &self,
        schedule_id: &ScheduleId,
        milestones: &[Milestone],
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM milestones WHERE schedule_id = ?",
            [schedule_id.as_str()],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO milestones (schedule_id, sequence_order, months_from_start, vesting_percentage)
                VALUES (?, ?, ?, ?)
                "#,
            )?;
            for m in milestones {
                stmt.execute(params![
                    schedule_id.as_str(),
                    m.sequence_order,
                    m.months_from_start,
                    m.vesting_percentage,
                ])?;
            }
        }

        tx.commit()?;

        debug!(
            schedule_id = %schedule_id,
            deleted,
            inserted = milestones.len(),
            "Milestones replaced"
        );
        Ok(())
    }

    fn get_events(&self, grant_id: &GrantId) -> StoreResult<Vec<VestingEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT sequence_number, event_date, shares, cumulative_shares,
                   event_type, lifecycle_status, actual_vest_date
            FROM vesting_events WHERE grant_id = ? ORDER BY sequence_number
            "#,
        )?;
        let rows = stmt.query_map([grant_id.as_str()], |row| {
            let sequence_number: u32 = row.get(0)?;
            let event_date: String = row.get(1)?;
            let shares: i64 = row.get(2)?;
            let cumulative: i64 = row.get(3)?;
            let event_type: String = row.get(4)?;
            let status: String = row.get(5)?;
            let actual: Option<String> = row.get(6)?;
            Ok((sequence_number, event_date, shares, cumulative, event_type, status, actual))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (sequence_number, event_date, shares, cumulative, event_type, status, actual) = row?;
            events.push(VestingEvent {
                sequence_number,
                event_date: parse_stored_date(&event_date)?,
                shares: from_sql_int(shares, "shares")?,
                cumulative_shares: from_sql_int(cumulative, "cumulative_shares")?,
                event_type: parse_stored(&event_type, EventType::parse, "event type")?,
                lifecycle_status: parse_stored(&status, LifecycleStatus::parse, "lifecycle status")?,
                actual_vest_date: actual.as_deref().map(parse_stored_date).transpose()?,
            });
        }
        Ok(events)
    }

    fn replace_events(&self, grant_id: &GrantId, events: &[VestingEvent]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let settled = count_settled_events(&tx, grant_id)?;
        if settled > 0 {
            warn!(grant_id = %grant_id, settled, "Refusing to replace settled events");
            return Err(StoreError::Rejected(format!(
                "grant {} has {} event(s) past pending",
                grant_id, settled
            )));
        }

        let deleted = tx.execute(
            "DELETE FROM vesting_events WHERE grant_id = ?",
            [grant_id.as_str()],
        )?;
        insert_events(&tx, grant_id, events)?;
        tx.commit()?;

        debug!(
            grant_id = %grant_id,
            deleted,
            inserted = events.len(),
            "Vesting events replaced"
        );
        Ok(())
    }

    fn set_event_status(
        &self,
        grant_id: &GrantId,
        sequence_number: u32,
        status: LifecycleStatus,
        actual_vest_date: Option<NaiveDate>,
    ) -> StoreResult<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE vesting_events SET lifecycle_status = ?, actual_vest_date = ?
            WHERE grant_id = ? AND sequence_number = ?
            "#,
            params![
                status.as_str(),
                actual_vest_date.map(format_date),
                grant_id.as_str(),
                sequence_number,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                kind: "Vesting event",
                id: format!("{}#{}", grant_id, sequence_number),
            });
        }

        debug!(grant_id = %grant_id, sequence_number, status = %status, "Event status set");
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .map_err(|e| StoreError::Corrupt(format!("bad audit timestamp: {}", e)))?;
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule() -> ScheduleDefinition {
        ScheduleDefinition {
            id: ScheduleId::new("standard"),
            total_duration_months: 48,
            cliff_months: 12,
            frequency: Frequency::Annually,
            distribution_mode: DistributionMode::Percentage,
            schedule_kind: ScheduleKind::TimeBased,
        }
    }

    fn grant() -> Grant {
        Grant {
            id: GrantId::new("g-1"),
            plan_id: None,
            schedule_id: Some(ScheduleId::new("standard")),
            total_shares: 10_000,
            vesting_start_date: date(2024, 1, 1),
            distribution_mode: None,
        }
    }

    fn events() -> Vec<VestingEvent> {
        (1..=4)
            .map(|i| VestingEvent {
                sequence_number: i,
                event_date: date(2024 + i as i32, 1, 1),
                shares: 2_500,
                cumulative_shares: 2_500 * i as u64,
                event_type: if i == 1 { EventType::Cliff } else { EventType::TimeBased },
                lifecycle_status: LifecycleStatus::Pending,
                actual_vest_date: None,
            })
            .collect()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_schedule_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_schedule(&ScheduleId::new("standard")).unwrap().is_none());

        store.upsert_schedule(&schedule()).unwrap();
        let loaded = store.get_schedule(&ScheduleId::new("standard")).unwrap().unwrap();
        assert_eq!(loaded, schedule());
        assert_eq!(store.list_schedules().unwrap().len(), 1);
    }

    #[test]
    fn test_plan_with_fallback() {
        let store = SqliteStore::in_memory().unwrap();
        let plan = Plan {
            id: PlanId::new("esop"),
            name: "ESOP".into(),
            schedule_id: None,
            schedule_kind: Some(ScheduleKind::Hybrid),
            fallback: Some(PlanFallback {
                years: 3,
                cliff_months: 6,
                frequency: Frequency::Quarterly,
            }),
        };

        store.upsert_plan(&plan).unwrap();
        assert_eq!(store.get_plan(&PlanId::new("esop")).unwrap(), Some(plan));
    }

    #[test]
    fn test_milestones_replaced_in_full() {
        let store = SqliteStore::in_memory().unwrap();
        let id = ScheduleId::new("standard");

        let old: Vec<Milestone> = (0..5)
            .map(|i| Milestone {
                sequence_order: i,
                months_from_start: Some(12 * (i + 1)),
                vesting_percentage: None,
            })
            .collect();
        store.replace_milestones(&id, &old).unwrap();
        assert_eq!(store.get_milestones(&id).unwrap().len(), 5);

        let new = vec![
            Milestone {
                sequence_order: 0,
                months_from_start: Some(12),
                vesting_percentage: Some(25.0),
            },
            Milestone {
                sequence_order: 1,
                months_from_start: Some(24),
                vesting_percentage: Some(75.0),
            },
        ];
        store.replace_milestones(&id, &new).unwrap();
        assert_eq!(store.get_milestones(&id).unwrap(), new);
    }

    #[test]
    fn test_null_months_are_readable() {
        let store = SqliteStore::in_memory().unwrap();
        let id = ScheduleId::new("legacy");
        store
            .replace_milestones(
                &id,
                &[Milestone {
                    sequence_order: 0,
                    months_from_start: None,
                    vesting_percentage: None,
                }],
            )
            .unwrap();

        let loaded = store.get_milestones(&id).unwrap();
        assert_eq!(loaded[0].months_from_start, None);
    }

    #[test]
    fn test_malformed_milestone_values_read_as_absent() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute_batch(
                r#"
                INSERT INTO milestones VALUES ('s', 0, -12, 25.0);
                INSERT INTO milestones VALUES ('s', 1, 'soon', 'lots');
                INSERT INTO milestones VALUES ('s', 2, 36, 25);
                "#,
            )
            .unwrap();

        let loaded = store.get_milestones(&ScheduleId::new("s")).unwrap();
        let months: Vec<_> = loaded.iter().map(|m| m.months_from_start).collect();
        assert_eq!(months, vec![None, None, Some(36)]);
        assert_eq!(loaded[0].vesting_percentage, Some(25.0));
        assert_eq!(loaded[1].vesting_percentage, None);
        assert_eq!(loaded[2].vesting_percentage, Some(25.0));
    }

    #[test]
    fn test_events_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let grant_id = GrantId::new("g-1");

        store.replace_events(&grant_id, &events()).unwrap();
        assert_eq!(store.get_events(&grant_id).unwrap(), events());
    }

    #[test]
    fn test_settled_events_block_replacement() {
        let store = SqliteStore::in_memory().unwrap();
        let grant_id = GrantId::new("g-1");
        store.replace_events(&grant_id, &events()).unwrap();

        store
            .set_event_status(&grant_id, 1, LifecycleStatus::Vested, Some(date(2025, 1, 2)))
            .unwrap();

        let result = store.replace_events(&grant_id, &events()[..2]);
        assert!(matches!(result, Err(StoreError::Rejected(_))));

        // The original set survives untouched
        let stored = store.get_events(&grant_id).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].lifecycle_status, LifecycleStatus::Vested);
        assert_eq!(stored[0].actual_vest_date, Some(date(2025, 1, 2)));
    }

    #[test]
    fn test_grant_terms_frozen_after_settlement() {
        let store = SqliteStore::in_memory().unwrap();
        let mut g = grant();
        store.upsert_grant(&g).unwrap();
        store.replace_events(&g.id, &events()).unwrap();

        // Still all pending: terms may change
        g.total_shares = 20_000;
        store.upsert_grant(&g).unwrap();

        store
            .set_event_status(&g.id, 1, LifecycleStatus::Exercised, None)
            .unwrap();

        g.total_shares = 30_000;
        assert!(matches!(store.upsert_grant(&g), Err(StoreError::Rejected(_))));

        // Non-term fields still update
        let mut g = store.get_grant(&g.id).unwrap().unwrap();
        assert_eq!(g.total_shares, 20_000);
        g.distribution_mode = Some(DistributionMode::Even);
        store.upsert_grant(&g).unwrap();
    }

    #[test]
    fn test_set_status_on_missing_event() {
        let store = SqliteStore::in_memory().unwrap();
        let result = store.set_event_status(&GrantId::new("nope"), 1, LifecycleStatus::Vested, None);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        let event = AuditEvent::new(AuditEventType::EventsMaterialized {
            grant_id: GrantId::new("g-1"),
            event_count: 4,
            total_shares: 10_000,
        });
        store.append_audit(event).unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].event,
            AuditEventType::EventsMaterialized { event_count: 4, .. }
        ));
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vesting.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert_grant(&grant()).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get_grant(&GrantId::new("g-1")).unwrap(), Some(grant()));
    }
}
