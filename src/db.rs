use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use crate::permissions::{PermissionNode, PermissionSnapshot};
use crate::question::QuestionSetRecord;

pub const DB_FILE: &str = "examdesk.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS question_sets(
            id TEXT PRIMARY KEY,
            question_type TEXT NOT NULL,
            method TEXT NOT NULL,
            exam_name TEXT NOT NULL,
            class_name TEXT NOT NULL,
            group_name TEXT NOT NULL,
            subject TEXT NOT NULL,
            chapter TEXT NOT NULL,
            question_type_detail TEXT NOT NULL,
            total_questions INTEGER NOT NULL,
            selected_question_ids TEXT NOT NULL,
            created_by TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS role_permissions(
            role TEXT PRIMARY KEY,
            tree_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(
            serde_json::from_str(&s).with_context(|| format!("settings {} is not valid json", key))?,
        )),
        None => Ok(None),
    }
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, value.to_string()),
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct StoredQuestionSet {
    pub id: String,
    pub record: QuestionSetRecord,
    pub created_by: Option<String>,
    pub created_at: String,
}

pub fn question_set_insert(
    conn: &Connection,
    record: &QuestionSetRecord,
    created_by: Option<&str>,
) -> anyhow::Result<String> {
    let id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();
    let selected = serde_json::to_string(&record.selected_question_ids)?;
    conn.execute(
        "INSERT INTO question_sets(
            id, question_type, method, exam_name, class_name, group_name, subject,
            chapter, question_type_detail, total_questions, selected_question_ids,
            created_by, created_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            id,
            record.question_type,
            record.method,
            record.exam_name,
            record.class_name,
            record.group,
            record.subject,
            record.chapter,
            record.question_type_detail,
            record.total_questions,
            selected,
            created_by,
            created_at,
        ],
    )?;
    Ok(id)
}

const QUESTION_SET_COLUMNS: &str = "id, question_type, method, exam_name, class_name, group_name,
    subject, chapter, question_type_detail, total_questions, selected_question_ids,
    created_by, created_at";

fn question_set_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(StoredQuestionSet, String)> {
    let selected_raw: String = row.get(10)?;
    Ok((
        StoredQuestionSet {
            id: row.get(0)?,
            record: QuestionSetRecord {
                question_type: row.get(1)?,
                method: row.get(2)?,
                exam_name: row.get(3)?,
                class_name: row.get(4)?,
                group: row.get(5)?,
                subject: row.get(6)?,
                chapter: row.get(7)?,
                question_type_detail: row.get(8)?,
                total_questions: row.get(9)?,
                selected_question_ids: Vec::new(),
            },
            created_by: row.get(11)?,
            created_at: row.get(12)?,
        },
        selected_raw,
    ))
}

fn decode_selected(mut set: StoredQuestionSet, raw: &str) -> anyhow::Result<StoredQuestionSet> {
    set.record.selected_question_ids = serde_json::from_str(raw)
        .with_context(|| format!("question set {} has malformed selection", set.id))?;
    Ok(set)
}

pub fn question_sets_list(conn: &Connection) -> anyhow::Result<Vec<StoredQuestionSet>> {
    let sql = format!(
        "SELECT {} FROM question_sets ORDER BY rowid",
        QUESTION_SET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], question_set_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(|(set, raw)| decode_selected(set, &raw))
        .collect()
}

pub fn question_set_get(conn: &Connection, id: &str) -> anyhow::Result<Option<StoredQuestionSet>> {
    let sql = format!("SELECT {} FROM question_sets WHERE id = ?", QUESTION_SET_COLUMNS);
    let row = conn
        .query_row(&sql, [id], question_set_from_row)
        .optional()?;
    match row {
        Some((set, raw)) => Ok(Some(decode_selected(set, &raw)?)),
        None => Ok(None),
    }
}

pub fn role_permissions_get(
    conn: &Connection,
    role: &str,
) -> anyhow::Result<Option<Vec<PermissionNode>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT tree_json FROM role_permissions WHERE role = ?",
            [role],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => {
            let snapshot: PermissionSnapshot = serde_json::from_str(&s)
                .with_context(|| format!("saved permissions for {} are malformed", role))?;
            Ok(Some(snapshot.into_nodes()))
        }
        None => Ok(None),
    }
}

/// Upserts the role's tree and returns the timestamp written.
pub fn role_permissions_set(
    conn: &Connection,
    role: &str,
    snapshot: &PermissionSnapshot,
) -> anyhow::Result<String> {
    let updated_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO role_permissions(role, tree_json, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(role) DO UPDATE SET
           tree_json = excluded.tree_json,
           updated_at = excluded.updated_at",
        (role, serde_json::to_string(snapshot)?, &updated_at),
    )?;
    Ok(updated_at)
}

pub fn role_permissions_list(conn: &Connection) -> anyhow::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT role, updated_at FROM role_permissions ORDER BY role")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
