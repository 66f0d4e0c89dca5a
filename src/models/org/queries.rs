use rusqlite::{Connection, params};

use super::types::*;
use crate::errors::AppError;

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        display_name: row.get("display_name")?,
        email: row.get("email")?,
        role: row.get("role")?,
        faculty_id: row.get("faculty_id")?,
        department_id: row.get("department_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Create a faculty, returning its id.
pub fn create_faculty(conn: &Connection, name: &str) -> Result<i64, AppError> {
    conn.execute("INSERT INTO faculties (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Create a department, returning its id.
pub fn create_department(conn: &Connection, name: &str) -> Result<i64, AppError> {
    conn.execute("INSERT INTO departments (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Create a user, returning its id.
pub fn create_user(conn: &Connection, user: &NewUser) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO users (username, display_name, email, role, faculty_id, department_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.username,
            user.display_name,
            user.email,
            user.role,
            user.faculty_id,
            user.department_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a single user by id.
pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, display_name, email, role, faculty_id, department_id, created_at \
         FROM users WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_user)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Find a single faculty by id.
pub fn find_faculty_by_id(conn: &Connection, id: i64) -> Result<Option<Faculty>, AppError> {
    let mut stmt = conn.prepare("SELECT id, name FROM faculties WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], |row| {
        Ok(Faculty {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Faculty records for an id set, ordered by name. Used by the final stage
/// of the faculties-with-activity reduction.
pub fn faculties_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Faculty>, AppError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!(
        "SELECT id, name FROM faculties WHERE id IN ({placeholders}) ORDER BY name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok(Faculty {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Distinct faculty ids among a user id set. Middle stage of the
/// faculties-with-activity reduction.
pub fn faculty_ids_for_users(conn: &Connection, user_ids: &[i64]) -> Result<Vec<i64>, AppError> {
    if user_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; user_ids.len()].join(",");
    let sql = format!(
        "SELECT DISTINCT faculty_id FROM users \
         WHERE id IN ({placeholders}) AND faculty_id IS NOT NULL"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(user_ids.iter()), |row| {
            row.get::<_, i64>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
