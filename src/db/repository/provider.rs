use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Provider, ProviderUpdate};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PROVIDER_COLUMNS: &str = "id, first_name, last_name, email, phone, license_number,
        specialty, years_of_experience, created_at";

/// Insert a provider record with its credential hash.
pub fn insert_provider(
    conn: &Connection,
    provider: &Provider,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO providers (id, first_name, last_name, email, phone, license_number,
                                specialty, years_of_experience, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            provider.id.to_string(),
            provider.first_name,
            provider.last_name,
            provider.email,
            provider.phone,
            provider.license_number,
            provider.specialty,
            provider.years_of_experience,
            password_hash,
            provider.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .map_err(map_unique_violation)?;
    Ok(())
}

/// Get all providers, oldest account first.
pub fn list_providers(conn: &Connection) -> Result<Vec<Provider>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers ORDER BY created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], row_to_provider)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Get a provider by ID.
pub fn get_provider(conn: &Connection, id: &Uuid) -> Result<Option<Provider>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_provider)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Get a provider by email (unique).
pub fn find_provider_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Provider>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers WHERE email = ?1"
    ))?;
    let mut rows = stmt.query_map(params![email], row_to_provider)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Look up the credential hash for a login attempt.
pub fn provider_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(Uuid, String)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, password_hash FROM providers WHERE email = ?1")?;
    let mut rows = stmt.query_map(params![email], |row| {
        let id: String = row.get(0)?;
        let hash: String = row.get(1)?;
        Ok((id, hash))
    })?;
    match rows.next() {
        Some(row) => {
            let (id, hash) = row?;
            let id = Uuid::parse_str(&id).map_err(|_| DatabaseError::ConstraintViolation(
                format!("malformed provider id for {email}"),
            ))?;
            Ok(Some((id, hash)))
        }
        None => Ok(None),
    }
}

/// Apply a partial update and return the new record.
pub fn update_provider(
    conn: &Connection,
    id: &Uuid,
    update: &ProviderUpdate,
) -> Result<Provider, DatabaseError> {
    let current = get_provider(conn, id)?.ok_or_else(|| not_found(id))?;

    let updated = Provider {
        first_name: update.first_name.clone().unwrap_or(current.first_name),
        last_name: update.last_name.clone().unwrap_or(current.last_name),
        email: update.email.clone().unwrap_or(current.email),
        phone: update.phone.clone().unwrap_or(current.phone),
        license_number: update.license_number.clone().unwrap_or(current.license_number),
        specialty: update.specialty.clone().unwrap_or(current.specialty),
        years_of_experience: update
            .years_of_experience
            .unwrap_or(current.years_of_experience),
        ..current
    };

    conn.execute(
        "UPDATE providers
         SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5, license_number = ?6,
             specialty = ?7, years_of_experience = ?8
         WHERE id = ?1",
        params![
            id.to_string(),
            updated.first_name,
            updated.last_name,
            updated.email,
            updated.phone,
            updated.license_number,
            updated.specialty,
            updated.years_of_experience,
        ],
    )
    .map_err(map_unique_violation)?;

    Ok(updated)
}

/// Delete a provider by ID.
pub fn delete_provider(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM providers WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "provider".into(),
        id: id.to_string(),
    }
}

fn map_unique_violation(err: rusqlite::Error) -> DatabaseError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation("email already registered".into())
        }
        _ => DatabaseError::Sqlite(err),
    }
}

fn row_to_provider(row: &rusqlite::Row) -> Result<Provider, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(8)?;

    Ok(Provider {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        license_number: row.get(5)?,
        specialty: row.get(6)?,
        years_of_experience: row.get(7)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}
