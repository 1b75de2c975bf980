use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::health::ValidatedVitals;
use crate::models::{BloodPressure, HistoryEntry, Patient, PatientUpdate, Vitals};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

const PATIENT_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth,
        heart_rate, systolic, diastolic, glucose, weight, height, created_at, updated_at";

/// Insert a patient record with its credential hash.
pub fn insert_patient(
    conn: &Connection,
    patient: &Patient,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, email, phone, date_of_birth, password_hash,
                               heart_rate, systolic, diastolic, glucose, weight, height, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.email,
            patient.phone,
            patient.date_of_birth.format(DATE_FORMAT).to_string(),
            password_hash,
            patient.health_data.heart_rate,
            patient.health_data.blood_pressure.systolic,
            patient.health_data.blood_pressure.diastolic,
            patient.health_data.glucose,
            patient.health_data.weight,
            patient.health_data.height,
            patient.created_at.format(TIMESTAMP_FORMAT).to_string(),
            patient.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .map_err(map_unique_violation)?;
    Ok(())
}

/// Get all patients, oldest account first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Get a patient by ID.
pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Get a patient by email (unique).
pub fn find_patient_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1"
    ))?;
    let mut rows = stmt.query_map(params![email], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Look up the credential hash for a login attempt. The hash never leaves
/// this layer except through here.
pub fn patient_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(Uuid, String)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, password_hash FROM patients WHERE email = ?1")?;
    let mut rows = stmt.query_map(params![email], |row| {
        let id: String = row.get(0)?;
        let hash: String = row.get(1)?;
        Ok((id, hash))
    })?;
    match rows.next() {
        Some(row) => {
            let (id, hash) = row?;
            let id = Uuid::parse_str(&id).map_err(|_| DatabaseError::ConstraintViolation(
                format!("malformed patient id for {email}"),
            ))?;
            Ok(Some((id, hash)))
        }
        None => Ok(None),
    }
}

/// Apply a partial demographic/vitals update and return the new record.
/// Does not touch the history.
pub fn update_patient_profile(
    conn: &Connection,
    id: &Uuid,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let current = get_patient(conn, id)?.ok_or_else(|| not_found(id))?;

    let health_data = match &update.health_data {
        Some(patch) => patch.apply_to(&current.health_data),
        None => current.health_data,
    };
    let updated = Patient {
        first_name: update.first_name.clone().unwrap_or(current.first_name),
        last_name: update.last_name.clone().unwrap_or(current.last_name),
        email: update.email.clone().unwrap_or(current.email),
        phone: update.phone.clone().unwrap_or(current.phone),
        date_of_birth: update.date_of_birth.unwrap_or(current.date_of_birth),
        health_data,
        updated_at: Utc::now().naive_utc(),
        ..current
    };

    conn.execute(
        "UPDATE patients
         SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5, date_of_birth = ?6,
             heart_rate = ?7, systolic = ?8, diastolic = ?9, glucose = ?10, weight = ?11,
             height = ?12, updated_at = ?13
         WHERE id = ?1",
        params![
            id.to_string(),
            updated.first_name,
            updated.last_name,
            updated.email,
            updated.phone,
            updated.date_of_birth.format(DATE_FORMAT).to_string(),
            updated.health_data.heart_rate,
            updated.health_data.blood_pressure.systolic,
            updated.health_data.blood_pressure.diastolic,
            updated.health_data.glucose,
            updated.health_data.weight,
            updated.health_data.height,
            updated.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .map_err(map_unique_violation)?;

    Ok(updated)
}

/// Apply validated vitals: archive the current snapshot to the history,
/// stamped with the write time, then overwrite the current slot — one
/// transaction, so a failure leaves neither half applied. Returns the new
/// current vitals.
pub fn update_vitals(
    conn: &mut Connection,
    id: &Uuid,
    validated: &ValidatedVitals,
) -> Result<Vitals, DatabaseError> {
    let tx = conn.transaction()?;
    let now = Utc::now().naive_utc();

    let current = {
        let mut stmt = tx.prepare(
            "SELECT heart_rate, systolic, diastolic, glucose, weight, height
             FROM patients WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id.to_string()], row_to_vitals)?;
        match rows.next() {
            Some(row) => row?,
            None => return Err(not_found(id)),
        }
    };

    tx.execute(
        "INSERT INTO health_history (patient_id, recorded_at, heart_rate, systolic, diastolic, glucose, weight)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            now.format(TIMESTAMP_FORMAT).to_string(),
            current.heart_rate,
            current.blood_pressure.systolic,
            current.blood_pressure.diastolic,
            current.glucose,
            current.weight,
        ],
    )?;

    let new_vitals = validated.merged_with(&current);
    tx.execute(
        "UPDATE patients
         SET heart_rate = ?2, systolic = ?3, diastolic = ?4, glucose = ?5, weight = ?6,
             height = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            id.to_string(),
            new_vitals.heart_rate,
            new_vitals.blood_pressure.systolic,
            new_vitals.blood_pressure.diastolic,
            new_vitals.glucose,
            new_vitals.weight,
            new_vitals.height,
            now.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;

    tx.commit()?;
    Ok(new_vitals)
}

/// Get a patient's current vitals.
pub fn get_vitals(conn: &Connection, id: &Uuid) -> Result<Vitals, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT heart_rate, systolic, diastolic, glucose, weight, height
         FROM patients WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_vitals)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found(id)),
    }
}

/// Get a patient's archived snapshots, oldest first.
pub fn get_health_history(
    conn: &Connection,
    id: &Uuid,
) -> Result<Vec<HistoryEntry>, DatabaseError> {
    if get_patient(conn, id)?.is_none() {
        return Err(not_found(id));
    }

    let mut stmt = conn.prepare(
        "SELECT recorded_at, heart_rate, systolic, diastolic, glucose, weight
         FROM health_history
         WHERE patient_id = ?1
         ORDER BY recorded_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![id.to_string()], row_to_history_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Delete a patient and (via cascade) their history.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "patient".into(),
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

fn row_to_vitals(row: &rusqlite::Row) -> Result<Vitals, rusqlite::Error> {
    Ok(Vitals {
        heart_rate: row.get(0)?,
        blood_pressure: BloodPressure {
            systolic: row.get(1)?,
            diastolic: row.get(2)?,
        },
        glucose: row.get(3)?,
        weight: row.get(4)?,
        height: row.get(5)?,
    })
}

fn row_to_history_entry(row: &rusqlite::Row) -> Result<HistoryEntry, rusqlite::Error> {
    let recorded_str: String = row.get(0)?;
    Ok(HistoryEntry {
        date: NaiveDateTime::parse_from_str(&recorded_str, TIMESTAMP_FORMAT).unwrap_or_default(),
        heart_rate: row.get(1)?,
        blood_pressure: BloodPressure {
            systolic: row.get(2)?,
            diastolic: row.get(3)?,
        },
        glucose: row.get(4)?,
        weight: row.get(5)?,
    })
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let dob_str: String = row.get(5)?;
    let created_str: String = row.get(12)?;
    let updated_str: String = row.get(13)?;

    Ok(Patient {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        date_of_birth: NaiveDate::parse_from_str(&dob_str, DATE_FORMAT).unwrap_or_default(),
        health_data: Vitals {
            heart_rate: row.get(6)?,
            blood_pressure: BloodPressure {
                systolic: row.get(7)?,
                diastolic: row.get(8)?,
            },
            glucose: row.get(9)?,
            weight: row.get(10)?,
            height: row.get(11)?,
        },
        created_at: NaiveDateTime::parse_from_str(&created_str, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_str, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::health::{validate, VitalsSubmission};

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_patient(email: &str) -> Patient {
        let now = Utc::now().naive_utc();
        Patient {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Morris".into(),
            email: email.into(),
            phone: "555-0100".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1987, 4, 12).unwrap(),
            health_data: Vitals::baseline(),
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(hr: i64, bp: &str, glucose: i64, weight: f64) -> ValidatedVitals {
        let raw = format!(
            r#"{{"heartRate": {hr}, "bloodPressure": "{bp}", "glucose": {glucose}, "weight": {weight}}}"#
        );
        let sub: VitalsSubmission = serde_json::from_str(&raw).unwrap();
        validate(&sub).unwrap()
    }

    #[test]
    fn insert_and_retrieve() {
        let conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(loaded.email, "ada@example.com");
        assert!(loaded.health_data.is_baseline());
    }

    #[test]
    fn duplicate_email_is_a_constraint_violation() {
        let conn = test_db();
        insert_patient(&conn, &make_patient("ada@example.com"), "hash").unwrap();
        let result = insert_patient(&conn, &make_patient("ada@example.com"), "hash");
        assert!(matches!(
            result,
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn find_by_email() {
        let conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        let found = find_patient_by_email(&conn, "ada@example.com").unwrap().unwrap();
        assert_eq!(found.id, patient.id);
        assert!(find_patient_by_email(&conn, "nobody@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn credentials_lookup_returns_stored_hash() {
        let conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "stored-hash").unwrap();

        let (id, hash) = patient_credentials(&conn, "ada@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(id, patient.id);
        assert_eq!(hash, "stored-hash");
        assert!(patient_credentials(&conn, "nobody@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn list_orders_by_creation() {
        let conn = test_db();
        let mut first = make_patient("first@example.com");
        first.created_at = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut second = make_patient("second@example.com");
        second.created_at = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        insert_patient(&conn, &second, "hash").unwrap();
        insert_patient(&conn, &first, "hash").unwrap();

        let all = list_patients(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].email, "first@example.com");
    }

    #[test]
    fn profile_update_changes_only_provided_fields() {
        let conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        let update: PatientUpdate =
            serde_json::from_str(r#"{"phone": "555-0199", "healthData": {"height": 182.0}}"#)
                .unwrap();
        let updated = update_patient_profile(&conn, &patient.id, &update).unwrap();
        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.health_data.height, 182.0);
        assert_eq!(updated.health_data.heart_rate, 72);

        // No history entry from the unvalidated path.
        let history = get_health_history(&conn, &patient.id).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn profile_update_missing_patient_is_not_found() {
        let conn = test_db();
        let result = update_patient_profile(&conn, &Uuid::new_v4(), &PatientUpdate::default());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn vitals_update_archives_previous_snapshot() {
        let mut conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        let new_vitals =
            update_vitals(&mut conn, &patient.id, &submission(75, "118/76", 100, 68.5)).unwrap();
        assert_eq!(new_vitals.heart_rate, 75);
        assert_eq!(new_vitals.blood_pressure.systolic, 118);
        assert_eq!(new_vitals.weight, 68.5);
        // Height untouched by a submission that omits it.
        assert_eq!(new_vitals.height, 170.0);

        let history = get_health_history(&conn, &patient.id).unwrap();
        assert_eq!(history.len(), 1);
        // The archived entry is the snapshot that was current before the
        // update — the registration baseline.
        assert_eq!(history[0].heart_rate, 72);
        assert_eq!(history[0].blood_pressure.systolic, 120);
        assert_eq!(history[0].glucose, 95);

        let current = get_vitals(&conn, &patient.id).unwrap();
        assert_eq!(current, new_vitals);
    }

    #[test]
    fn history_grows_by_one_per_update_and_stays_ordered() {
        let mut conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        update_vitals(&mut conn, &patient.id, &submission(75, "118/76", 100, 68.5)).unwrap();
        update_vitals(&mut conn, &patient.id, &submission(82, "125/82", 110, 69.0)).unwrap();
        update_vitals(&mut conn, &patient.id, &submission(90, "131/86", 120, 69.5)).unwrap();

        let history = get_health_history(&conn, &patient.id).unwrap();
        assert_eq!(history.len(), 3);
        // Each entry records the state the next one replaced.
        assert_eq!(history[0].heart_rate, 72);
        assert_eq!(history[1].heart_rate, 75);
        assert_eq!(history[2].heart_rate, 82);
    }

    #[test]
    fn vitals_update_for_missing_patient_writes_nothing() {
        let mut conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();

        let result = update_vitals(&mut conn, &Uuid::new_v4(), &submission(75, "118/76", 100, 68.5));
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        // The existing patient's state is untouched.
        let history = get_health_history(&conn, &patient.id).unwrap();
        assert!(history.is_empty());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM health_history", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn history_of_missing_patient_is_not_found() {
        let conn = test_db();
        let result = get_health_history(&conn, &Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn delete_removes_patient_and_history() {
        let mut conn = test_db();
        let patient = make_patient("ada@example.com");
        insert_patient(&conn, &patient, "hash").unwrap();
        update_vitals(&mut conn, &patient.id, &submission(75, "118/76", 100, 68.5)).unwrap();

        delete_patient(&conn, &patient.id).unwrap();
        assert!(get_patient(&conn, &patient.id).unwrap().is_none());

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM health_history", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn delete_nonexistent_fails() {
        let conn = test_db();
        let result = delete_patient(&conn, &Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
