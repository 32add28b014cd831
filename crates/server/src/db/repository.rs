use async_trait::async_trait;
use deadpool_postgres::Pool;
use hcd_core::{Demographics, Patient};
use tokio_postgres::{Row, types::ToSql};

use super::{PatientFilter, PatientStore, StorageError};

/// Columns selected by every query, cast so row decoding does not depend on
/// the exact column types of the deployed schema.
const PATIENT_COLUMNS: &str = "id::bigint AS id, documento_id::text AS documento_id, \
     nombre::text AS nombre, apellido::text AS apellido, \
     fecha_nacimiento::text AS fecha_nacimiento, telefono::text AS telefono, \
     direccion::text AS direccion, correo::text AS correo";

/// PostgreSQL-backed [`PatientStore`]
#[derive(Clone)]
pub struct PgPatientStore {
    pool: Pool,
}

impl PgPatientStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<deadpool_postgres::Object, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

fn query_failed(err: tokio_postgres::Error) -> StorageError {
    StorageError::Failure(err.to_string())
}

fn patient_from_row(row: &Row) -> Result<Patient, StorageError> {
    let text = |column: &str| -> Result<Option<String>, StorageError> {
        row.try_get::<_, Option<String>>(column).map_err(query_failed)
    };

    Ok(Patient {
        id: row.try_get("id").map_err(query_failed)?,
        demographics: Demographics {
            document_id: text("documento_id")?.unwrap_or_default(),
            given_name: text("nombre")?.unwrap_or_default(),
            family_name: text("apellido")?.unwrap_or_default(),
            birth_date: text("fecha_nacimiento")?,
            phone: text("telefono")?,
            address: text("direccion")?,
            email: text("correo")?,
            gender: None,
        },
    })
}

/// WHERE clause for `filter`, numbering placeholders from `$1` in the order
/// name pattern, document.
fn search_predicate(filter: &PatientFilter) -> String {
    let mut clauses = Vec::new();
    let mut param = 0;

    if filter.name.is_some() {
        param += 1;
        clauses.push(format!("(nombre ILIKE ${param} OR apellido ILIKE ${param})"));
    }
    if filter.document.is_some() {
        param += 1;
        clauses.push(format!("documento_id::text = ${param}"));
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    }
}

/// `%` and `_` in user input match literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl PatientStore for PgPatientStore {
    async fn ping(&self) -> Result<(), StorageError> {
        let client = self.connection().await?;
        client.query_one("SELECT 1", &[]).await.map_err(query_failed)?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Patient>, StorageError> {
        let client = self.connection().await?;
        let sql = format!(
            "SELECT {} FROM public.pacientes WHERE id = $1::bigint",
            PATIENT_COLUMNS
        );
        let row = client.query_opt(sql.as_str(), &[&id]).await.map_err(query_failed)?;

        row.as_ref().map(patient_from_row).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Patient>, StorageError> {
        let client = self.connection().await?;
        let sql = format!(
            "SELECT {} FROM public.pacientes ORDER BY id LIMIT $1::bigint OFFSET $2::bigint",
            PATIENT_COLUMNS
        );
        let rows = client
            .query(sql.as_str(), &[&limit, &offset])
            .await
            .map_err(query_failed)?;

        rows.iter().map(patient_from_row).collect()
    }

    async fn search(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StorageError> {
        let name_pattern = filter.name.as_deref().map(like_pattern);

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(pattern) = &name_pattern {
            params.push(pattern);
        }
        if let Some(document) = &filter.document {
            params.push(document);
        }
        params.push(&filter.limit);

        let sql = format!(
            "SELECT {} FROM public.pacientes {} ORDER BY id LIMIT ${}::bigint",
            PATIENT_COLUMNS,
            search_predicate(filter),
            params.len()
        );

        let client = self.connection().await?;
        let rows = client.query(sql.as_str(), &params).await.map_err(query_failed)?;

        rows.iter().map(patient_from_row).collect()
    }
}
