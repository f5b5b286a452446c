//! PostgreSQL-backed store over the program's existing schema.
//!
//! Tables read: `durum_turleri` (status types), `ogrenci` (students),
//! `program_turleri` (program types), `ogrenci_mevcut_asama` (current stage
//! per student) and `akademik_personel` (advisors). Nothing is written.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{AdvisorRecord, ProgramType, StageOccupancy, StatusType, StudentRecord};
use crate::store::{OccupancyQuery, StageStore, StudentQuery};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(settings: &Settings) -> Result<Self> {
        let url = settings
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Config("database_url is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(url)
            .await?;
        info!(max_connections = settings.max_connections, "connected to Postgres");

        Ok(PgStore::new(pool))
    }
}

#[async_trait]
impl StageStore for PgStore {
    async fn status_types(&self) -> Result<Vec<StatusType>> {
        let rows = sqlx::query("SELECT durum_id, durum_kodu FROM durum_turleri ORDER BY durum_id")
            .fetch_all(&self.pool)
            .await?;

        let mut types = Vec::with_capacity(rows.len());
        for row in rows {
            types.push(StatusType {
                status_id: row.try_get("durum_id")?,
                status_code: row.try_get("durum_kodu")?,
            });
        }
        Ok(types)
    }

    async fn students(&self, query: &StudentQuery) -> Result<Vec<StudentRecord>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT o.ogrenci_id, o.ad, o.soyad, o.ogrenci_no, o.program_turu_id, \
             p.program_adi, p.program_kodu, o.danisman_id, o.kayit_tarihi, \
             o.mezuniyet_tarihi, o.durum_id \
             FROM ogrenci o \
             LEFT JOIN program_turleri p ON p.program_turu_id = o.program_turu_id \
             WHERE TRUE",
        );

        if let Some(ids) = &query.ids {
            builder.push(" AND o.ogrenci_id = ANY(").push_bind(ids.clone()).push(")");
        }
        if let Some(status_id) = query.status_id {
            builder.push(" AND o.durum_id = ").push_bind(status_id);
        }
        if let Some(program_id) = query.program_id {
            builder.push(" AND o.program_turu_id = ").push_bind(program_id);
        }
        if let Some(advisor_id) = query.advisor_id {
            builder.push(" AND o.danisman_id = ").push_bind(advisor_id);
        }
        builder.push(" ORDER BY o.ogrenci_id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "students fetched");
        rows.iter().map(student_from_row).collect()
    }

    async fn occupancies(&self, query: &OccupancyQuery) -> Result<Vec<StageOccupancy>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT ogrenci_id, asama_kodu, asama_adi, \
             COALESCE(gecikme_yariyil, 0)::float8 AS gecikme_yariyil \
             FROM ogrenci_mevcut_asama \
             WHERE TRUE",
        );

        if query.delayed_only {
            builder.push(" AND gecikme_yariyil > 0");
        }
        if let Some(code) = &query.stage_code {
            builder.push(" AND asama_kodu = ").push_bind(code.clone());
        }
        builder.push(" ORDER BY ogrenci_id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "stage occupancy fetched");

        let mut occupancies = Vec::with_capacity(rows.len());
        for row in rows {
            occupancies.push(StageOccupancy {
                student_id: row.try_get("ogrenci_id")?,
                stage_code: row.try_get("asama_kodu")?,
                stage_name: row
                    .try_get::<Option<String>, _>("asama_adi")?
                    .unwrap_or_default(),
                delay_semesters: row.try_get("gecikme_yariyil")?,
            });
        }
        Ok(occupancies)
    }

    async fn advisors(&self, ids: &[Uuid]) -> Result<Vec<AdvisorRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT personel_id, ad, soyad, unvan
            FROM akademik_personel
            WHERE personel_id = ANY($1)
            ORDER BY personel_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut advisors = Vec::with_capacity(rows.len());
        for row in rows {
            advisors.push(AdvisorRecord {
                advisor_id: row.try_get("personel_id")?,
                first_name: row.try_get("ad")?,
                last_name: row.try_get("soyad")?,
                title: row.try_get("unvan")?,
            });
        }
        Ok(advisors)
    }
}

fn student_from_row(row: &PgRow) -> Result<StudentRecord> {
    let program_type_id: Option<Uuid> = row.try_get("program_turu_id")?;
    let program_name: Option<String> = row.try_get("program_adi")?;
    let program_code: Option<String> = row.try_get("program_kodu")?;

    // A LEFT JOIN miss yields NULL name and code.
    let program = match (program_type_id, program_name, program_code) {
        (Some(id), name, code) if name.is_some() || code.is_some() => Some(ProgramType {
            program_type_id: id,
            program_name: name.unwrap_or_default(),
            program_code: code.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(StudentRecord {
        student_id: row.try_get("ogrenci_id")?,
        first_name: row.try_get("ad")?,
        last_name: row.try_get("soyad")?,
        student_number: row.try_get("ogrenci_no")?,
        program_type_id,
        program,
        advisor_id: row.try_get("danisman_id")?,
        enrollment_date: row.try_get("kayit_tarihi")?,
        graduation_date: row.try_get("mezuniyet_tarihi")?,
        status_id: row.try_get("durum_id")?,
    })
}
