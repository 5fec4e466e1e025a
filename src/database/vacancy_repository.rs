use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::VacancyRepository;
use crate::error::{Error, Result};
use crate::models::vacancy::{Vacancy, VacancyFields, STATUS_PUBLISHED};

const VACANCY_COLUMNS: &str = "id, reference, status, title, full_description, short_description, \
     employer_name, provider_name, apprenticeship_level, number_of_positions, posted_date, \
     closing_date, start_date, hours_per_week, expected_duration, vacancy_url, wage_type, \
     wage_amount, wage_unit, wage_additional_information, address_line_1, postcode, latitude, \
     longitude, course_title, course_level, course_route, created_at, updated_at";

#[derive(Clone)]
pub struct PgVacancyRepository {
    pool: PgPool,
}

impl PgVacancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VacancyRepository for PgVacancyRepository {
    async fn list_references(&self) -> Result<Vec<(String, Uuid)>> {
        let rows = sqlx::query(
            r#"
            SELECT reference, id
            FROM vacancies
            WHERE reference IS NOT NULL AND reference <> ''
            ORDER BY reference
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<(String, Uuid)> {
                Ok((row.try_get("reference")?, row.try_get("id")?))
            })
            .collect()
    }

    async fn create(&self, fields: VacancyFields) -> Result<Vacancy> {
        let query = format!(
            r#"
            INSERT INTO vacancies (
                reference, status, title, full_description, short_description,
                employer_name, provider_name, apprenticeship_level, number_of_positions, posted_date,
                closing_date, start_date, hours_per_week, expected_duration, vacancy_url,
                wage_type, wage_amount, wage_unit, wage_additional_information, address_line_1,
                postcode, latitude, longitude, course_title, course_level,
                course_route
            ) VALUES (
                $1,$2,$3,$4,$5,
                $6,$7,$8,$9,$10,
                $11,$12,$13,$14,$15,
                $16,$17,$18,$19,$20,
                $21,$22,$23,$24,$25,
                $26
            )
            RETURNING {}
            "#,
            VACANCY_COLUMNS
        );

        let vacancy = sqlx::query_as::<_, Vacancy>(&query)
            .bind(fields.reference)
            .bind(STATUS_PUBLISHED)
            .bind(fields.title)
            .bind(fields.full_description)
            .bind(fields.short_description)
            .bind(fields.employer_name)
            .bind(fields.provider_name)
            .bind(fields.apprenticeship_level)
            .bind(fields.number_of_positions)
            .bind(fields.posted_date)
            .bind(fields.closing_date)
            .bind(fields.start_date)
            .bind(fields.hours_per_week)
            .bind(fields.expected_duration)
            .bind(fields.vacancy_url)
            .bind(fields.wage_type)
            .bind(fields.wage_amount)
            .bind(fields.wage_unit)
            .bind(fields.wage_additional_information)
            .bind(fields.address_line_1)
            .bind(fields.postcode)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.course_title)
            .bind(fields.course_level)
            .bind(fields.course_route)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Persistence(format!("insert failed: {}", e)))?;

        Ok(vacancy)
    }

    async fn update(&self, id: Uuid, fields: VacancyFields) -> Result<Vacancy> {
        let query = format!(
            r#"
            UPDATE vacancies
            SET
                reference = COALESCE($2, reference),
                status = $3,
                title = COALESCE($4, title),
                full_description = COALESCE($5, full_description),
                short_description = COALESCE($6, short_description),
                employer_name = COALESCE($7, employer_name),
                provider_name = COALESCE($8, provider_name),
                apprenticeship_level = COALESCE($9, apprenticeship_level),
                number_of_positions = COALESCE($10, number_of_positions),
                posted_date = COALESCE($11, posted_date),
                closing_date = COALESCE($12, closing_date),
                start_date = COALESCE($13, start_date),
                hours_per_week = COALESCE($14, hours_per_week),
                expected_duration = COALESCE($15, expected_duration),
                vacancy_url = COALESCE($16, vacancy_url),
                wage_type = COALESCE($17, wage_type),
                wage_amount = COALESCE($18, wage_amount),
                wage_unit = COALESCE($19, wage_unit),
                wage_additional_information = COALESCE($20, wage_additional_information),
                address_line_1 = COALESCE($21, address_line_1),
                postcode = COALESCE($22, postcode),
                latitude = COALESCE($23, latitude),
                longitude = COALESCE($24, longitude),
                course_title = COALESCE($25, course_title),
                course_level = COALESCE($26, course_level),
                course_route = COALESCE($27, course_route),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VACANCY_COLUMNS
        );

        let vacancy = sqlx::query_as::<_, Vacancy>(&query)
            .bind(id)
            .bind(fields.reference)
            .bind(STATUS_PUBLISHED)
            .bind(fields.title)
            .bind(fields.full_description)
            .bind(fields.short_description)
            .bind(fields.employer_name)
            .bind(fields.provider_name)
            .bind(fields.apprenticeship_level)
            .bind(fields.number_of_positions)
            .bind(fields.posted_date)
            .bind(fields.closing_date)
            .bind(fields.start_date)
            .bind(fields.hours_per_week)
            .bind(fields.expected_duration)
            .bind(fields.vacancy_url)
            .bind(fields.wage_type)
            .bind(fields.wage_amount)
            .bind(fields.wage_unit)
            .bind(fields.wage_additional_information)
            .bind(fields.address_line_1)
            .bind(fields.postcode)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.course_title)
            .bind(fields.course_level)
            .bind(fields.course_route)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Persistence(format!("update failed: {}", e)))?;

        vacancy.ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Persistence(format!("delete failed: {}", e)))?;

        Ok(res.rows_affected() > 0)
    }

    async fn count_by_status(&self, status: &str) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vacancies WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<Vacancy>> {
        let limit = if limit <= 0 { 10 } else { limit.min(100) };
        // posted_date is stored as the upstream ISO-8601 string, so text order
        // is chronological order.
        let query = format!(
            r#"
            SELECT {}
            FROM vacancies
            WHERE status = $1
            ORDER BY posted_date DESC NULLS LAST, created_at DESC
            LIMIT $2
            "#,
            VACANCY_COLUMNS
        );

        let items = sqlx::query_as::<_, Vacancy>(&query)
            .bind(STATUS_PUBLISHED)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}
