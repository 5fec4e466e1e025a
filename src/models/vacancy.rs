use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PUBLISHED: &str = "published";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vacancy {
    pub id: Uuid,
    pub reference: Option<String>,
    pub status: String,
    pub title: Option<String>,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub employer_name: Option<String>,
    pub provider_name: Option<String>,
    pub apprenticeship_level: Option<String>,
    pub number_of_positions: Option<i32>,
    pub posted_date: Option<String>,
    pub closing_date: Option<String>,
    pub start_date: Option<String>,
    pub hours_per_week: Option<f64>,
    pub expected_duration: Option<String>,
    pub vacancy_url: Option<String>,
    pub wage_type: Option<String>,
    pub wage_amount: Option<Decimal>,
    pub wage_unit: Option<String>,
    pub wage_additional_information: Option<String>,
    pub address_line_1: Option<String>,
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub course_title: Option<String>,
    pub course_level: Option<i32>,
    pub course_route: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values mirrored from one upstream vacancy. `None` means the
/// upstream item did not carry the attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VacancyFields {
    pub reference: Option<String>,
    pub title: Option<String>,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub employer_name: Option<String>,
    pub provider_name: Option<String>,
    pub apprenticeship_level: Option<String>,
    pub number_of_positions: Option<i32>,
    pub posted_date: Option<String>,
    pub closing_date: Option<String>,
    pub start_date: Option<String>,
    pub hours_per_week: Option<f64>,
    pub expected_duration: Option<String>,
    pub vacancy_url: Option<String>,
    pub wage_type: Option<String>,
    pub wage_amount: Option<Decimal>,
    pub wage_unit: Option<String>,
    pub wage_additional_information: Option<String>,
    pub address_line_1: Option<String>,
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub course_title: Option<String>,
    pub course_level: Option<i32>,
    pub course_route: Option<String>,
}

impl Vacancy {
    /// Builds a fresh published record; absent fields stay unset.
    pub fn from_fields(id: Uuid, fields: VacancyFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            reference: fields.reference,
            status: STATUS_PUBLISHED.to_string(),
            title: fields.title,
            full_description: fields.full_description,
            short_description: fields.short_description,
            employer_name: fields.employer_name,
            provider_name: fields.provider_name,
            apprenticeship_level: fields.apprenticeship_level,
            number_of_positions: fields.number_of_positions,
            posted_date: fields.posted_date,
            closing_date: fields.closing_date,
            start_date: fields.start_date,
            hours_per_week: fields.hours_per_week,
            expected_duration: fields.expected_duration,
            vacancy_url: fields.vacancy_url,
            wage_type: fields.wage_type,
            wage_amount: fields.wage_amount,
            wage_unit: fields.wage_unit,
            wage_additional_information: fields.wage_additional_information,
            address_line_1: fields.address_line_1,
            postcode: fields.postcode,
            latitude: fields.latitude,
            longitude: fields.longitude,
            course_title: fields.course_title,
            course_level: fields.course_level,
            course_route: fields.course_route,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every field the changeset carries and leaves the rest
    /// untouched. Mirrors the `COALESCE` update used by the postgres store.
    pub fn apply(&mut self, fields: VacancyFields, now: DateTime<Utc>) {
        fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        merge(&mut self.reference, fields.reference);
        merge(&mut self.title, fields.title);
        merge(&mut self.full_description, fields.full_description);
        merge(&mut self.short_description, fields.short_description);
        merge(&mut self.employer_name, fields.employer_name);
        merge(&mut self.provider_name, fields.provider_name);
        merge(&mut self.apprenticeship_level, fields.apprenticeship_level);
        merge(&mut self.number_of_positions, fields.number_of_positions);
        merge(&mut self.posted_date, fields.posted_date);
        merge(&mut self.closing_date, fields.closing_date);
        merge(&mut self.start_date, fields.start_date);
        merge(&mut self.hours_per_week, fields.hours_per_week);
        merge(&mut self.expected_duration, fields.expected_duration);
        merge(&mut self.vacancy_url, fields.vacancy_url);
        merge(&mut self.wage_type, fields.wage_type);
        merge(&mut self.wage_amount, fields.wage_amount);
        merge(&mut self.wage_unit, fields.wage_unit);
        merge(
            &mut self.wage_additional_information,
            fields.wage_additional_information,
        );
        merge(&mut self.address_line_1, fields.address_line_1);
        merge(&mut self.postcode, fields.postcode);
        merge(&mut self.latitude, fields.latitude);
        merge(&mut self.longitude, fields.longitude);
        merge(&mut self.course_title, fields.course_title);
        merge(&mut self.course_level, fields.course_level);
        merge(&mut self.course_route, fields.course_route);
        self.status = STATUS_PUBLISHED.to_string();
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_fields_missing_from_changeset() {
        let now = Utc::now();
        let mut vacancy = Vacancy::from_fields(
            Uuid::new_v4(),
            VacancyFields {
                reference: Some("VAC1".into()),
                title: Some("Plumber".into()),
                employer_name: Some("Acme".into()),
                ..Default::default()
            },
            now,
        );

        vacancy.apply(
            VacancyFields {
                reference: Some("VAC1".into()),
                title: Some("Senior Plumber".into()),
                postcode: Some("LS1 4AP".into()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(vacancy.title.as_deref(), Some("Senior Plumber"));
        assert_eq!(vacancy.employer_name.as_deref(), Some("Acme"));
        assert_eq!(vacancy.postcode.as_deref(), Some("LS1 4AP"));
        assert_eq!(vacancy.status, STATUS_PUBLISHED);
    }
}
