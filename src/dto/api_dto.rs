//! Wire types for the Display Advert API `GET /vacancy` response.
//!
//! Every member is optional: the upstream omits attributes freely and the
//! sync engine maps whatever is present. Entries are decoded one at a time
//! so a malformed entry costs only itself.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::models::vacancy::VacancyFields;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    String(String),
    Other(IgnoredAny),
}

// The lenient readers below never fail: a value of the wrong shape leaves
// the field unset and the rest of the item is still mapped.

fn deserialize_opt_string_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::String(s)) => Some(s),
            Some(NumberOrString::Int(i)) => Some(i.to_string()),
            Some(NumberOrString::Float(f)) => Some(f.to_string()),
            Some(NumberOrString::Other(_)) | None => None,
        },
    )
}

fn deserialize_opt_i32_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Int(i)) => i32::try_from(i).ok(),
            Some(NumberOrString::Float(f)) => whole_f64_to_i32(f),
            Some(NumberOrString::String(s)) => s.trim().parse().ok(),
            Some(NumberOrString::Other(_)) | None => None,
        },
    )
}

fn whole_f64_to_i32(f: f64) -> Option<i32> {
    let in_range = f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX);
    (f.fract() == 0.0 && in_range).then(|| f as i32)
}

fn deserialize_opt_f64_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Int(i)) => Some(i as f64),
            Some(NumberOrString::Float(f)) => Some(f),
            Some(NumberOrString::String(s)) => s.trim().parse().ok(),
            Some(NumberOrString::Other(_)) | None => None,
        },
    )
}

fn deserialize_opt_decimal_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Int(i)) => Some(Decimal::from(i)),
            Some(NumberOrString::Float(f)) => Decimal::from_f64(f),
            Some(NumberOrString::String(s)) => s.trim().parse().ok(),
            Some(NumberOrString::Other(_)) | None => None,
        },
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VacancyPage {
    /// Raw listing entries, decoded one by one with [`ApiVacancy::from_value`].
    /// `None` when the body is JSON but not a vacancy listing.
    #[serde(default)]
    pub vacancies: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiVacancy {
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub vacancy_reference: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub full_description: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub employer_name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub provider_name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub apprenticeship_level: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_i32_flexible")]
    pub number_of_positions: Option<i32>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub posted_date: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub closing_date: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_f64_flexible")]
    pub hours_per_week: Option<f64>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub expected_duration: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub vacancy_url: Option<String>,
    pub wage: Option<ApiWage>,
    pub address: Option<ApiAddress>,
    pub course: Option<ApiCourse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiWage {
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub wage_type: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_decimal_flexible")]
    pub wage_amount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub wage_unit: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub wage_additional_information: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiAddress {
    #[serde(rename = "addressLine1", deserialize_with = "deserialize_opt_string_flexible")]
    pub address_line_1: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub postcode: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_f64_flexible")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "deserialize_opt_f64_flexible")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCourse {
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_i32_flexible")]
    pub level: Option<i32>,
    #[serde(deserialize_with = "deserialize_opt_string_flexible")]
    pub route: Option<String>,
}

impl ApiVacancy {
    /// Decodes one listing entry. Fails only when the entry is not an object
    /// or a nested wage/address/course member is not an object.
    pub fn from_value(value: JsonValue) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The reconciliation key, ignoring blank values.
    pub fn reference(&self) -> Option<&str> {
        self.vacancy_reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

impl From<ApiVacancy> for VacancyFields {
    fn from(value: ApiVacancy) -> Self {
        let reference = value.reference().map(str::to_string);
        let wage = value.wage.unwrap_or_default();
        let address = value.address.unwrap_or_default();
        let course = value.course.unwrap_or_default();

        Self {
            reference,
            title: value.title,
            full_description: value.full_description,
            short_description: value.description,
            employer_name: value.employer_name,
            provider_name: value.provider_name,
            apprenticeship_level: value.apprenticeship_level,
            number_of_positions: value.number_of_positions,
            posted_date: value.posted_date,
            closing_date: value.closing_date,
            start_date: value.start_date,
            hours_per_week: value.hours_per_week,
            expected_duration: value.expected_duration,
            vacancy_url: value.vacancy_url,
            wage_type: wage.wage_type,
            wage_amount: wage.wage_amount,
            wage_unit: wage.wage_unit,
            wage_additional_information: wage.wage_additional_information,
            address_line_1: address.address_line_1,
            postcode: address.postcode,
            latitude: address.latitude,
            longitude: address.longitude,
            course_title: course.title,
            course_level: course.level,
            course_route: course.route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first(body: &str) -> ApiVacancy {
        let page: VacancyPage = serde_json::from_str(body).unwrap();
        ApiVacancy::from_value(page.vacancies.unwrap().remove(0)).unwrap()
    }

    #[test]
    fn decodes_full_vacancy() {
        let body = r#"{
            "vacancies": [{
                "vacancyReference": "VAC1000012345",
                "title": "Apprentice Electrician",
                "fullDescription": "<p>Full</p>",
                "description": "Short",
                "employerName": "Sparks Ltd",
                "providerName": "Northern College",
                "apprenticeshipLevel": "Advanced",
                "numberOfPositions": 2,
                "postedDate": "2025-01-10T00:00:00Z",
                "closingDate": "2025-02-28T00:00:00Z",
                "startDate": "2025-04-01T00:00:00Z",
                "hoursPerWeek": 37.5,
                "expectedDuration": "2 years",
                "vacancyUrl": "https://www.findapprenticeship.service.gov.uk/apprenticeship/VAC1000012345",
                "wage": {"wageType": "NationalMinimumWage", "wageAmount": 15704.0, "wageUnit": "Annually", "wageAdditionalInformation": "Reviewed yearly"},
                "address": {"addressLine1": "1 High Street", "postcode": "LS1 4AP", "latitude": 53.79, "longitude": -1.54},
                "course": {"title": "Electrotechnical", "level": 3, "route": "Construction"}
            }],
            "total": 1
        }"#;

        let fields = VacancyFields::from(first(body));

        assert_eq!(fields.reference.as_deref(), Some("VAC1000012345"));
        assert_eq!(fields.short_description.as_deref(), Some("Short"));
        assert_eq!(fields.number_of_positions, Some(2));
        assert_eq!(fields.hours_per_week, Some(37.5));
        assert_eq!(fields.wage_amount, Decimal::from_f64(15704.0));
        assert_eq!(fields.address_line_1.as_deref(), Some("1 High Street"));
        assert_eq!(fields.longitude, Some(-1.54));
        assert_eq!(fields.course_level, Some(3));
        assert_eq!(fields.course_route.as_deref(), Some("Construction"));
    }

    #[test]
    fn numeric_fields_accept_strings_and_numeric_reference() {
        let vacancy = first(
            r#"{"vacancies":[{"vacancyReference": 1000012345, "numberOfPositions": "3", "hoursPerWeek": "30", "course": {"level": "2"}, "address": null}]}"#,
        );

        assert_eq!(vacancy.reference(), Some("1000012345"));
        assert_eq!(vacancy.number_of_positions, Some(3));
        assert_eq!(vacancy.hours_per_week, Some(30.0));
        assert_eq!(vacancy.course.as_ref().and_then(|c| c.level), Some(2));
        assert!(vacancy.address.is_none());
    }

    #[test]
    fn unreadable_attributes_are_left_unset() {
        let vacancy = ApiVacancy::from_value(json!({
            "vacancyReference": "VAC1",
            "title": "Kept",
            "numberOfPositions": "two",
            "hoursPerWeek": "",
            "startDate": ["2025-04-01"],
            "wage": {"wageAmount": "", "wageUnit": "Weekly"},
            "course": {"level": 4294967296.0}
        }))
        .unwrap();

        assert_eq!(vacancy.reference(), Some("VAC1"));
        assert_eq!(vacancy.title.as_deref(), Some("Kept"));
        assert_eq!(vacancy.number_of_positions, None);
        assert_eq!(vacancy.hours_per_week, None);
        assert_eq!(vacancy.start_date, None);
        let wage = vacancy.wage.unwrap();
        assert_eq!(wage.wage_amount, None);
        assert_eq!(wage.wage_unit.as_deref(), Some("Weekly"));
        assert_eq!(vacancy.course.and_then(|c| c.level), None);
    }

    #[test]
    fn wage_amount_accepts_numeric_strings() {
        let vacancy = ApiVacancy::from_value(json!({ "wage": {"wageAmount": " 412.50 "} })).unwrap();
        assert_eq!(
            vacancy.wage.and_then(|w| w.wage_amount),
            Some(Decimal::new(41250, 2))
        );
    }

    #[test]
    fn non_object_entries_fail_on_their_own() {
        let page: VacancyPage =
            serde_json::from_str(r#"{"vacancies":[{"vacancyReference":"GOOD"}, null, 7]}"#).unwrap();
        let decoded: Vec<_> = page
            .vacancies
            .unwrap()
            .into_iter()
            .map(ApiVacancy::from_value)
            .collect();

        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].is_ok());
        assert!(decoded[1].is_err());
        assert!(decoded[2].is_err());
    }

    #[test]
    fn whole_floats_outside_i32_are_rejected() {
        assert_eq!(whole_f64_to_i32(12.0), Some(12));
        assert_eq!(whole_f64_to_i32(12.5), None);
        assert_eq!(whole_f64_to_i32(3.0e10), None);
        assert_eq!(whole_f64_to_i32(-3.0e10), None);
    }

    #[test]
    fn blank_reference_counts_as_missing() {
        let vacancy = ApiVacancy {
            vacancy_reference: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(vacancy.reference(), None);
    }

    #[test]
    fn object_without_vacancies_is_distinguishable_from_empty_list() {
        let missing: VacancyPage = serde_json::from_str(r#"{"message":"nope"}"#).unwrap();
        let empty: VacancyPage = serde_json::from_str(r#"{"vacancies":[]}"#).unwrap();
        assert!(missing.vacancies.is_none());
        assert_eq!(empty.vacancies.map(|v| v.len()), Some(0));
    }
}
