use diesel::dsl;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use serde::{Deserialize, Serialize};

use crate::schema::ccas_city;

define_sql_function!(fn trim(x: Nullable<Text>) -> Nullable<Text>);

pub type Pending = dsl::Or<
    dsl::IsNull<ccas_city::job_status>,
    dsl::Eq<trim<ccas_city::job_status>, &'static str>,
>;

/// Rows whose `job_status` is NULL or blank still need research.
pub fn pending() -> Pending {
    ccas_city::job_status
        .is_null()
        .or(trim(ccas_city::job_status).eq(""))
}

/// Column names of `ccas_city`, in table order.
pub const CITY_COLUMNS: [&str; 20] = [
    "id",
    "country",
    "city",
    "education_level",
    "job_status",
    "ccas_status",
    "ccas_status_source",
    "participating_institutions",
    "participating_institutions_source",
    "preference_list_length",
    "preference_list_length_source",
    "priority_criteria",
    "priority_criteria_source",
    "assignment_mechanism",
    "assignment_mechanism_source",
    "adoption_year",
    "adoption_year_source",
    "reform_year",
    "reform_year_source",
    "notes",
];

/// Processing state of a row, as stored in `job_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchStatus {
    /// NULL or blank: never processed, or left for another run.
    Pending,
    /// Research fields were written.
    Done,
    /// The background job failed, timed out, or could not be polled.
    Failed,
    /// A value written by someone else. Treated as processed.
    Other(String),
}

impl ResearchStatus {
    pub const DONE: &'static str = "done";
    pub const FAILED: &'static str = "failed";

    pub fn from_column(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Pending,
            Some(Self::DONE) => Self::Done,
            Some(Self::FAILED) => Self::Failed,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

// ccas_city table model (database representation). Field order is the table's column
// order, which is also the CSV export layout.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::ccas_city)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CityRecord {
    pub id: i32,
    pub country: String,
    pub city: String,
    pub education_level: String,
    pub job_status: Option<String>,
    pub ccas_status: Option<String>,
    pub ccas_status_source: Option<String>,
    pub participating_institutions: Option<String>,
    pub participating_institutions_source: Option<String>,
    pub preference_list_length: Option<String>,
    pub preference_list_length_source: Option<String>,
    pub priority_criteria: Option<String>,
    pub priority_criteria_source: Option<String>,
    pub assignment_mechanism: Option<String>,
    pub assignment_mechanism_source: Option<String>,
    pub adoption_year: Option<String>,
    pub adoption_year_source: Option<String>,
    pub reform_year: Option<String>,
    pub reform_year_source: Option<String>,
    pub notes: Option<String>,
}

impl CityRecord {
    pub fn status(&self) -> ResearchStatus {
        ResearchStatus::from_column(self.job_status.as_deref())
    }

    /// Human readable target, used in log lines: `France, Paris` or `France, Paris (Secondary)`.
    pub fn label(&self) -> String {
        match self.education_level.trim() {
            "" => format!("{}, {}", self.country, self.city),
            level => format!("{}, {} ({})", self.country, self.city, level),
        }
    }
}

/// One line of the city list, inserted as a pending row.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::ccas_city)]
pub struct NewCity {
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub education_level: String,
}

impl NewCity {
    pub fn new(country: &str, city: &str, education_level: &str) -> Self {
        Self {
            country: country.trim().to_string(),
            city: city.trim().to_string(),
            education_level: education_level.trim().to_string(),
        }
    }
}

/// Every research column plus `job_status = 'done'`, written in a single UPDATE.
#[derive(Debug, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = crate::schema::ccas_city)]
pub struct CityResearchUpdate {
    pub job_status: String,
    pub ccas_status: String,
    pub ccas_status_source: String,
    pub participating_institutions: String,
    pub participating_institutions_source: String,
    pub preference_list_length: String,
    pub preference_list_length_source: String,
    pub priority_criteria: String,
    pub priority_criteria_source: String,
    pub assignment_mechanism: String,
    pub assignment_mechanism_source: String,
    pub adoption_year: String,
    pub adoption_year_source: String,
    pub reform_year: String,
    pub reform_year_source: String,
    pub notes: String,
}
