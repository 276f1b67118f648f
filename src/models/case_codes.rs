use crate::schema::case_codes;
use chrono::NaiveDateTime;

/// A freshly issued code. `used_by` and `used_at` are filled in when a client
/// claims it.
#[derive(Insertable)]
#[diesel(table_name = case_codes)]
pub struct NewCaseCode {
    pub code: String,
    pub issued_by: String,
    pub created_at: NaiveDateTime,
}
