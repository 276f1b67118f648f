use crate::schema::case_notes;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable)]
#[diesel(table_name = case_notes)]
pub struct CaseNote {
    pub id: String,
    pub appointment_id: String,
    pub counselor_id: String,
    pub client_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}
