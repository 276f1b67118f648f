use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchCounselorRequest {
    pub name: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewSlotsRequest {
    pub counselor_id: String,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    #[serde(default = "search_appoint_request_status_default")]
    pub status: String,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AppointRequest {
    pub counselor_id: String,
    pub day: String,
    pub time: String,
    pub student_id: String,
    pub telephone: String,
    pub notes: Option<String>,
    /// Access token for the client's own calendar. When present the session
    /// is also added to that calendar.
    pub calendar_access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelAppointRequest {
    pub id: String,
}

fn search_appoint_request_status_default() -> String {
    "all".to_string()
}
