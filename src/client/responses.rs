use serde::Serialize;

#[derive(Default, Serialize)]
pub struct SearchCounselorItem {
    pub id: String,
    pub name: String,
}

#[derive(Default, Serialize)]
pub struct SearchCounselorResponse {
    pub success: bool,
    pub err: String,
    pub counselors: Vec<SearchCounselorItem>,
}

#[derive(Default, Serialize)]
pub struct SlotItem {
    pub day: String,
    pub time: String,
    pub available: bool,
    pub booked: bool,
}

#[derive(Default, Serialize)]
pub struct ViewSlotsResponse {
    pub success: bool,
    pub err: String,
    pub counselor_id: String,
    pub days: Vec<String>,
    pub times: Vec<String>,
    pub slots: Vec<SlotItem>,
}

#[derive(Default, Serialize)]
pub struct SearchAppointItem {
    pub id: String,
    pub date: String,
    pub day: String,
    pub time: String,
    pub counselor_id: String,
    pub counselor_name: String,
    pub client_id: String,
    pub client_name: String,
    pub status: String,
    pub notes: Option<String>,
    pub google_event_id: Option<String>,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<SearchAppointItem>,
}

#[derive(Default, Serialize)]
pub struct AppointResponse {
    pub success: bool,
    pub err: String,
    pub id: String,
    pub date: String,
    pub calendar_synced: bool,
}

crate::impl_err_response! {
    SearchCounselorResponse,
    ViewSlotsResponse,
    SearchAppointResponse,
    AppointResponse,
}
