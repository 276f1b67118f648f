use serde::Serialize;

use crate::{client::responses::SearchAppointItem, schedule::TimeBlock};

#[derive(Default, Serialize)]
pub struct ViewScheduleResponse {
    pub success: bool,
    pub err: String,
    pub days: Vec<String>,
    pub times: Vec<String>,
    pub blocks: Vec<TimeBlock>,
    pub available: usize,
    pub booked: usize,
}

#[derive(Default, Serialize)]
pub struct UpdateSlotsResponse {
    pub success: bool,
    pub err: String,
    pub changed: usize,
}

#[derive(Default, Serialize)]
pub struct TodayAppointResponse {
    pub success: bool,
    pub err: String,
    pub date: String,
    pub appointments: Vec<SearchAppointItem>,
}

#[derive(Default, Serialize)]
pub struct WaitingClientItem {
    pub appointment_id: String,
    pub client_id: String,
    pub client_name: String,
    pub student_id: String,
    pub telephone: String,
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}

#[derive(Default, Serialize)]
pub struct WaitingClientResponse {
    pub success: bool,
    pub err: String,
    pub clients: Vec<WaitingClientItem>,
}

#[derive(Default, Serialize)]
pub struct SearchNoteItem {
    pub id: String,
    pub appointment_id: String,
    pub client_id: String,
    pub content: String,
    pub time: String,
}

#[derive(Default, Serialize)]
pub struct SearchNoteResponse {
    pub success: bool,
    pub err: String,
    pub notes: Vec<SearchNoteItem>,
}

#[derive(Default, Serialize)]
pub struct AddNoteResponse {
    pub success: bool,
    pub err: String,
    pub id: String,
}

crate::impl_err_response! {
    ViewScheduleResponse,
    UpdateSlotsResponse,
    TodayAppointResponse,
    WaitingClientResponse,
    SearchNoteResponse,
    AddNoteResponse,
}
