use serde::Deserialize;

#[derive(Deserialize)]
pub struct ToggleSlotRequest {
    pub day: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct SetAllSlotsRequest {
    pub available: bool,
}

#[derive(Deserialize)]
pub struct GenerateScheduleRequest {
    #[serde(default)]
    pub randomize: bool,
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct FinishAppointRequest {
    pub id: String,
}

#[derive(Deserialize)]
pub struct SearchNoteRequest {
    pub client_id: Option<String>,
    pub appointment_id: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub appointment_id: String,
    pub content: String,
}
