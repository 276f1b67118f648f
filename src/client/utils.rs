use std::collections::HashMap;

use crate::{models::appointments::Appointment, utils::format_date_str};

use super::responses::SearchAppointItem;

pub fn appoint_item(appo: Appointment, names: &HashMap<String, String>) -> SearchAppointItem {
    let name_of = |id: &str| names.get(id).cloned().unwrap_or_default();
    SearchAppointItem {
        date: format_date_str(&appo.date),
        counselor_name: name_of(&appo.counselor_id),
        client_name: name_of(&appo.client_id),
        id: appo.id,
        day: appo.day,
        time: appo.time,
        counselor_id: appo.counselor_id,
        client_id: appo.client_id,
        status: appo.status,
        notes: appo.notes,
        google_event_id: appo.google_event_id,
    }
}
