use crate::{schedule::TimeBlock, schema::time_blocks};

#[derive(Clone, Queryable, Insertable)]
#[diesel(table_name = time_blocks)]
pub struct TimeBlockData {
    pub counselor_id: String,
    pub day: String,
    pub time: String,
    pub available: bool,
    pub booked_by: Option<String>,
}

impl TimeBlockData {
    pub fn from_block(counselor_id: &str, block: &TimeBlock) -> Self {
        Self {
            counselor_id: counselor_id.to_string(),
            day: block.day.clone(),
            time: block.time.clone(),
            available: block.available,
            booked_by: block.booked_by.clone(),
        }
    }
}

impl From<TimeBlockData> for TimeBlock {
    fn from(data: TimeBlockData) -> Self {
        TimeBlock {
            day: data.day,
            time: data.time,
            available: data.available,
            booked_by: data.booked_by,
        }
    }
}
