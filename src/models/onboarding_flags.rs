use crate::schema::onboarding_flags;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable)]
#[diesel(table_name = onboarding_flags)]
pub struct OnboardingFlagData {
    pub user_id: String,
    pub flag: String,
    pub value: bool,
    pub updated_at: NaiveDateTime,
}
