pub mod appointments;
pub mod case_codes;
pub mod case_notes;
pub mod onboarding_flags;
pub mod time_blocks;
pub mod users;

pub mod user_logins;
