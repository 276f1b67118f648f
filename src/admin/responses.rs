use serde::Serialize;

use crate::report::StatsSummary;

#[derive(Default, Serialize)]
pub struct ViewStatsResponse {
    pub success: bool,
    pub err: String,
    pub stats: StatsSummary,
}

#[derive(Default, Serialize)]
pub struct IssueCaseCodeResponse {
    pub success: bool,
    pub err: String,
    pub codes: Vec<String>,
}

#[derive(Default, Serialize)]
pub struct SearchUserItem {
    pub id: String,
    pub name: String,
    pub role: String,
    pub student_id: String,
    pub telephone: String,
    pub is_banned: bool,
}

#[derive(Default, Serialize)]
pub struct SearchUserResponse {
    pub success: bool,
    pub err: String,
    pub users: Vec<SearchUserItem>,
}

crate::impl_err_response! {
    ViewStatsResponse,
    IssueCaseCodeResponse,
    SearchUserResponse,
}
