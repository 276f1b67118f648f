use serde::Deserialize;

#[derive(Deserialize)]
pub struct ViewReportRequest {
    pub title: Option<String>,
    #[serde(default = "default_auto_print")]
    pub auto_print: bool,
}

fn default_auto_print() -> bool {
    true
}

#[derive(Deserialize)]
pub struct IssueCaseCodeRequest {
    pub count: Option<u32>,
}

#[derive(Deserialize)]
pub struct SearchUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub banned: Option<bool>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddUserRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub student_id: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Deserialize)]
pub struct ModifyRoleRequest {
    pub user_id: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct BanUserRequest {
    pub user_id: String,
    pub banned: bool,
}
