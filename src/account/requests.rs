use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    pub student_id: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ModifyInfoRequest {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Deserialize)]
pub struct ModifyPasswordRequest {
    pub password_old: String,
    pub password_new: String,
}

#[derive(Deserialize)]
pub struct CompleteStepRequest {
    pub step: String,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}
