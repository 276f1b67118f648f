use serde::Serialize;

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
    pub role: String,
}

#[derive(Default, Serialize)]
pub struct ViewInfoResponse {
    pub success: bool,
    pub err: String,
    pub id: String,
    pub name: String,
    pub role: String,
    pub student_id: String,
    pub telephone: String,
    pub onboarding: String,
}

#[derive(Default, Serialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub err: String,
    pub step: String,
}

crate::impl_err_response! {
    LoginResponse,
    ViewInfoResponse,
    OnboardingResponse,
}
