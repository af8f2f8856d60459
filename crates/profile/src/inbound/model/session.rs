use serde::Serialize;

#[derive(Serialize)]
pub struct LogoutResponse {
    pub redirect_to: String,
}

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub profile_removed: bool,
    pub redirect_to: String,
}
