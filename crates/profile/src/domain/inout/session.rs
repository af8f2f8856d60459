use uuid::Uuid;

// ╔════════════════════════════╗
// ║          Logout            ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct LogoutInput {
    pub user_id: Uuid,
    pub jti: String,
    /// Expiry of the token being revoked, seconds since the epoch.
    pub exp: usize,
}

#[derive(Debug)]
pub struct LogoutOutput {
    pub redirect_to: String,
}

// ╔════════════════════════════╗
// ║       Delete Account       ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct DeleteAccountInput {
    pub user_id: Uuid,
    pub jti: String,
    pub exp: usize,
}

#[derive(Debug)]
pub struct DeleteAccountOutput {
    pub profile_removed: bool,
    pub redirect_to: String,
}
