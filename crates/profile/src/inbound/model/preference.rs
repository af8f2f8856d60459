use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Serialize)]
pub struct ThemeResponse {
    /// The stored preference: `light`, `dark` or `system`.
    pub theme: String,
    /// What the page should render with right now.
    pub active: String,
}
