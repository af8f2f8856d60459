use app_core::jwt::Claims;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Starting balance granted to every new profile, and the 100% mark of the
/// usage bar.
pub const DEFAULT_TOKENS: i64 = 1_000_000;
pub const DEFAULT_FULL_NAME: &str = "Guest User";
pub const DEFAULT_PLAN: &str = "free";
pub const DEFAULT_PROVIDER: &str = "email";

const PLACEHOLDER_AVATAR_BASE: &str = "https://ui-avatars.com/api/";
const PLACEHOLDER_NAME: &str = "User";
const PLACEHOLDER_BACKGROUND: &str = "161B22";
const PLACEHOLDER_COLOR: &str = "58A6FF";

/// Generated avatar keyed by the display name; used whenever a profile has
/// no uploaded picture.
pub fn placeholder_avatar_url(full_name: Option<&str>) -> String {
    let name = full_name.filter(|n| !n.is_empty()).unwrap_or(PLACEHOLDER_NAME);

    format!(
        "{PLACEHOLDER_AVATAR_BASE}?name={}&background={PLACEHOLDER_BACKGROUND}&color={PLACEHOLDER_COLOR}",
        urlencoding::encode(name)
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub tokens: i64,
    pub subscription_plan: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// The balance shown to the user: `credits` wins over the legacy
    /// `tokens` column, and an empty row gets the starting balance.
    pub fn effective_tokens(credits: Option<i64>, tokens: Option<i64>) -> i64 {
        credits.or(tokens).unwrap_or(DEFAULT_TOKENS)
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(DEFAULT_FULL_NAME)
    }

    pub fn resolved_avatar_url(&self) -> String {
        match self.avatar_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => placeholder_avatar_url(self.full_name.as_deref()),
        }
    }

    pub fn is_premium(&self) -> bool {
        self.subscription_plan != DEFAULT_PLAN
    }
}

/// The authenticated user behind a request, as described by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: Option<String>,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            full_name: claims.user_metadata.full_name,
            avatar_url: claims.user_metadata.avatar_url,
            provider: claims.app_metadata.provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub credits: i64,
    pub subscription_plan: String,
    pub provider: String,
}

impl NewProfile {
    /// The row inserted on a user's first visit.
    pub fn for_session(user: &SessionUser) -> Self {
        let metadata_name = user.full_name.as_deref().filter(|n| !n.is_empty());

        Self {
            id: user.id,
            email: user.email.clone().unwrap_or_default(),
            full_name: metadata_name.unwrap_or(DEFAULT_FULL_NAME).to_string(),
            avatar_url: user
                .avatar_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| placeholder_avatar_url(metadata_name)),
            credits: DEFAULT_TOKENS,
            subscription_plan: DEFAULT_PLAN.to_string(),
            provider: user
                .provider
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        }
    }
}

/// Fields the edit action may change; `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdatePayload {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}
