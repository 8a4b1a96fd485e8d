//! Session state types

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Opaque user record returned by the identity service
///
/// Always a JSON object when deserialized; `null` or a bare value is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserInfo(Value);

impl<'de> Deserialize<'de> for UserInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if !raw.is_object() {
            return Err(de::Error::custom(format!(
                "userInfo must be a JSON object, got {}",
                raw
            )));
        }
        Ok(Self(raw))
    }
}

impl UserInfo {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Whether the record is a JSON object
    pub fn is_record(&self) -> bool {
        self.0.is_object()
    }

    /// Raw JSON record
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Look up a top-level string claim
    pub fn claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Display name, falling back to `preferred_username` then `sub`
    pub fn name(&self) -> Option<&str> {
        self.claim("name")
            .or_else(|| self.claim("preferred_username"))
            .or_else(|| self.claim("sub"))
    }

    pub fn email(&self) -> Option<&str> {
        self.claim("email")
    }
}

/// Current authentication state
///
/// Fields are private so that `authenticated` can never be set without a
/// user record. Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSessionState", rename_all = "camelCase")]
pub struct SessionState {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_info: Option<UserInfo>,
}

impl SessionState {
    /// Signed-out state
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signed-in state for the given user
    pub fn authenticated(user_info: UserInfo) -> Self {
        Self {
            authenticated: true,
            user_info: Some(user_info),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn user_info(&self) -> Option<&UserInfo> {
        self.user_info.as_ref()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSessionState {
    authenticated: bool,
    #[serde(default)]
    user_info: Option<UserInfo>,
}

impl TryFrom<RawSessionState> for SessionState {
    type Error = String;

    fn try_from(raw: RawSessionState) -> Result<Self, Self::Error> {
        match (raw.authenticated, raw.user_info) {
            (true, Some(info)) => Ok(Self::authenticated(info)),
            (true, None) => Err("authenticated session requires userInfo".to_string()),
            // A leftover user record on a signed-out state is dropped
            (false, _) => Ok(Self::anonymous()),
        }
    }
}
