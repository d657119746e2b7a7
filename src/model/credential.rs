use regex::Regex;
use std::sync::LazyLock;

/// `bot_id:secret`, digits before the only colon and exactly 35 characters after it.
static CREDENTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+:[^:]{35}$").expect("valid credential regex"));

/// Gateway session keys look like `agent:<agentId>:<rest>`.
static SESSION_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^agent:[^:]+:.*[^:].*$").expect("valid session key regex"));

pub const CREDENTIAL_FORMAT: &str = "bot_id:secret";
pub const CREDENTIAL_EXAMPLE: &str = "20231227:EXAMPLE_SECRET_KEY_35_CHARS_LONG_12";

/// Syntactic check only. A `false` here asks the user to confirm, it never rejects.
pub fn validate(credential: &str) -> bool {
    CREDENTIAL_RE.is_match(credential)
}

/// Whether `prefix` can start a gateway session key (`agent:<agentId>:<rest>`).
pub fn is_session_prefix(prefix: &str) -> bool {
    SESSION_KEY_RE.is_match(prefix.trim())
}
