//! Typed submission records and the line formatter.
//!
//! Every persisted line is self-contained plain text: embedded line breaks
//! in user fields are replaced with spaces so the store stays one record
//! per line.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::error::ServiceError;

/// Upper bound for every user-supplied field value.
pub const MAX_FIELD_LEN: usize = 200;

/// One user-originated record, as captured by a POST endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Email { email: String },
    Code { email: String, code: String },
    UidLevel { uid: String, level: String },
}

/// Timestamp convention for formatted log lines.
///
/// The service historically shipped in two flavors, one writing ISO-8601
/// timestamps and one writing locale-style `DD.MM.YYYY HH:MM:SS`; the
/// convention is a configuration choice here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Iso8601,
    Locale,
}

impl Submission {
    /// Validated email submission. Requires a value containing `@`.
    pub fn email(email: Option<String>) -> Result<Self, ServiceError> {
        let email = require_field("email", email)?;
        if !email.contains('@') {
            return Err(ServiceError::validation("Invalid email address."));
        }
        Ok(Self::Email { email })
    }

    /// Validated email+code submission.
    pub fn code(email: Option<String>, code: Option<String>) -> Result<Self, ServiceError> {
        let email = require_field("email", email)?;
        let code = require_field("code", code)?;
        Ok(Self::Code { email, code })
    }

    /// Validated uid+level submission.
    pub fn uid_level(uid: Option<String>, level: Option<String>) -> Result<Self, ServiceError> {
        let uid = require_field("uid", uid)?;
        let level = require_field("level", level)?;
        Ok(Self::UidLevel { uid, level })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Email { .. } => "email",
            Self::Code { .. } => "code",
            Self::UidLevel { .. } => "uid_level",
        }
    }
}

/// Format one submission as a single log line (no trailing newline).
pub fn format_line(
    submission: &Submission,
    ip: &str,
    now: DateTime<Utc>,
    format: TimestampFormat,
) -> String {
    let ts = match format {
        TimestampFormat::Iso8601 => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        TimestampFormat::Locale => now.format("%d.%m.%Y %H:%M:%S").to_string(),
    };
    let ip = clean_field(ip);

    match submission {
        Submission::Email { email } => {
            format!("[{ts}] | IP: {ip} | EMAIL: {}", clean_field(email))
        }
        Submission::Code { email, code } => format!(
            "[{ts}] | IP: {ip} | CODE: Email={} | Code={}",
            clean_field(email),
            clean_field(code)
        ),
        Submission::UidLevel { uid, level } => format!(
            "[{ts}] | IP: {ip} | UID: Uid={} | Level={}",
            clean_field(uid),
            clean_field(level)
        ),
    }
}

/// Replace embedded line breaks with single spaces.
fn clean_field(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

fn require_field(name: &str, value: Option<String>) -> Result<String, ServiceError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::validation(format!("Field '{name}' is required.")))?;

    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ServiceError::validation(format!(
            "Field '{name}' exceeds {MAX_FIELD_LEN} characters."
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn email_requires_at_sign() {
        assert!(Submission::email(Some("a@b.com".into())).is_ok());
        assert!(matches!(
            Submission::email(Some("not-an-email".into())),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            Submission::email(None),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            Submission::email(Some("   ".into())),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn field_length_boundary() {
        let at_limit = "x".repeat(MAX_FIELD_LEN);
        let over_limit = "x".repeat(MAX_FIELD_LEN + 1);

        assert!(Submission::uid_level(Some(at_limit.clone()), Some("3".into())).is_ok());
        assert!(matches!(
            Submission::uid_level(Some(over_limit.clone()), Some("3".into())),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            Submission::uid_level(Some("u1".into()), Some(over_limit.clone())),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            Submission::code(Some(format!("{over_limit}@x.com")), Some("C".into())),
            Err(ServiceError::Validation(_))
        ));
        assert!(Submission::code(Some("a@b.com".into()), Some(at_limit)).is_ok());
    }

    #[test]
    fn iso_line_contains_all_fields() {
        let submission = Submission::code(Some("x@y.com".into()), Some("ABC123".into())).unwrap();
        let line = format_line(&submission, "10.0.0.7", fixed_instant(), TimestampFormat::Iso8601);
        assert_eq!(
            line,
            "[2025-03-14T09:26:53Z] | IP: 10.0.0.7 | CODE: Email=x@y.com | Code=ABC123"
        );
    }

    #[test]
    fn locale_line_uses_day_first_timestamp() {
        let submission = Submission::email(Some("a@b.com".into())).unwrap();
        let line = format_line(&submission, "unknown", fixed_instant(), TimestampFormat::Locale);
        assert_eq!(line, "[14.03.2025 09:26:53] | IP: unknown | EMAIL: a@b.com");
    }

    #[test]
    fn uid_level_line_layout() {
        let submission = Submission::uid_level(Some("player-9".into()), Some("42".into())).unwrap();
        let line = format_line(&submission, "::1", fixed_instant(), TimestampFormat::Iso8601);
        assert_eq!(
            line,
            "[2025-03-14T09:26:53Z] | IP: ::1 | UID: Uid=player-9 | Level=42"
        );
    }

    #[test]
    fn embedded_line_breaks_become_spaces() {
        let submission =
            Submission::code(Some("a@b.com".into()), Some("one\r\ntwo\nthree\rfour".into()))
                .unwrap();
        let line = format_line(&submission, "1.2.3.4", fixed_instant(), TimestampFormat::Iso8601);
        assert!(line.ends_with("Code=one two three four"));
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Submission::email(Some("a@b".into())).unwrap().kind(), "email");
        assert_eq!(
            Submission::uid_level(Some("u".into()), Some("1".into()))
                .unwrap()
                .kind(),
            "uid_level"
        );
    }
}
