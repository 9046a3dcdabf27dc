//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use af_sdk::User;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Result of `login` / `logout`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Email address used for an email login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl TableDisplay for AuthResponse {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mark = if self.success { "✓" } else { "✗" };
        writeln!(writer, "{mark} {}", self.message)?;
        Ok(())
    }
}

/// The authenticated user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User ID.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Linked wallet address.
    pub wallet_address: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            wallet_address: user.wallet_address,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl TableDisplay for UserInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".into());

        writeln!(writer, "User: {}", self.id)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Email:            {}", show(&self.email))?;
        writeln!(writer, "Username:         {}", show(&self.username))?;
        writeln!(writer, "Wallet:           {}", show(&self.wallet_address))?;
        writeln!(writer, "Created:          {}", show(&self.created_at))?;
        writeln!(writer, "Updated:          {}", show(&self.updated_at))?;
        Ok(())
    }
}

/// A freshly created personal access token.
#[derive(Debug, Clone, Serialize)]
pub struct PatCreated {
    /// Token name.
    pub name: String,
    /// Token value. Shown once.
    pub token: String,
}

impl TableDisplay for PatCreated {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ Personal access token '{}' created", self.name)?;
        writeln!(writer)?;
        writeln!(writer, "  {}", self.token)?;
        writeln!(writer)?;
        writeln!(writer, "Store it somewhere safe, it will not be shown again.")?;
        Ok(())
    }
}

/// Outcome of a `wait` command.
#[derive(Debug, Clone, Serialize)]
pub struct WaitReport {
    /// Resource kind, e.g. "domain".
    pub resource: String,
    /// Identifier that was waited on.
    pub id: String,
    /// Last terminal status, absent if the wait timed out.
    pub status: Option<String>,
    /// Whether the resource settled within the polling budget.
    pub settled: bool,
}

impl WaitReport {
    /// Report for a settled resource.
    #[must_use]
    pub fn settled(resource: &str, id: &str, status: String) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
            status: Some(status),
            settled: true,
        }
    }

    /// Report for a deletion wait; `gone` is false if the resource outlived the budget.
    #[must_use]
    pub fn deletion(resource: &str, id: &str, gone: bool) -> Self {
        if gone {
            Self::settled(resource, id, "DELETED".into())
        } else {
            Self::pending(resource, id)
        }
    }

    /// Report for a wait that ran out of attempts.
    #[must_use]
    pub fn pending(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
            status: None,
            settled: false,
        }
    }
}

impl TableDisplay for WaitReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match &self.status {
            Some(status) if self.settled => {
                writeln!(writer, "✓ {} {}: {}", self.resource, truncate(&self.id, 48), status)?;
            }
            _ => {
                writeln!(
                    writer,
                    "⚠ {} {} is still pending, check later",
                    self.resource,
                    truncate(&self.id, 48)
                )?;
            }
        }
        Ok(())
    }
}

/// Wire name of a status enum, e.g. `CREATING_FAILED`.
#[must_use]
pub fn status_label<S: Serialize + std::fmt::Debug>(status: &S) -> String {
    match serde_json::to_value(status) {
        Ok(serde_json::Value::String(label)) => label,
        _ => format!("{status:?}"),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_sdk::DomainStatus;

    fn user() -> UserInfo {
        UserInfo::from(User {
            id: "usr_1".into(),
            email: Some("user@example.com".into()),
            username: None,
            wallet_address: Some("0xabc".into()),
            created_at: Some("2025-01-01T00:00:00Z".into()),
            updated_at: None,
        })
    }

    #[test]
    fn output_format_default_is_table() {
        let fmt = OutputFormat::default();
        assert_eq!(fmt.format(), Format::Table);
        assert!(!fmt.is_json());
    }

    #[test]
    fn output_format_json() {
        let fmt = OutputFormat::new(Format::Json);
        assert_eq!(fmt.format(), Format::Json);
        assert!(fmt.is_json());
    }

    #[test]
    fn user_json_uses_camel_case() {
        let output = OutputFormat::new(Format::Json)
            .to_string(&user())
            .expect("should format");

        assert!(output.contains("\"walletAddress\": \"0xabc\""));
        assert!(output.contains("\"username\": null"));
    }

    #[test]
    fn user_table_fills_gaps() {
        let output = OutputFormat::default().to_string(&user()).expect("should format");

        assert!(output.contains("User: usr_1"));
        assert!(output.contains("user@example.com"));
        assert!(output.contains("Username:         -"));
    }

    #[test]
    fn auth_response_omits_missing_email() {
        let response = AuthResponse {
            success: true,
            message: "Logged out".into(),
            email: None,
        };
        let json = OutputFormat::new(Format::Json).to_string(&response).expect("json");
        assert!(!json.contains("email"));

        let table = OutputFormat::default().to_string(&response).expect("table");
        assert_eq!(table, "✓ Logged out\n");
    }

    #[test]
    fn pending_wait_report_says_check_later() {
        let output = OutputFormat::default()
            .to_string(&WaitReport::pending("domain", "www.example.com"))
            .expect("should format");
        assert!(output.contains("still pending, check later"));
    }

    #[test]
    fn settled_wait_report_shows_status() {
        let report = WaitReport::settled("domain", "www.example.com", status_label(&DomainStatus::Created));
        let output = OutputFormat::default().to_string(&report).expect("should format");
        assert_eq!(output, "✓ domain www.example.com: CREATED\n");
    }

    #[test]
    fn deletion_report_marks_gone_resources() {
        let report = WaitReport::deletion("zone", "zone_1", true);
        assert_eq!(report.status.as_deref(), Some("DELETED"));
        assert!(report.settled);
        assert!(!WaitReport::deletion("zone", "zone_1", false).settled);
    }

    #[test]
    fn status_label_uses_wire_name() {
        assert_eq!(status_label(&DomainStatus::CreatingFailed), "CREATING_FAILED");
    }

    #[test]
    fn truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
