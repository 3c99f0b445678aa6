//! Login roles and the persisted session.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{ADMIN_PASSWORD, ADMIN_USERNAME};
use crate::error::{EventBookError, EventBookResult};
use crate::event::EventStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    View,
    Edit,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Role::View => "view",
            Role::Edit => "edit",
            Role::Admin => "admin",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Role {
    type Err = EventBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Role::View),
            "edit" => Ok(Role::Edit),
            "admin" => Ok(Role::Admin),
            other => Err(EventBookError::Validation(format!(
                "Unknown role '{}'. Expected view, edit or admin",
                other
            ))),
        }
    }
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    /// Check credentials for `role` and open a session.
    ///
    /// View access needs only a username, edit access also needs a password,
    /// and admin access needs the admin credentials.
    pub fn login(username: &str, password: Option<&str>, role: Role) -> EventBookResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EventBookError::Auth("Username is required".into()));
        }
        let password = password.unwrap_or("");

        match role {
            Role::View => {}
            Role::Edit => {
                if password.is_empty() {
                    return Err(EventBookError::Auth("Password is required".into()));
                }
            }
            Role::Admin => {
                if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
                    return Err(EventBookError::Auth("Invalid admin credentials".into()));
                }
            }
        }

        info!(username, %role, "logged in");
        Ok(Session {
            username: username.to_string(),
            role,
        })
    }

    pub fn can_edit(&self) -> bool {
        matches!(self.role, Role::Edit | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_edit(&self) -> EventBookResult<()> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(EventBookError::Forbidden(format!(
                "'{}' has view-only access",
                self.username
            )))
        }
    }

    pub fn require_admin(&self) -> EventBookResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EventBookError::Forbidden("Admin access required".into()))
        }
    }

    /// Status a new submission from this user starts in.
    pub fn submission_status(&self) -> EventStatus {
        if self.is_admin() {
            EventStatus::Approved
        } else {
            EventStatus::Pending
        }
    }

    /// Read the saved session, if any.
    pub fn load(path: &Path) -> EventBookResult<Option<Session>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> EventBookResult<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, serde_json::to_string_pretty(self)?)?;
        std::fs::rename(&temp, path)?;
        debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Forget the saved session. Returns false if none was saved.
    pub fn clear(path: &Path) -> EventBookResult<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_needs_only_a_username() {
        let session = Session::login("priya", None, Role::View).unwrap();
        assert!(!session.can_edit());
        assert!(session.require_edit().is_err());
        assert!(Session::login("  ", None, Role::View).is_err());
    }

    #[test]
    fn edit_needs_a_password() {
        assert!(matches!(
            Session::login("priya", Some(""), Role::Edit),
            Err(EventBookError::Auth(_))
        ));
        let session = Session::login("priya", Some("secret"), Role::Edit).unwrap();
        assert!(session.can_edit());
        assert!(!session.is_admin());
        assert_eq!(session.submission_status(), EventStatus::Pending);
    }

    #[test]
    fn admin_needs_fixed_credentials() {
        assert!(Session::login("admin", Some("wrong"), Role::Admin).is_err());
        assert!(Session::login("priya", Some("admin123"), Role::Admin).is_err());

        let session = Session::login("admin", Some("admin123"), Role::Admin).unwrap();
        assert!(session.is_admin());
        assert!(session.require_admin().is_ok());
        assert_eq!(session.submission_status(), EventStatus::Approved);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn session_file_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert_eq!(Session::load(&path).unwrap(), None);

        let session = Session::login("priya", Some("pw"), Role::Edit).unwrap();
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), Some(session));

        assert!(Session::clear(&path).unwrap());
        assert!(!Session::clear(&path).unwrap());
        assert_eq!(Session::load(&path).unwrap(), None);
    }
}
