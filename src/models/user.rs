use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body accepted by `POST /api/users`.
/// Fields other than `name` and `email` are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

impl User {
    /// Builds a fresh record with a random id and both timestamps set to now.
    pub fn new(name: String, email: String) -> Self {
        let now = Utc::now();

        User {
            id: Uuid::new_v4(),
            name,
            email,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name cannot be empty".to_string());
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(format!("Name cannot exceed {} characters", MAX_NAME_LEN));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        if email.len() > MAX_EMAIL_LEN {
            return Err(format!("Email cannot exceed {} characters", MAX_EMAIL_LEN));
        }

        if !is_valid_email(email) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }

    /// Normalizes the input (trimmed name, trimmed lowercase email) into a new `User`.
    pub fn into_user(self) -> User {
        User::new(self.name.trim().to_string(), self.email.trim().to_lowercase())
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
        return false;
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    local.chars().all(|c| c.is_alphanumeric() || ".-_+".contains(c))
        && domain.chars().all(|c| c.is_alphanumeric() || ".-".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_user_creation() {
        let user = User::new("Alice".to_string(), "a@x.com".to_string());

        assert_ne!(user.id, Uuid::nil());
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "a@x.com");
        assert!(user.created_at <= Utc::now());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let first = User::new("Alice".to_string(), "a@x.com".to_string());
        let second = User::new("Alice".to_string(), "a@x.com".to_string());

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_create_user_request_validation() {
        assert!(request("Alice", "a@x.com").validate().is_ok());
        assert!(request("  Alice  ", " a@x.com ").validate().is_ok());

        assert!(request("", "a@x.com").validate().is_err());
        assert!(request("   ", "a@x.com").validate().is_err());
        assert!(request(&"n".repeat(101), "a@x.com").validate().is_err());
        assert!(request(&"n".repeat(100), "a@x.com").validate().is_ok());

        assert!(request("Alice", "").validate().is_err());
        assert!(request("Alice", "not-an-email").validate().is_err());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            request("", "a@x.com").validate().unwrap_err(),
            "Name cannot be empty"
        );
        assert_eq!(
            request("Alice", "nope").validate().unwrap_err(),
            "Invalid email format"
        );
    }

    #[test]
    fn test_into_user_normalizes_fields() {
        let user = request("  Alice ", " Alice@Example.COM ").into_user();

        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(is_valid_email("user+tag@example.org"));

        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_user_serialization() {
        let at = DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let user = User {
            id: Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_string(&user).expect("Failed to serialize user");
        let expected = r#"{"id":"123e4567-e89b-12d3-a456-426614174000","name":"Alice","email":"a@x.com","created_at":"2022-01-01T00:00:00Z","updated_at":"2022-01-01T00:00:00Z"}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_create_user_request_ignores_unknown_fields() {
        let json = r#"{"name":"Alice","email":"a@x.com","role":"admin"}"#;

        let request: CreateUserRequest =
            serde_json::from_str(json).expect("Failed to deserialize CreateUserRequest");

        assert_eq!(request.name, "Alice");
        assert_eq!(request.email, "a@x.com");
    }

    #[test]
    fn test_create_user_request_requires_both_fields() {
        assert!(serde_json::from_str::<CreateUserRequest>(r#"{"name":"Alice"}"#).is_err());
        assert!(serde_json::from_str::<CreateUserRequest>(r#"{"email":"a@x.com"}"#).is_err());
    }
}
