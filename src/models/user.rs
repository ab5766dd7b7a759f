use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "instructor" => Ok(Role::Instructor),
            "student" => Ok(Role::Student),
            other => Err(format!("Invalid role: {}. Supported: admin, instructor, student", other)),
        }
    }
}

/// Body of `PUT /update-user/{id}`. The web client sends the role as `option`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: String,
    #[serde(alias = "role")]
    pub option: Role,
    pub address: Option<String>,
    pub about: Option<String>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    #[schema(value_type = Object)]
    pub skills: Option<Value>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Cart owner; defaults to the token's email.
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("instructor".parse::<Role>(), Ok(Role::Instructor));
        assert!("teacher".parse::<Role>().is_err());
    }

    #[test]
    fn test_update_request_accepts_option_or_role() {
        let via_option: UpdateUserRequest =
            serde_json::from_value(json!({ "email": "a@x.com", "option": "instructor" })).unwrap();
        assert_eq!(via_option.option, Role::Instructor);

        let via_role: UpdateUserRequest =
            serde_json::from_value(json!({ "email": "a@x.com", "role": "admin", "photoUrl": "p.png" }))
                .unwrap();
        assert_eq!(via_role.option, Role::Admin);
        assert_eq!(via_role.photo_url.as_deref(), Some("p.png"));
    }

    #[test]
    fn test_update_request_rejects_unknown_role() {
        let parsed = serde_json::from_value::<UpdateUserRequest>(json!({ "email": "a@x.com", "option": "root" }));
        assert!(parsed.is_err());
    }
}
