use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Review state of a class. `denied` carries the admin's reason alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    Pending,
    Approved,
    Denied,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "approved",
            ClassStatus::Denied => "denied",
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangeStatusRequest {
    pub status: ClassStatus,
    pub reason: Option<String>,
}

/// Body of `PUT /update-class/{id}`. Seats arrive as a number or a numeric
/// string from HTML forms.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub price: Option<Value>,
    #[serde(rename = "availableSeats")]
    #[schema(value_type = i64)]
    pub available_seats: Value,
    #[serde(rename = "videoLink")]
    pub video_link: Option<String>,
}

/// Reads a seat count the way form posts send it: integer, whole float or
/// numeric string. Negative counts are rejected.
pub fn parse_seats(value: &Value) -> Result<i64, String> {
    let seats = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("availableSeats must be an integer, got {}", value))?;

    if seats < 0 {
        return Err(format!("availableSeats cannot be negative, got {}", seats));
    }
    Ok(seats)
}
