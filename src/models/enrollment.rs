use serde::Serialize;
use serde_json::Value;

/// Counts behind the admin dashboard. Key spelling matches what the web
/// client reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub approved_clases: u64,
    pub pending_clases: u64,
    pub instructors: u64,
    pub total_clases: u64,
    pub total_enrolled: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularInstructor {
    #[schema(value_type = Object)]
    pub instructor: Value,
    pub total_enrolled: i64,
}

/// One row per enrollment: the class and a snapshot of its instructor.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EnrolledClass {
    #[schema(value_type = Object)]
    pub classes: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub instructor: Option<Value>,
}
