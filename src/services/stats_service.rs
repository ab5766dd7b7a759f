use mongodb::bson::doc;

use crate::database::{Collection, Store};
use crate::models::{AdminStats, ClassStatus, Role};
use crate::utils::AppError;

pub async fn admin_stats(store: &dyn Store) -> Result<AdminStats, AppError> {
    let approved_clases = store
        .count(Collection::Classes, doc! { "status": ClassStatus::Approved.as_str() })
        .await?;
    let pending_clases = store
        .count(Collection::Classes, doc! { "status": ClassStatus::Pending.as_str() })
        .await?;
    let instructors = store
        .count(Collection::Users, doc! { "role": Role::Instructor.as_str() })
        .await?;
    let total_clases = store.count(Collection::Classes, doc! {}).await?;
    let total_enrolled = store.count(Collection::Enrolled, doc! {}).await?;

    Ok(AdminStats {
        approved_clases,
        pending_clases,
        instructors,
        total_clases,
        total_enrolled,
    })
}
