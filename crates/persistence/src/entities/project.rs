//! Project entity definitions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Project;

/// Database entity for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
    pub id: i64,
    pub project_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub api_key_hash: String,
    pub api_key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectEntity> for Project {
    fn from(e: ProjectEntity) -> Self {
        Self {
            id: e.project_id,
            owner_user_id: e.owner_user_id,
            name: e.name,
            api_key_hash: e.api_key_hash,
            api_key_prefix: e.api_key_prefix,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = ProjectEntity {
            id: 7,
            project_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            name: "Acme Alerts".to_string(),
            api_key_hash: "abc123".to_string(),
            api_key_prefix: "aBcDeFgH".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let expected_id = entity.project_id;
        let project: Project = entity.into();
        assert_eq!(project.id, expected_id);
        assert_eq!(project.name, "Acme Alerts");
        assert_eq!(project.api_key_prefix, "aBcDeFgH");
    }
}
