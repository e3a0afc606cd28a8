// src/services/group_service.rs
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::dtos::group_dtos::GroupForm;
use crate::error::{AppError, AppResult};
use crate::models::group::{Group, NewGroup};
use crate::repositories::EntityStore;
use crate::services::authorization;

/// Groups are created by administrators only.
#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn EntityStore>,
}

impl GroupService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        self.store.list_groups().await
    }

    pub async fn create_group(&self, actor_id: Uuid, form: GroupForm) -> AppResult<Group> {
        let actor = self
            .store
            .find_user(actor_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !authorization::can_manage_groups(&actor) {
            warn!("user {} may not create groups", actor.username);
            return Err(AppError::Forbidden);
        }
        form.check()?;
        let group = self
            .store
            .insert_group(NewGroup {
                title: form.title,
                slug: form.slug,
            })
            .await?;
        info!("group '{}' created by {}", group.slug, actor.username);
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::repositories::InMemoryStore;

    fn sun() -> GroupForm {
        GroupForm {
            title: "Sun".into(),
            slug: "sun".into(),
        }
    }

    #[actix_web::test]
    async fn only_admins_create_groups() {
        let store = Arc::new(InMemoryStore::new());
        let admin = store
            .insert_user(NewUser::new("root", "root@example.com").admin())
            .await
            .unwrap();
        let sarah = store
            .insert_user(NewUser::new("sarah", "flower@gmail.com"))
            .await
            .unwrap();
        let svc = GroupService::new(store);

        assert_eq!(svc.create_group(sarah.id, sun()).await, Err(AppError::Forbidden));
        let group = svc.create_group(admin.id, sun()).await.unwrap();
        assert_eq!(group.slug, "sun");

        let err = svc.create_group(admin.id, sun()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(svc.list_groups().await.unwrap(), vec![group]);
    }
}
