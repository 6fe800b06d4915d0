//! SeaORM implementation of GroupRepository
//!
//! Membership lives in the group_members join table; the domain aggregate
//! carries it as a plain member list, so updates rewrite the rows.

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::group::{Group, GroupRepository};
use crate::infrastructure::database::entities::{group, group_member};
use crate::shared::DomainResult;

use super::db_err;

pub struct SeaOrmGroupRepository {
    db: DatabaseConnection,
}

impl SeaOrmGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_members(&self, group_id: Uuid) -> DomainResult<Vec<Uuid>> {
        let rows = group_member::Entity::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    async fn replace_members(&self, group_id: Uuid, members: &[Uuid]) -> DomainResult<()> {
        group_member::Entity::delete_many()
            .filter(group_member::Column::GroupId.eq(group_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if members.is_empty() {
            return Ok(());
        }
        let rows: Vec<group_member::ActiveModel> = members
            .iter()
            .map(|user_id| group_member::ActiveModel {
                group_id: Set(group_id),
                user_id: Set(*user_id),
            })
            .collect();
        group_member::Entity::insert_many(rows)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

fn model_to_domain(m: group::Model, members: Vec<Uuid>) -> Group {
    Group {
        id: m.id,
        name: m.name,
        color: m.color,
        owner_id: m.owner_id,
        member_ids: members,
        created_at: m.created_at,
    }
}

#[async_trait]
impl GroupRepository for SeaOrmGroupRepository {
    async fn insert(&self, g: Group) -> DomainResult<()> {
        debug!("Saving group: {}", g.id);

        let model = group::ActiveModel {
            id: Set(g.id),
            name: Set(g.name.clone()),
            color: Set(g.color.clone()),
            owner_id: Set(g.owner_id),
            created_at: Set(g.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        self.replace_members(g.id, &g.member_ids).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>> {
        let model = group::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match model {
            Some(m) => {
                let members = self.load_members(m.id).await?;
                Ok(Some(model_to_domain(m, members)))
            }
            None => Ok(None),
        }
    }

    async fn find_for_member(&self, user_id: Uuid) -> DomainResult<Vec<Group>> {
        let memberships = group_member::Entity::find()
            .filter(group_member::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut groups = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(group) = self.find_by_id(membership.group_id).await? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    async fn update(&self, g: &Group) -> DomainResult<()> {
        let model = group::ActiveModel {
            id: Set(g.id),
            name: Set(g.name.clone()),
            color: Set(g.color.clone()),
            owner_id: Set(g.owner_id),
            created_at: Set(g.created_at),
        };
        model.update(&self.db).await.map_err(db_err)?;
        self.replace_members(g.id, &g.member_ids).await
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        group_member::Entity::delete_many()
            .filter(group_member::Column::GroupId.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        group::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
