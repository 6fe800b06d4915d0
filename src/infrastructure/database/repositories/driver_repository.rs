//! SeaORM implementation of DriverRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::driver::{Driver, DriverRepository};
use crate::infrastructure::database::entities::driver;
use crate::shared::DomainResult;

use super::db_err;

pub struct SeaOrmDriverRepository {
    db: DatabaseConnection,
}

impl SeaOrmDriverRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: driver::Model) -> Driver {
    Driver {
        id: m.id,
        user_id: m.user_id,
        license_no: m.license_no,
        car_name: m.car_name,
        seats: m.seats as u32,
        created_at: m.created_at,
    }
}

fn domain_to_active(d: &Driver) -> driver::ActiveModel {
    driver::ActiveModel {
        id: Set(d.id),
        user_id: Set(d.user_id),
        license_no: Set(d.license_no.clone()),
        car_name: Set(d.car_name.clone()),
        seats: Set(d.seats as i32),
        created_at: Set(d.created_at),
    }
}

#[async_trait]
impl DriverRepository for SeaOrmDriverRepository {
    async fn insert(&self, d: Driver) -> DomainResult<()> {
        debug!("Saving driver profile: {}", d.id);
        domain_to_active(&d).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DomainResult<Option<Driver>> {
        let model = driver::Entity::find()
            .filter(driver::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, d: &Driver) -> DomainResult<()> {
        domain_to_active(d).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
