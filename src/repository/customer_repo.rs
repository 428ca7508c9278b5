use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::{
    entity::customers::{Entity as Customers, Model as CustomerModel},
    error::{AppError, AppResult},
};

pub async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<CustomerModel>> {
    Ok(Customers::find_by_id(id).one(conn).await?)
}

pub async fn ensure_exists<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<CustomerModel> {
    find(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", id))
}
