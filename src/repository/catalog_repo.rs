use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::{
    entity::products::{Column as ProdCol, Entity as Products},
    error::AppResult,
};

/// Current catalog price, used to snapshot prices before an order is built.
/// The order save path never calls this.
pub async fn get_unit_price<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> AppResult<Option<i64>> {
    let price = Products::find_by_id(product_id)
        .select_only()
        .column(ProdCol::Price)
        .into_tuple::<i64>()
        .one(conn)
        .await?;
    Ok(price)
}
