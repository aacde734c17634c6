use async_graphql::{EmptySubscription, Schema, dataloader::DataLoader, extensions::Tracing};

use crate::state::AppState;

use super::{
    MutationRoot, QueryRoot,
    loaders::{CustomerLoader, CustomerOrdersLoader, OrderProductsLoader},
};

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema. The store handle is attached as context data and read
/// back by every resolver; relation fields go through the batch loaders.
pub fn build_schema(state: AppState, depth_limit: usize) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(DataLoader::new(CustomerLoader::new(state.clone()), tokio::spawn))
        .data(DataLoader::new(
            CustomerOrdersLoader::new(state.clone()),
            tokio::spawn,
        ))
        .data(DataLoader::new(
            OrderProductsLoader::new(state.clone()),
            tokio::spawn,
        ))
        .data(state)
        .limit_depth(depth_limit)
        .extension(Tracing)
        .finish()
}
