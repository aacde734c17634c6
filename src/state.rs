use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::graphql::CrmSchema;

/// Handle passed explicitly to every resolver and mutation.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
}

/// Router state: the shared store handle plus the built GraphQL schema.
#[derive(Clone)]
pub struct HttpState {
    pub app: AppState,
    pub schema: CrmSchema,
}

impl FromRef<HttpState> for AppState {
    fn from_ref(state: &HttpState) -> Self {
        state.app.clone()
    }
}

impl FromRef<HttpState> for CrmSchema {
    fn from_ref(state: &HttpState) -> Self {
        state.schema.clone()
    }
}
