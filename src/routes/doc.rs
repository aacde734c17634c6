use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    graphql::handler::{self, GraphqlRequestBody, GraphqlResponseBody},
    response::ApiResponse,
    routes::health::{self, HealthData},
};

#[derive(OpenApi)]
#[openapi(
    paths(health::health_check, handler::graphql_handler),
    components(schemas(
        HealthData,
        ApiResponse<HealthData>,
        GraphqlRequestBody,
        GraphqlResponseBody
    )),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "GraphQL", description = "Customers, products and orders over GraphQL"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
