//! Relay-style connection wrappers for the paginated queries.

use async_graphql::SimpleObject;

use crate::models::{Customer, Order, Product};
use crate::params::{Page, encode_cursor};

#[derive(SimpleObject, Debug, Clone, Default)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    /// Rows matching the filter across all pages.
    pub total_count: u64,
}

macro_rules! define_connection {
    ($conn_name:ident, $edge_name:ident, $node_type:ty) => {
        #[derive(SimpleObject, Debug, Clone)]
        pub struct $edge_name {
            pub node: $node_type,
            pub cursor: String,
        }

        #[derive(SimpleObject, Debug, Clone)]
        pub struct $conn_name {
            pub edges: Vec<$edge_name>,
            pub page_info: PageInfo,
        }

        impl From<Page<$node_type>> for $conn_name {
            fn from(page: Page<$node_type>) -> Self {
                let Page {
                    items,
                    offset,
                    total,
                } = page;
                let has_next_page = offset + (items.len() as u64) < total;
                let edges: Vec<$edge_name> = items
                    .into_iter()
                    .zip(offset..)
                    .map(|(node, position)| $edge_name {
                        node,
                        cursor: encode_cursor(position),
                    })
                    .collect();
                let page_info = PageInfo {
                    has_next_page,
                    has_previous_page: offset > 0,
                    start_cursor: edges.first().map(|e| e.cursor.clone()),
                    end_cursor: edges.last().map(|e| e.cursor.clone()),
                    total_count: total,
                };
                Self { edges, page_info }
            }
        }
    };
}

define_connection!(CustomerConnection, CustomerEdge, Customer);
define_connection!(ProductConnection, ProductEdge, Product);
define_connection!(OrderConnection, OrderEdge, Order);
