use async_graphql::{InputObject, SimpleObject};

use crate::models::Customer;

#[derive(Debug, Clone, InputObject)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: Option<Customer>,
    pub message: String,
    pub success: bool,
}

impl CreateCustomerPayload {
    pub fn created(customer: Customer) -> Self {
        Self {
            customer: Some(customer),
            message: "Customer created successfully".into(),
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            customer: None,
            message: message.into(),
            success: false,
        }
    }
}

/// Why one item of a bulk create was skipped.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct CustomerError {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct BulkCreateCustomersPayload {
    pub customers: Vec<Customer>,
    pub errors: Vec<CustomerError>,
    /// True when at least one customer was created.
    pub success: bool,
}
