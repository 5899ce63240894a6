// Order model - a client request for N backlinks, created by a manager

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::orders;

/// Order type - determines which site price applies per placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    GuestPost,
    NicheEdit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::GuestPost => "guest_post",
            OrderType::NicheEdit => "niche_edit",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest_post" => Ok(OrderType::GuestPost),
            "niche_edit" => Ok(OrderType::NicheEdit),
            _ => Err(format!("Invalid order type: {}", s)),
        }
    }
}

/// Order database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: Uuid,
    pub client_name: String,
    pub order_type: String, // Will convert to enum
    pub link_count: i32,
    pub package: Option<String>,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New order for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub id: Uuid,
    pub client_name: String,
    pub order_type: String,
    pub link_count: i32,
    pub package: Option<String>,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub created_by: Uuid,
}

impl Order {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        order_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::orders::dsl;

        dsl::orders.filter(dsl::id.eq(order_id)).first::<Self>(conn).await
    }

    pub fn order_type_enum(&self) -> OrderType {
        OrderType::from_str(&self.order_type).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid order type '{}' for order {}, defaulting to GuestPost: {}",
                self.order_type,
                self.id,
                e
            );
            OrderType::GuestPost
        })
    }
}

/// Request to create an order. The client, type and link count become
/// immutable once the first assignment leaves draft.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "client_name": "Acme SaaS",
    "order_type": "guest_post",
    "link_count": 5,
    "package": "growth",
    "category": "technology",
    "instructions": "Anchor texts must be branded, no exact-match keywords."
}))]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub client_name: String,

    pub order_type: OrderType,

    #[validate(range(min = 1, max = 100, message = "Link count must be 1-100"))]
    pub link_count: i32,

    #[validate(length(max = 100, message = "Package must be less than 100 characters"))]
    pub package: Option<String>,

    #[validate(length(max = 100, message = "Category must be less than 100 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 10000, message = "Instructions too long"))]
    pub instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_conversion() {
        assert_eq!(OrderType::GuestPost.as_str(), "guest_post");
        assert_eq!(OrderType::NicheEdit.as_str(), "niche_edit");

        assert_eq!(OrderType::from_str("guest_post"), Ok(OrderType::GuestPost));
        assert_eq!(OrderType::from_str("niche_edit"), Ok(OrderType::NicheEdit));
        assert!(OrderType::from_str("banner_ad").is_err());
    }

    #[test]
    fn test_link_count_bounds() {
        let request = CreateOrderRequest {
            client_name: "Acme".to_string(),
            order_type: OrderType::GuestPost,
            link_count: 0,
            package: None,
            category: None,
            instructions: None,
        };
        assert!(request.validate().is_err());
    }
}
