// Site inventory model - websites owned by bloggers, selected by teams
// when building assignment candidate lists

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::order::OrderType;
use crate::schema::sites;

lazy_static! {
    static ref DOMAIN_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)+$"
    )
    .unwrap();
}

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Site model representing a database record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = sites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Site {
    pub id: Uuid,
    pub blogger_id: Uuid,
    pub domain: String,
    pub da: i32,
    pub dr: i32,
    pub referring_domains: i32,
    pub monthly_traffic: i32,
    pub spam_score: i32,
    pub guest_post_price_cents: i64,
    pub niche_edit_price_cents: i64,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New site for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sites)]
pub struct NewSite {
    pub id: Uuid,
    pub blogger_id: Uuid,
    pub domain: String,
    pub da: i32,
    pub dr: i32,
    pub referring_domains: i32,
    pub monthly_traffic: i32,
    pub spam_score: i32,
    pub guest_post_price_cents: i64,
    pub niche_edit_price_cents: i64,
    pub category: Option<String>,
    pub is_active: bool,
}

/// Update site fields
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = sites)]
pub struct SiteUpdate {
    pub domain: Option<String>,
    pub da: Option<i32>,
    pub dr: Option<i32>,
    pub referring_domains: Option<i32>,
    pub monthly_traffic: Option<i32>,
    pub spam_score: Option<i32>,
    pub guest_post_price_cents: Option<i64>,
    pub niche_edit_price_cents: Option<i64>,
    pub category: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl Site {
    /// Price for one placement of the given order type on this site.
    pub fn price_for(&self, order_type: OrderType) -> i64 {
        match order_type {
            OrderType::GuestPost => self.guest_post_price_cents,
            OrderType::NicheEdit => self.niche_edit_price_cents,
        }
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        site_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::sites::dsl;

        dsl::sites.filter(dsl::id.eq(site_id)).first::<Self>(conn).await
    }

    pub async fn find_by_blogger(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::sites::dsl;

        dsl::sites
            .filter(dsl::blogger_id.eq(owner))
            .order(dsl::created_at.desc())
            .load::<Self>(conn)
            .await
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to register a site in the inventory
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "domain": "techblog.example.com",
    "da": 55,
    "dr": 61,
    "referring_domains": 1200,
    "monthly_traffic": 45000,
    "spam_score": 2,
    "guest_post_price_cents": 12000,
    "niche_edit_price_cents": 8000,
    "category": "technology"
}))]
pub struct CreateSiteRequest {
    #[validate(length(min = 4, max = 255, message = "Domain must be 4-255 characters"))]
    #[validate(regex(path = "DOMAIN_REGEX", message = "Invalid domain name"))]
    pub domain: String,

    #[validate(range(min = 0, max = 100, message = "DA must be 0-100"))]
    pub da: i32,

    #[validate(range(min = 0, max = 100, message = "DR must be 0-100"))]
    pub dr: i32,

    #[validate(range(min = 0, message = "Referring domains must be non-negative"))]
    pub referring_domains: i32,

    #[validate(range(min = 0, message = "Monthly traffic must be non-negative"))]
    pub monthly_traffic: i32,

    #[validate(range(min = 0, max = 100, message = "Spam score must be 0-100"))]
    pub spam_score: i32,

    #[validate(range(min = 0, message = "Guest post price must be non-negative"))]
    pub guest_post_price_cents: i64,

    #[validate(range(min = 0, message = "Niche edit price must be non-negative"))]
    pub niche_edit_price_cents: i64,

    #[validate(length(max = 100, message = "Category must be less than 100 characters"))]
    pub category: Option<String>,
}

/// Request to update an existing site
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSiteRequest {
    #[validate(length(min = 4, max = 255, message = "Domain must be 4-255 characters"))]
    #[validate(regex(path = "DOMAIN_REGEX", message = "Invalid domain name"))]
    pub domain: Option<String>,

    #[validate(range(min = 0, max = 100, message = "DA must be 0-100"))]
    pub da: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "DR must be 0-100"))]
    pub dr: Option<i32>,

    #[validate(range(min = 0, message = "Referring domains must be non-negative"))]
    pub referring_domains: Option<i32>,

    #[validate(range(min = 0, message = "Monthly traffic must be non-negative"))]
    pub monthly_traffic: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "Spam score must be 0-100"))]
    pub spam_score: Option<i32>,

    #[validate(range(min = 0, message = "Guest post price must be non-negative"))]
    pub guest_post_price_cents: Option<i64>,

    #[validate(range(min = 0, message = "Niche edit price must be non-negative"))]
    pub niche_edit_price_cents: Option<i64>,

    #[validate(length(max = 100, message = "Category must be less than 100 characters"))]
    pub category: Option<String>,

    pub is_active: Option<bool>,
}

/// Metric filters used by managers/teams browsing the active inventory
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SiteFilter {
    pub min_da: Option<i32>,
    pub min_dr: Option<i32>,
    pub max_spam_score: Option<i32>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateSiteRequest {
        CreateSiteRequest {
            domain: "blog.example.com".to_string(),
            da: 40,
            dr: 50,
            referring_domains: 300,
            monthly_traffic: 10000,
            spam_score: 3,
            guest_post_price_cents: 9000,
            niche_edit_price_cents: 6000,
            category: Some("marketing".to_string()),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut request = valid_request();
        request.guest_post_price_cents = -1;
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.niche_edit_price_cents = -500;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_malformed_domain_rejected() {
        let mut request = valid_request();
        request.domain = "not a domain!".to_string();
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.domain = "no-tld".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_price_for_order_type() {
        let now = chrono::Utc::now();
        let site = Site {
            id: uuid::Uuid::new_v4(),
            blogger_id: uuid::Uuid::new_v4(),
            domain: "blog.example.com".to_string(),
            da: 40,
            dr: 50,
            referring_domains: 300,
            monthly_traffic: 10000,
            spam_score: 3,
            guest_post_price_cents: 9000,
            niche_edit_price_cents: 6000,
            category: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(site.price_for(OrderType::GuestPost), 9000);
        assert_eq!(site.price_for(OrderType::NicheEdit), 6000);
    }
}
