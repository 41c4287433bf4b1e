//! Customer route handlers.
//!
//! The listing, analytics, and email-lookup endpoints serve aggregates
//! derived from settled orders; the create/update/delete endpoints manage
//! persisted customer records. The two surfaces intentionally do not meet.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use encore_core::{Address, CustomerId, Email, Segment};

use crate::error::AppError;
use crate::models::{CustomerAggregate, CustomerUpdate, NewCustomer, Order};
use crate::services::customers::{CustomerDetail, CustomerSummary, ListQuery};
use crate::state::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
/// Order-history cap on the detail endpoint.
const DETAIL_ORDER_LIMIT: usize = 10;

/// Query string for the customer listing.
#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Segment filter; `all` or absent means no filter.
    #[serde(rename = "type")]
    pub segment: Option<String>,
}

/// Derived-customer stats block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsView {
    total_orders: u32,
    total_spent: Decimal,
    first_order_date: DateTime<Utc>,
    last_order_date: DateTime<Utc>,
}

/// One derived customer in the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerView {
    /// The email doubles as the aggregate's identifier.
    id: String,
    name: String,
    email: String,
    phone: String,
    address: serde_json::Value,
    customer_type: Segment,
    stats: StatsView,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn address_value(address: Option<&Address>) -> serde_json::Value {
    address
        .and_then(|a| serde_json::to_value(a).ok())
        .unwrap_or_else(|| json!({}))
}

impl From<CustomerSummary> for CustomerView {
    fn from(summary: CustomerSummary) -> Self {
        let a = summary.aggregate;
        Self {
            id: a.email.as_str().to_string(),
            name: a.display_name().to_string(),
            email: a.email.as_str().to_string(),
            phone: a.phone.clone(),
            address: address_value(a.address.as_ref()),
            customer_type: summary.segment,
            stats: StatsView {
                total_orders: a.total_orders,
                total_spent: a.total_spent,
                first_order_date: a.first_order_date,
                last_order_date: a.last_order_date,
            },
            created_at: a.first_order_date,
            updated_at: a.last_order_date,
        }
    }
}

/// Detail stats block, with the per-customer average.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailStatsView {
    total_orders: u32,
    total_spent: Decimal,
    average_order_value: Decimal,
    first_order_date: DateTime<Utc>,
    last_order_date: DateTime<Utc>,
}

/// One derived customer with order history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDetailView {
    id: String,
    name: String,
    email: String,
    phone: String,
    address: serde_json::Value,
    customer_type: Segment,
    stats: DetailStatsView,
    orders: Vec<Order>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerDetail> for CustomerDetailView {
    fn from(detail: CustomerDetail) -> Self {
        let CustomerAggregate {
            email,
            name,
            phone,
            address,
            total_orders,
            total_spent,
            first_order_date,
            last_order_date,
            mut orders,
        } = detail.aggregate;
        orders.truncate(DETAIL_ORDER_LIMIT);

        Self {
            id: email.as_str().to_string(),
            name,
            email: email.into_inner(),
            phone,
            address: address_value(address.as_ref()),
            customer_type: detail.segment,
            stats: DetailStatsView {
                total_orders,
                total_spent,
                average_order_value: detail.average_order_value,
                first_order_date,
                last_order_date,
            },
            orders,
            created_at: first_order_date,
            updated_at: last_order_date,
        }
    }
}

/// GET /customers - paginated, filterable customer listing.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    // An unrecognized segment matches nothing rather than erroring.
    let segment = match query.segment.as_deref() {
        None | Some("all") => None,
        Some(raw) => match raw.parse::<Segment>() {
            Ok(segment) => Some(segment),
            Err(_) => {
                return Ok(Json(json!({
                    "success": true,
                    "data": [],
                    "pagination": {
                        "total": 0,
                        "page": page.max(1),
                        "limit": limit.max(1),
                        "totalPages": 0,
                    },
                })));
            }
        },
    };

    let result = state
        .customers()
        .list(ListQuery {
            page,
            limit,
            search: query.search,
            segment,
        })
        .await?;

    let customers: Vec<CustomerView> = result.customers.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "success": true,
        "data": customers,
        "pagination": {
            "total": result.total,
            "page": result.page,
            "limit": result.limit,
            "totalPages": result.total_pages,
        },
    })))
}

/// GET /customers/analytics - fleet-wide customer metrics.
#[instrument(skip(state))]
pub async fn analytics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let analytics = state.customers().analytics().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "totalCustomers": analytics.total_customers,
            "newCustomersThisMonth": analytics.new_customers_this_month,
            "totalRevenue": analytics.total_revenue,
            "averageOrderValue": analytics.average_order_value,
            "customersByType": analytics.by_segment,
        },
    })))
}

/// GET /customers/{email} - one derived customer with order history.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // A string that is not even an email cannot match any aggregate.
    let email =
        Email::parse(&email).map_err(|_| AppError::NotFound("Customer".to_string()))?;
    let detail = state.customers().get(&email).await?;

    Ok(Json(json!({
        "status": "SUCCESS",
        "data": CustomerDetailView::from(detail),
    })))
}

/// Address fields as received from the client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl AddressBody {
    /// Validate into a domain address; country is stamped server-side.
    fn validate(&self) -> Result<Address, AppError> {
        fn present(field: &Option<String>) -> Result<&str, encore_core::AddressError> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(encore_core::AddressError::MissingField)
        }

        let street = present(&self.street)?;
        let city = present(&self.city)?;
        let state = present(&self.state)?;
        let postal_code = present(&self.postal_code)?;

        Ok(Address::parse(street, city, state, postal_code)?)
    }
}

/// POST /customers request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerBody {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<AddressBody>,
}

fn require(field: Option<String>) -> Result<String, AppError> {
    match field {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::Validation(
            "All fields are required: firstName, lastName, email, phone, address".to_string(),
        )),
    }
}

impl CreateCustomerBody {
    fn validate(self) -> Result<NewCustomer, AppError> {
        let first_name = require(self.first_name)?;
        let last_name = require(self.last_name)?;
        let email_raw = require(self.email)?;
        let phone = require(self.phone)?;
        let address = self.address.ok_or_else(|| {
            AppError::Validation(
                "All fields are required: firstName, lastName, email, phone, address".to_string(),
            )
        })?;

        let address = address.validate()?;
        let email = Email::parse(&email_raw).map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(NewCustomer {
            first_name,
            last_name,
            email,
            phone,
            address,
        })
    }
}

/// POST /customers - create a persisted customer record.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerBody>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customers().create_record(body.validate()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "SUCCESS",
            "message": "Customer added successfully",
            "data": customer,
        })),
    ))
}

/// PUT /customers/{id} request body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerBody {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// When present, a complete replacement address; partial addresses
    /// are rejected rather than merged.
    #[serde(default)]
    pub address: Option<AddressBody>,
}

impl UpdateCustomerBody {
    fn validate(self) -> Result<CustomerUpdate, AppError> {
        let email = self
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let address = self.address.as_ref().map(AddressBody::validate).transpose()?;

        Ok(CustomerUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email,
            phone: self.phone,
            address,
        })
    }
}

fn parse_customer_id(raw: &str) -> Result<CustomerId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid customer ID".to_string()))
}

/// PUT /customers/{id} - partially update a persisted record.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCustomerBody>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_customer_id(&id)?;
    let customer = state.customers().update_record(id, body.validate()?).await?;

    Ok(Json(json!({
        "status": "SUCCESS",
        "message": "Customer updated successfully",
        "data": customer,
    })))
}

/// DELETE /customers/{id} - soft-delete a persisted record.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_customer_id(&id)?;
    state.customers().delete_record(id).await?;

    Ok(Json(json!({
        "status": "SUCCESS",
        "message": "Customer deleted successfully",
    })))
}
