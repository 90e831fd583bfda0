//! Seller Model

use serde::{Deserialize, Serialize};

/// Seller record — presales and ledger rows reference sellers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Seller {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create seller payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerCreate {
    pub name: String,
    pub phone: Option<String>,
}

/// Update seller payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}
