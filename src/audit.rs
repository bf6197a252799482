use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    ProfileUpdate,
    CartAdd,
    CartRemove,
    CartClear,
    Checkout,
    PaymentCompleted,
    CategoryCreate,
    ProductCreate,
    ProductUpdate,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::ProfileUpdate => "profile_update",
            AuditAction::CartAdd => "cart_add",
            AuditAction::CartRemove => "cart_remove",
            AuditAction::CartClear => "cart_clear",
            AuditAction::Checkout => "checkout",
            AuditAction::PaymentCompleted => "payment_completed",
            AuditAction::CategoryCreate => "category_create",
            AuditAction::ProductCreate => "product_create",
            AuditAction::ProductUpdate => "product_update",
        }
    }

    pub fn resource(self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserLogin => "users",
            AuditAction::ProfileUpdate => "user_profiles",
            AuditAction::CartAdd | AuditAction::CartRemove | AuditAction::CartClear => "cart_items",
            AuditAction::Checkout => "orders",
            AuditAction::PaymentCompleted => "payments",
            AuditAction::CategoryCreate => "categories",
            AuditAction::ProductCreate | AuditAction::ProductUpdate => "products",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: AuditAction,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort audit write; failures are logged and swallowed.
pub async fn record(pool: &DbPool, user_id: Uuid, action: AuditAction, metadata: Value) {
    if let Err(err) = log_audit(pool, Some(user_id), action, Some(metadata)).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
