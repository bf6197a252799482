use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};

use crate::{
    audit::{AuditAction, record},
    dto::profile::{ProfileView, UpdateProfileRequest},
    entity::{
        user_profiles::{self, ActiveModel as ProfileActive, Entity as UserProfiles},
        users::{self, ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

pub(crate) async fn load_user_and_profile<C: sea_orm::ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
) -> AppResult<(users::Model, user_profiles::Model)> {
    let account = Users::find_by_id(user.user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = UserProfiles::find_by_id(user.user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((account, profile))
}

fn view(account: users::Model, profile: user_profiles::Model) -> ProfileView {
    ProfileView {
        username: account.username,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        profile: profile.into(),
    }
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProfileView>> {
    let (account, profile) = load_user_and_profile(&state.orm, user).await?;
    Ok(ApiResponse::success("Profile", view(account, profile), None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<ProfileView>> {
    let txn = state.orm.begin().await?;
    let (account, profile) = load_user_and_profile(&txn, user).await?;

    let account = if payload.first_name.is_some() || payload.last_name.is_some() {
        let mut active: UserActive = account.into();
        if let Some(first_name) = payload.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = payload.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        active.update(&txn).await?
    } else {
        account
    };

    let mut active: ProfileActive = profile.into();
    let fields = [
        (payload.phone, &mut active.phone),
        (payload.address_line1, &mut active.address_line1),
        (payload.address_line2, &mut active.address_line2),
        (payload.city, &mut active.city),
        (payload.state, &mut active.state),
        (payload.zip_code, &mut active.zip_code),
        (payload.country, &mut active.country),
    ];
    for (value, column) in fields {
        if let Some(value) = value {
            *column = Set(value.trim().to_string());
        }
    }
    active.updated_at = Set(Utc::now().into());
    let profile = active.update(&txn).await?;

    txn.commit().await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProfileUpdate,
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", view(account, profile), None))
}
