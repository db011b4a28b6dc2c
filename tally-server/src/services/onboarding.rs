//! Store onboarding and staff lifecycle
//!
//! Store creation bootstraps the owner as an active Admin staff row,
//! the only path that bypasses the pending-invitation flow. Everyone
//! else joins through a signed, time-limited invitation token encoding
//! (email, store, role): issuance creates/keeps a pending staff row,
//! redemption resolves-or-creates the user and activates the
//! membership. All notification mail is fire-and-forget.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{CurrentUser, JwtError, JwtService, password};
use crate::db::repository::{role, staff, store, user, RepoError};
use crate::services::MailerService;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Staff, StaffStatus, StaffUpdate, Store, StoreCreate};

/// Role granted to a store's creator
const OWNER_ROLE: &str = "Admin";

/// Generated password length for invited users without an account
const GENERATED_PASSWORD_LEN: usize = 12;

/// Invite a prospective staff member by email
#[derive(Debug, Clone, Deserialize)]
pub struct StaffInvite {
    pub email: String,
    pub role: String,
}

/// Redeem an invitation token
#[derive(Debug, Clone, Deserialize)]
pub struct InviteAccept {
    pub token: String,
    pub username: String,
    pub password: String,
}

/// Store creation, invitations, and staff lifecycle transitions
#[derive(Clone)]
pub struct OnboardingService {
    pool: SqlitePool,
    jwt: Arc<JwtService>,
    mailer: MailerService,
    frontend_url: String,
}

impl OnboardingService {
    pub fn new(
        pool: SqlitePool,
        jwt: Arc<JwtService>,
        mailer: MailerService,
        frontend_url: String,
    ) -> Self {
        Self {
            pool,
            jwt,
            mailer,
            frontend_url,
        }
    }

    /// Create a store and bootstrap its owner as active Admin staff,
    /// atomically.
    pub async fn create_store(&self, owner: &CurrentUser, data: StoreCreate) -> AppResult<Store> {
        validate_required_text(&data.name, "store name", MAX_NAME_LEN)?;

        let admin_role = role::find_by_name(&self.pool, OWNER_ROLE)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::RoleNotFound, "Admin role is not seeded")
            })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let new_store = match store::insert(&mut tx, owner.id, &data).await {
            Ok(new_store) => new_store,
            Err(RepoError::Duplicate(_)) => {
                return Err(AppError::with_message(
                    ErrorCode::StoreNameExists,
                    format!("Store name '{}' already exists", data.name),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        // The owner does not invite themselves: straight to active
        staff::insert(
            &mut tx,
            owner.id,
            new_store.id,
            Some(admin_role.id),
            StaffStatus::Active,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            store_id = new_store.id,
            owner_id = owner.id,
            name = %new_store.name,
            "Store created"
        );

        self.mailer.send_async(
            owner.email.clone(),
            "Store Created".to_string(),
            format!(
                "Hello {},\n\nYou have successfully created {}.\n\nBest regards,\nThe Tally Team",
                owner.username, new_store.name
            ),
        );

        Ok(new_store)
    }

    /// Create a staff membership: the store must exist, the role is
    /// resolved by name, and the unique (user, store) index turns
    /// concurrent duplicates into a conflict.
    pub async fn create_staff(
        &self,
        user_id: i64,
        store_id: i64,
        role_name: &str,
        status: StaffStatus,
    ) -> AppResult<Staff> {
        let role = role::find_by_name(&self.pool, role_name)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RoleNotFound,
                    format!("Role '{role_name}' not found"),
                )
            })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        if !store::exists(&mut tx, store_id).await? {
            return Err(AppError::with_message(
                ErrorCode::StoreNotFound,
                format!("Store {store_id} not found"),
            ));
        }

        let new_staff =
            staff::insert(&mut tx, user_id, store_id, Some(role.id), status).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(new_staff)
    }

    /// Invite a prospective staff member: resolve-or-create the user,
    /// resolve-or-create a pending membership, mail the invitation
    /// token. Fails with a conflict when a non-pending membership
    /// already exists.
    pub async fn invite_staff(
        &self,
        store_id: i64,
        inviter: &CurrentUser,
        data: StaffInvite,
    ) -> AppResult<Staff> {
        validate_email(&data.email)?;

        let target_store = store::find_by_id(&self.pool, store_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::StoreNotFound, format!("Store {store_id} not found"))
            })?;

        let (invited_user, generated_password) =
            match user::find_by_email(&self.pool, &data.email).await? {
                Some(existing) => (existing, None),
                None => {
                    let password = password::generate_random_password(GENERATED_PASSWORD_LEN);
                    let password_hash = password::hash_password(&password)
                        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
                    let username = data
                        .email
                        .split('@')
                        .next()
                        .unwrap_or(data.email.as_str())
                        .to_string();
                    let created =
                        user::create(&self.pool, &username, &data.email, &password_hash, true)
                            .await?;
                    (created, Some(password))
                }
            };

        let membership =
            match staff::find_by_user_and_store(&self.pool, invited_user.id, store_id).await? {
                Some(existing) => existing,
                None => {
                    self.create_staff(invited_user.id, store_id, &data.role, StaffStatus::Pending)
                        .await?
                }
            };

        if membership.status != StaffStatus::Pending {
            return Err(AppError::new(ErrorCode::StaffNotPending));
        }

        let token = self
            .jwt
            .generate_invitation_token(&invited_user.email, store_id, &data.role)
            .map_err(|e| AppError::internal(format!("Failed to generate invitation: {e}")))?;
        let invite_link = format!("{}/accept-invitation?token={}", self.frontend_url, token);

        let login_info = generated_password
            .map(|pw| format!("Email: {}\nTemporary password: {}\n\n", invited_user.email, pw))
            .unwrap_or_default();

        self.mailer.send_async(
            invited_user.email.clone(),
            format!("Tally: {} invitation", target_store.name),
            format!(
                "Hello {},\n\n{} is inviting you to join their store.\n\n\
                 Please click the link below to get onboarded:\n\n{}\n\n{}\
                 This link will expire in {} minutes.\n\
                 If you're not sure who it is from, you can safely ignore this email.\n\n\
                 Best regards,\nThe Tally Team",
                invited_user.username,
                inviter.username,
                invite_link,
                login_info,
                self.jwt.config.invitation_expiration_minutes
            ),
        );

        tracing::info!(
            store_id,
            staff_id = membership.id,
            email = %invited_user.email,
            "Staff invitation sent"
        );

        Ok(membership)
    }

    /// Re-issue and mail the invitation token for a still-pending staff
    /// member
    pub async fn resend_invitation(
        &self,
        store_id: i64,
        inviter: &CurrentUser,
        staff_id: i64,
    ) -> AppResult<()> {
        let membership = staff::find_by_id(&self.pool, staff_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {staff_id} not found"))
            })?;

        if membership.status != StaffStatus::Pending {
            return Err(AppError::with_message(
                ErrorCode::StaffNotPending,
                "Staff is not in pending status",
            ));
        }

        if membership.store_id != store_id {
            return Err(AppError::new(ErrorCode::CrossStoreAccess));
        }

        let target_store = store::find_by_id(&self.pool, store_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::StoreNotFound, format!("Store {store_id} not found"))
            })?;

        let invited_user = user::find_by_id(&self.pool, membership.user_id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, "Invited user not found"))?;

        let role_name = match membership.role_id {
            Some(role_id) => role::find_by_id(&self.pool, role_id)
                .await?
                .map(|r| r.name)
                .ok_or_else(|| {
                    AppError::with_message(ErrorCode::RoleNotFound, "Staff role no longer exists")
                })?,
            None => {
                return Err(AppError::with_message(
                    ErrorCode::RoleNotFound,
                    "Staff has no role assigned",
                ));
            }
        };

        let token = self
            .jwt
            .generate_invitation_token(&invited_user.email, store_id, &role_name)
            .map_err(|e| AppError::internal(format!("Failed to generate invitation: {e}")))?;
        let invite_link = format!("{}/accept-invitation?token={}", self.frontend_url, token);

        self.mailer.send_async(
            invited_user.email.clone(),
            format!("Tally: {} invitation", target_store.name),
            format!(
                "Hello {},\n\n{} is inviting you to join their store.\n\n\
                 Please click the link below to get onboarded:\n\n{}\n\n\
                 This link will expire in {} minutes.\n\
                 If you're not sure who it is from, you can safely ignore this email.\n\n\
                 Best regards,\nThe Tally Team",
                invited_user.username,
                inviter.username,
                invite_link,
                self.jwt.config.invitation_expiration_minutes
            ),
        );

        Ok(())
    }

    /// Redeem an invitation token.
    ///
    /// Verifies signature and expiry, resolves-or-creates the user for
    /// the embedded email, then activates (or creates directly active)
    /// the staff membership. Redemption of an already-active membership
    /// is a conflict.
    pub async fn accept_invitation(&self, data: InviteAccept) -> AppResult<Staff> {
        let claims = self
            .jwt
            .validate_invitation_token(&data.token)
            .map_err(|e| match e {
                JwtError::ExpiredToken => AppError::new(ErrorCode::InvitationExpired),
                _ => AppError::new(ErrorCode::InvitationInvalid),
            })?;

        let joining_user = match user::find_by_email(&self.pool, &claims.email).await? {
            Some(existing) => existing,
            None => {
                validate_required_text(&data.username, "username", MAX_NAME_LEN)?;
                validate_password(&data.password)?;
                let password_hash = password::hash_password(&data.password)
                    .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
                user::create(&self.pool, &data.username, &claims.email, &password_hash, true)
                    .await?
            }
        };

        let membership = match staff::find_by_user_and_store(
            &self.pool,
            joining_user.id,
            claims.store_id,
        )
        .await?
        {
            None => {
                // Redemption itself is the activation event: skip pending
                self.create_staff(
                    joining_user.id,
                    claims.store_id,
                    &claims.role,
                    StaffStatus::Active,
                )
                .await?
            }
            Some(existing) if existing.status == StaffStatus::Pending => {
                staff::set_status(&self.pool, existing.id, StaffStatus::Active).await?;
                staff::find_by_id(&self.pool, existing.id)
                    .await?
                    .ok_or_else(|| AppError::internal("Staff row vanished during activation"))?
            }
            Some(_) => return Err(AppError::new(ErrorCode::StaffNotPending)),
        };

        tracing::info!(
            staff_id = membership.id,
            store_id = claims.store_id,
            email = %claims.email,
            "Invitation accepted"
        );

        self.mailer.send_async(
            joining_user.email.clone(),
            "Tally: store invitation accepted".to_string(),
            format!(
                "Hello {},\n\nYou are now part of a new store.\n\n\
                 If this is an error, please report it at {}/report\n\n\
                 Best regards,\nThe Tally Team",
                joining_user.username, self.frontend_url
            ),
        );

        Ok(membership)
    }

    /// Administrative status/role update for a staff member of the
    /// given store
    pub async fn update_staff(&self, store_id: i64, data: StaffUpdate) -> AppResult<Staff> {
        let membership = staff::find_by_id(&self.pool, data.staff_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::StaffNotFound,
                    format!("Staff {} not found", data.staff_id),
                )
            })?;

        if membership.store_id != store_id {
            return Err(AppError::new(ErrorCode::CrossStoreAccess));
        }

        let role_id = match &data.role {
            Some(role_name) => Some(
                role::find_by_name(&self.pool, role_name)
                    .await?
                    .ok_or_else(|| {
                        AppError::with_message(
                            ErrorCode::RoleNotFound,
                            format!("Role '{role_name}' not found"),
                        )
                    })?
                    .id,
            ),
            None => None,
        };

        Ok(staff::update(&self.pool, data.staff_id, data.status, role_id).await?)
    }
}
