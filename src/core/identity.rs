//! Identity facade - account registration, profile resolution and role checks.
//!
//! Credential hashing and token handling belong to the API layer. The core only
//! needs to store an opaque credential (produced by a [`CredentialHasher`]) and to
//! map an authenticated user id onto the customer or admin profile that the
//! ledger operations are keyed by.

use crate::{
    config::settings::StaffConfig,
    core::status::{AdminRole, Capability},
    entities::{Admin, Customer, User, admin, customer, user},
    errors::{Error, Result},
};
use chrono::Local;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

const MIN_PASSWORD_LEN: usize = 6;

/// Turns a plaintext password into the credential stored on the user row.
pub trait CredentialHasher: Send + Sync {
    /// Hashes `password`. Must not fail for any input.
    fn hash(&self, password: &str) -> String;
}

/// Input for a customer sign-up.
#[derive(Debug, Clone)]
pub struct CustomerRegistration {
    /// Login email
    pub email: String,
    /// Plaintext password, at least six characters
    pub password: String,
    /// Contact phone number
    pub phone: String,
    /// Given name
    pub first_name: String,
    /// Family name, optional
    pub last_name: Option<String>,
    /// Pickup street address
    pub address: String,
    /// Pickup city
    pub city: String,
}

/// Input for a staff sign-up.
#[derive(Debug, Clone)]
pub struct AdminRegistration {
    /// Login email
    pub email: String,
    /// Plaintext password, at least six characters
    pub password: String,
    /// Contact phone number
    pub phone: String,
    /// Given name
    pub first_name: String,
    /// Family name, optional
    pub last_name: Option<String>,
    /// Raw role string, must name one of the four staff roles
    pub role: String,
    /// Hub the staff member works from
    pub hub_location: Option<String>,
    /// Department
    pub department: Option<String>,
}

/// A freshly registered customer.
#[derive(Debug, Clone)]
pub struct CustomerAccount {
    /// Identity row
    pub user: user::Model,
    /// Customer profile row
    pub customer: customer::Model,
}

/// A freshly registered staff member.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    /// Identity row
    pub user: user::Model,
    /// Admin profile row
    pub admin: admin::Model,
}

/// Checks the shape of an email address: one `@`, a non-empty local part and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn require(fields: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(Error::validation("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Inserts a user row after checking the email is free.
async fn insert_user<C>(
    db: &C,
    email: &str,
    password_hash: String,
    phone: &str,
    first_name: &str,
    last_name: Option<&str>,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if find_user_by_email(db, email).await?.is_some() {
        return Err(Error::validation("Email already registered"));
    }

    let user = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        phone: Set(phone.trim().to_string()),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.unwrap_or_default().trim().to_string()),
        is_active: Set(true),
        created_at: Set(Local::now().naive_local()),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Registers a customer: validates input, then creates the user and profile atomically.
#[instrument(skip(db, registration, hasher), fields(email = %registration.email))]
pub async fn register_customer(
    db: &DatabaseConnection,
    registration: CustomerRegistration,
    hasher: &dyn CredentialHasher,
) -> Result<CustomerAccount> {
    let email = registration.email.trim();
    require(&[
        ("email", email),
        ("password", registration.password.as_str()),
        ("phone", registration.phone.as_str()),
        ("first name", registration.first_name.as_str()),
        ("address", registration.address.as_str()),
        ("city", registration.city.as_str()),
    ])?;
    validate_credentials(email, &registration.password)?;

    let txn = db.begin().await?;

    let user = insert_user(
        &txn,
        email,
        hasher.hash(&registration.password),
        &registration.phone,
        &registration.first_name,
        registration.last_name.as_deref(),
    )
    .await?;

    let customer = customer::ActiveModel {
        user_id: Set(user.id),
        address: Set(registration.address.trim().to_string()),
        city: Set(registration.city.trim().to_string()),
        total_earnings: Set(0.0),
        account_balance: Set(0.0),
        total_waste_sold: Set(0.0),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(user_id = user.id, customer_id = customer.id, "customer registered");
    Ok(CustomerAccount { user, customer })
}

/// Registers a staff member with one of the four known roles.
#[instrument(skip(db, registration, hasher), fields(email = %registration.email))]
pub async fn register_admin(
    db: &DatabaseConnection,
    registration: AdminRegistration,
    hasher: &dyn CredentialHasher,
) -> Result<AdminAccount> {
    let email = registration.email.trim();
    require(&[
        ("email", email),
        ("password", registration.password.as_str()),
        ("phone", registration.phone.as_str()),
        ("first name", registration.first_name.as_str()),
        ("role", registration.role.as_str()),
    ])?;
    let role: AdminRole = registration.role.trim().parse()?;
    validate_credentials(email, &registration.password)?;

    let txn = db.begin().await?;

    let user = insert_user(
        &txn,
        email,
        hasher.hash(&registration.password),
        &registration.phone,
        &registration.first_name,
        registration.last_name.as_deref(),
    )
    .await?;

    let admin = insert_admin_profile(
        &txn,
        user.id,
        role,
        registration.hub_location.as_deref(),
        registration.department.as_deref(),
    )
    .await?;

    txn.commit().await?;

    info!(user_id = user.id, admin_id = admin.id, %role, "admin registered");
    Ok(AdminAccount { user, admin })
}

async fn insert_admin_profile<C>(
    db: &C,
    user_id: i64,
    role: AdminRole,
    hub_location: Option<&str>,
    department: Option<&str>,
) -> Result<admin::Model>
where
    C: ConnectionTrait,
{
    let admin = admin::ActiveModel {
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        hub_location: Set(hub_location.unwrap_or_default().trim().to_string()),
        department: Set(department.unwrap_or_default().trim().to_string()),
        ..Default::default()
    };
    Ok(admin.insert(db).await?)
}

/// Creates the configured staff accounts, skipping emails that already exist.
///
/// Returns the number of accounts created. The whole roster is seeded in one
/// transaction, so an invalid entry leaves the database untouched.
#[instrument(skip_all, fields(entries = staff.len()))]
pub async fn seed_staff(db: &DatabaseConnection, staff: &[StaffConfig]) -> Result<usize> {
    let txn = db.begin().await?;
    let mut created = 0;

    for entry in staff {
        let email = entry.email.trim();
        if find_user_by_email(&txn, email).await?.is_some() {
            warn!(%email, "staff account already exists, skipping");
            continue;
        }
        if !is_valid_email(email) {
            return Err(Error::Config {
                message: format!("Invalid staff email: {email}"),
            });
        }
        let role: AdminRole = entry.role.parse().map_err(|_| Error::Config {
            message: format!("Invalid role for staff {email}: {}", entry.role),
        })?;

        let user = insert_user(
            &txn,
            email,
            entry.password_hash.clone(),
            &entry.phone,
            &entry.first_name,
            Some(&entry.last_name),
        )
        .await?;
        insert_admin_profile(
            &txn,
            user.id,
            role,
            Some(&entry.hub_location),
            Some(&entry.department),
        )
        .await?;
        created += 1;
    }

    txn.commit().await?;
    Ok(created)
}

/// Looks a user up by exact email.
pub async fn find_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves an authenticated user to their customer profile id.
///
/// Fails with `NotFound` when the user has no customer profile or is inactive.
pub async fn resolve_customer_id(db: &DatabaseConnection, user_id: i64) -> Result<i64> {
    let found = Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .find_also_related(User)
        .one(db)
        .await?;

    match found {
        Some((customer, Some(user))) if user.is_active => Ok(customer.id),
        _ => Err(Error::not_found("Customer profile", user_id)),
    }
}

/// Resolves an authenticated user to their admin profile.
///
/// Fails with `Unauthorized` when the user has no admin profile or is inactive.
pub async fn resolve_admin<C>(db: &C, user_id: i64) -> Result<admin::Model>
where
    C: ConnectionTrait,
{
    let found = Admin::find()
        .filter(admin::Column::UserId.eq(user_id))
        .find_also_related(User)
        .one(db)
        .await?;

    match found {
        Some((admin, Some(user))) if user.is_active => Ok(admin),
        _ => Err(Error::unauthorized("Admin profile not found")),
    }
}

/// Resolves the caller's admin profile and checks it holds `capability`.
pub async fn authorize<C>(db: &C, user_id: i64, capability: Capability) -> Result<admin::Model>
where
    C: ConnectionTrait,
{
    let admin = resolve_admin(db, user_id).await?;
    let role: AdminRole = admin.role.parse().map_err(|_| {
        Error::unauthorized(format!("Unknown role on admin profile {}", admin.id))
    })?;

    if capability.permits(role) {
        Ok(admin)
    } else {
        warn!(admin_id = admin.id, %role, ?capability, "capability denied");
        Err(Error::unauthorized(format!(
            "Role {role} may not perform this operation"
        )))
    }
}
