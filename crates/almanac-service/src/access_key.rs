//! Access key service.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

use almanac_core::util::serde::double_option;
use almanac_db::db::connection::DbConnection;
use almanac_db::db::enums::AccessType;
use almanac_db::db::query::{access_key as key_query, sub_calendar as sub_calendar_query};
use almanac_db::model::access_key::{
    AccessKey, AccessKeyChangeset, NewAccessKey, NewSubCalendarPermission, SubCalendarPermission,
};
use almanac_db::model::calendar::Calendar;

use crate::auth::password::hash_password;
use crate::auth::token::generate_access_key;
use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessKeyInput {
    pub calendar_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    /// `null` or an empty string clears the password.
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
    pub active: Option<bool>,
    #[serde(default)]
    pub regenerate_key: bool,
    pub permissions: Option<Vec<PermissionInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionInput {
    pub sub_calendar_id: Option<i64>,
    pub access_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessKeyView {
    #[serde(flatten)]
    pub key: AccessKey,
    pub has_password: bool,
    pub sub_calendar_permissions: Vec<SubCalendarPermission>,
}

impl AccessKeyView {
    fn new(key: AccessKey, sub_calendar_permissions: Vec<SubCalendarPermission>) -> Self {
        Self {
            has_password: key.has_password(),
            key,
            sub_calendar_permissions,
        }
    }
}

/// Requested permissions, one per sub-calendar (the last entry wins).
type PermissionPlan = Vec<(i64, AccessType)>;

fn parse_access_type(raw: Option<&str>) -> Option<AccessType> {
    match raw? {
        "read_only" => Some(AccessType::ReadOnly),
        "modify" => Some(AccessType::Modify),
        _ => None,
    }
}

fn plan_permissions(errors: &mut ValidationErrors, permissions: &[PermissionInput]) -> PermissionPlan {
    let mut plan: PermissionPlan = Vec::with_capacity(permissions.len());
    for (index, permission) in permissions.iter().enumerate() {
        let Some(sub_calendar_id) = permission.sub_calendar_id else {
            errors.add(
                format!("permissions.{index}.sub_calendar_id"),
                format!("The permissions.{index}.sub_calendar_id field is required."),
            );
            continue;
        };
        let Some(access_type) = parse_access_type(permission.access_type.as_deref()) else {
            errors.add(
                format!("permissions.{index}.access_type"),
                format!("The selected permissions.{index}.access_type is invalid."),
            );
            continue;
        };

        match plan.iter_mut().find(|(id, _)| *id == sub_calendar_id) {
            Some(entry) => entry.1 = access_type,
            None => plan.push((sub_calendar_id, access_type)),
        }
    }
    plan
}

/// ## Summary
/// Checks that every planned sub-calendar belongs to `calendar_id`.
///
/// ## Errors
/// Returns `ServiceError::Validation` on `permissions` otherwise.
async fn check_permission_targets(
    conn: &mut DbConnection<'_>,
    calendar_id: i64,
    plan: &PermissionPlan,
) -> ServiceResult<()> {
    if plan.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = plan.iter().map(|(id, _)| *id).collect();
    let found: HashSet<i64> = sub_calendar_query::find_in_calendar(conn, calendar_id, &ids)
        .await?
        .into_iter()
        .map(|sub_calendar| sub_calendar.id)
        .collect();

    if ids.iter().all(|id| found.contains(id)) {
        Ok(())
    } else {
        Err(ServiceError::validation(
            "permissions",
            "One or more sub_calendar_id values are invalid for this calendar.",
        ))
    }
}

fn permission_rows(key_id: i64, plan: &PermissionPlan) -> Vec<NewSubCalendarPermission> {
    plan.iter()
        .map(|&(sub_calendar_id, access_type)| NewSubCalendarPermission {
            access_key_id: key_id,
            sub_calendar_id,
            access_type,
        })
        .collect()
}

fn check_name(errors: &mut ValidationErrors, name: Option<&str>) -> Option<String> {
    let name = name.map(str::trim).filter(|name| !name.is_empty())?;
    validation::max_length(errors, "name", name).then(|| name.to_owned())
}

/// Hashes a non-empty password; blank means no password.
fn password_hash(password: Option<&str>) -> ServiceResult<Option<String>> {
    password
        .filter(|password| !password.is_empty())
        .map(hash_password)
        .transpose()
}

/// ## Summary
/// Lists the user's access keys with their permissions.
///
/// ## Errors
/// Returns an error if a query fails.
pub async fn list_access_keys(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> ServiceResult<Vec<AccessKeyView>> {
    let keys = key_query::list_owned(conn, user_id, calendar_id).await?;
    let ids: Vec<i64> = keys.iter().map(|key| key.id).collect();

    let mut by_key: HashMap<i64, Vec<SubCalendarPermission>> = HashMap::new();
    for permission in key_query::permissions_for_keys(conn, &ids).await? {
        by_key.entry(permission.access_key_id).or_default().push(permission);
    }

    Ok(keys
        .into_iter()
        .map(|key| {
            let permissions = by_key.remove(&key.id).unwrap_or_default();
            AccessKeyView::new(key, permissions)
        })
        .collect())
}

/// ## Summary
/// Builds the response view of one owned access key.
///
/// ## Errors
/// Returns an error if loading its permissions fails.
pub async fn show_access_key(
    conn: &mut DbConnection<'_>,
    key: &AccessKey,
) -> ServiceResult<AccessKeyView> {
    let permissions = key_query::permissions_for_keys(conn, &[key.id]).await?;
    Ok(AccessKeyView::new(key.clone(), permissions))
}

/// ## Summary
/// Creates an access key for `calendar` with a freshly generated key string.
///
/// ## Side Effects
/// Inserts the key and its permissions in one transaction.
///
/// ## Errors
/// Returns `ServiceError::Validation` if a permission is malformed or names a
/// sub-calendar outside `calendar`.
#[tracing::instrument(skip(conn, calendar, input), fields(calendar_id = calendar.id))]
pub async fn create_access_key(
    conn: &mut DbConnection<'_>,
    calendar: &Calendar,
    input: &AccessKeyInput,
) -> ServiceResult<AccessKeyView> {
    let mut errors = ValidationErrors::new();
    let name = check_name(&mut errors, input.name.as_ref().and_then(Option::as_deref));
    let plan = plan_permissions(&mut errors, input.permissions.as_deref().unwrap_or_default());
    errors.into_result()?;
    check_permission_targets(conn, calendar.id, &plan).await?;

    let new_key = NewAccessKey {
        calendar_id: calendar.id,
        key: generate_access_key(),
        name,
        password_hash: password_hash(input.password.as_ref().and_then(Option::as_deref))?,
        active: input.active.unwrap_or(true),
    };

    let (key, permissions) = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let key = key_query::create(tx, &new_key).await?;
                let permissions =
                    key_query::replace_permissions(tx, key.id, &permission_rows(key.id, &plan))
                        .await?;
                Ok((key, permissions))
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(access_key_id = key.id, "Access key created");
    Ok(AccessKeyView::new(key, permissions))
}

/// ## Summary
/// Applies a partial update to an owned access key.
///
/// `regenerate_key: true` issues a new key string. A present `password` sets
/// or clears the password. A present `permissions` list replaces every
/// permission of the key.
///
/// ## Errors
/// Returns `ServiceError::Validation` if a permission is malformed or names a
/// sub-calendar outside the key's calendar.
#[tracing::instrument(skip(conn, existing, input), fields(access_key_id = existing.id))]
pub async fn update_access_key(
    conn: &mut DbConnection<'_>,
    existing: &AccessKey,
    input: &AccessKeyInput,
) -> ServiceResult<AccessKeyView> {
    let mut errors = ValidationErrors::new();
    let mut changes = AccessKeyChangeset {
        active: input.active,
        updated_at: Some(Utc::now()),
        ..AccessKeyChangeset::default()
    };
    if let Some(name) = &input.name {
        changes.name = Some(check_name(&mut errors, name.as_deref()));
    }
    let plan = input
        .permissions
        .as_deref()
        .map(|permissions| plan_permissions(&mut errors, permissions));
    errors.into_result()?;

    if let Some(plan) = &plan {
        check_permission_targets(conn, existing.calendar_id, plan).await?;
    }
    if input.regenerate_key {
        changes.key = Some(generate_access_key());
    }
    if let Some(password) = &input.password {
        changes.password_hash = Some(password_hash(password.as_deref())?);
    }

    let key_id = existing.id;
    let (key, permissions) = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let key = key_query::update(tx, key_id, &changes).await?;
                let permissions = match plan {
                    Some(plan) => {
                        key_query::replace_permissions(tx, key_id, &permission_rows(key_id, &plan))
                            .await?
                    }
                    None => key_query::permissions_for_keys(tx, &[key_id]).await?,
                };
                Ok((key, permissions))
            }
            .scope_boxed()
        })
        .await?;

    Ok(AccessKeyView::new(key, permissions))
}

/// ## Summary
/// Deletes an owned access key. Its permissions cascade.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn, existing), fields(access_key_id = existing.id))]
pub async fn delete_access_key(conn: &mut DbConnection<'_>, existing: &AccessKey) -> ServiceResult<()> {
    key_query::delete(conn, existing.id).await?;
    tracing::info!("Access key deleted");
    Ok(())
}
