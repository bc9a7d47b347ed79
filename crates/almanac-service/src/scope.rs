//! Ownership scope guard.
//!
//! Every resource id a request names, whether in a nested path
//! (`calendars/{calendar_id}/sub-calendars/{sub_calendar_id}/events/{event_id}`)
//! or a flat one (`events/{event_id}`), is resolved here against the
//! authenticated user. A resource that does not exist and a resource owned by
//! somebody else both come back as `NotFound`.

use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::{access_key, calendar, custom_field, event, sub_calendar};
use almanac_db::model::access_key::AccessKey;
use almanac_db::model::calendar::Calendar;
use almanac_db::model::custom_field::CustomEventField;
use almanac_db::model::event::Event;
use almanac_db::model::sub_calendar::SubCalendar;

use crate::error::{ServiceError, ServiceResult};

/// Resource ids taken from a request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopePath {
    pub calendar_id: Option<i64>,
    pub sub_calendar_id: Option<i64>,
    pub event_id: Option<i64>,
    pub custom_event_field_id: Option<i64>,
    pub access_key_id: Option<i64>,
}

/// An event together with the id of the calendar that owns its sub-calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedEvent {
    pub event: Event,
    pub calendar_id: i64,
}

/// The owned resources named by a [`ScopePath`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedScope {
    pub calendar: Option<Calendar>,
    pub sub_calendar: Option<SubCalendar>,
    pub event: Option<ScopedEvent>,
    pub custom_event_field: Option<CustomEventField>,
    pub access_key: Option<AccessKey>,
}

impl ResolvedScope {
    /// ## Errors
    /// Returns `NotFound` if the path named no calendar.
    pub fn calendar(&self) -> ServiceResult<&Calendar> {
        self.calendar.as_ref().ok_or(ServiceError::NotFound("calendar"))
    }

    /// ## Errors
    /// Returns `NotFound` if the path named no sub-calendar.
    pub fn sub_calendar(&self) -> ServiceResult<&SubCalendar> {
        self.sub_calendar
            .as_ref()
            .ok_or(ServiceError::NotFound("sub_calendar"))
    }

    /// ## Errors
    /// Returns `NotFound` if the path named no event.
    pub fn event(&self) -> ServiceResult<&ScopedEvent> {
        self.event.as_ref().ok_or(ServiceError::NotFound("event"))
    }

    /// ## Errors
    /// Returns `NotFound` if the path named no custom event field.
    pub fn custom_event_field(&self) -> ServiceResult<&CustomEventField> {
        self.custom_event_field
            .as_ref()
            .ok_or(ServiceError::NotFound("custom_event_field"))
    }

    /// ## Errors
    /// Returns `NotFound` if the path named no access key.
    pub fn access_key(&self) -> ServiceResult<&AccessKey> {
        self.access_key
            .as_ref()
            .ok_or(ServiceError::NotFound("access_key"))
    }
}

/// ## Summary
/// Resolves every id in `path` to a resource owned by `user_id` and checks
/// that nested children sit under the parents the path names.
///
/// ## Errors
/// Returns `NotFound` if any id is absent, not owned, or under a different parent.
#[tracing::instrument(skip(conn))]
pub async fn resolve_scope(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    path: ScopePath,
) -> ServiceResult<ResolvedScope> {
    let mut scope = ResolvedScope::default();

    if let Some(id) = path.calendar_id {
        scope.calendar = Some(
            calendar::find_owned(conn, user_id, id)
                .await?
                .ok_or(ServiceError::NotFound("calendar"))?,
        );
    }
    if let Some(id) = path.sub_calendar_id {
        scope.sub_calendar = Some(
            sub_calendar::find_owned(conn, user_id, id)
                .await?
                .ok_or(ServiceError::NotFound("sub_calendar"))?,
        );
    }
    if let Some(id) = path.event_id {
        let (event, calendar_id) = event::find_owned(conn, user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("event"))?;
        scope.event = Some(ScopedEvent { event, calendar_id });
    }
    if let Some(id) = path.custom_event_field_id {
        scope.custom_event_field = Some(
            custom_field::find_owned(conn, user_id, id)
                .await?
                .ok_or(ServiceError::NotFound("custom_event_field"))?,
        );
    }
    if let Some(id) = path.access_key_id {
        scope.access_key = Some(
            access_key::find_owned(conn, user_id, id)
                .await?
                .ok_or(ServiceError::NotFound("access_key"))?,
        );
    }

    check_lineage(&scope)?;
    Ok(scope)
}

/// ## Summary
/// Checks that each resolved child belongs to the resolved parents.
///
/// ## Errors
/// Returns `NotFound` naming the first child found under a different parent.
pub fn check_lineage(scope: &ResolvedScope) -> ServiceResult<()> {
    let calendar_id = scope.calendar.as_ref().map(|c| c.id);
    let under_calendar = |child_calendar_id: i64| calendar_id.is_none_or(|id| id == child_calendar_id);

    if let Some(sub_calendar) = &scope.sub_calendar
        && !under_calendar(sub_calendar.calendar_id)
    {
        return Err(ServiceError::NotFound("sub_calendar"));
    }

    if let Some(scoped) = &scope.event {
        let sub_calendar_matches = scope
            .sub_calendar
            .as_ref()
            .is_none_or(|s| s.id == scoped.event.sub_calendar_id);
        if !sub_calendar_matches || !under_calendar(scoped.calendar_id) {
            return Err(ServiceError::NotFound("event"));
        }
    }

    if let Some(field) = &scope.custom_event_field
        && !under_calendar(field.calendar_id)
    {
        return Err(ServiceError::NotFound("custom_event_field"));
    }

    if let Some(key) = &scope.access_key
        && !under_calendar(key.calendar_id)
    {
        return Err(ServiceError::NotFound("access_key"));
    }

    Ok(())
}
