//! Storage seam for the reconciler.

use std::future::Future;

use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::custom_field;
use almanac_db::model::custom_field::{CustomEventField, NewCustomEventFieldValue};

use crate::error::ServiceResult;

/// Field catalog lookups and value writes needed to reconcile one event.
///
/// Implemented for a pooled connection (usually one inside a transaction) and
/// for an in-memory store in tests.
pub trait FieldValueStore: Send {
    /// Fields of `calendar_id` whose ids are among `field_ids`.
    fn find_fields(
        &mut self,
        calendar_id: i64,
        field_ids: &[i64],
    ) -> impl Future<Output = ServiceResult<Vec<CustomEventField>>> + Send;

    /// How many of `option_ids` belong to `field_id`.
    fn count_options(
        &mut self,
        field_id: i64,
        option_ids: &[i64],
    ) -> impl Future<Output = ServiceResult<usize>> + Send;

    /// Removes every stored value of `field_id` for `event_id`.
    fn delete_values(
        &mut self,
        event_id: i64,
        field_id: i64,
    ) -> impl Future<Output = ServiceResult<()>> + Send;

    fn insert_values(
        &mut self,
        rows: &[NewCustomEventFieldValue],
    ) -> impl Future<Output = ServiceResult<()>> + Send;
}

impl FieldValueStore for DbConnection<'_> {
    async fn find_fields(
        &mut self,
        calendar_id: i64,
        field_ids: &[i64],
    ) -> ServiceResult<Vec<CustomEventField>> {
        Ok(custom_field::find_by_calendar_and_ids(self, calendar_id, field_ids).await?)
    }

    async fn count_options(&mut self, field_id: i64, option_ids: &[i64]) -> ServiceResult<usize> {
        let count = custom_field::count_options_of_field(self, field_id, option_ids).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn delete_values(&mut self, event_id: i64, field_id: i64) -> ServiceResult<()> {
        let removed = custom_field::delete_values(self, event_id, field_id).await?;
        tracing::trace!(event_id, field_id, removed, "Cleared field values");
        Ok(())
    }

    async fn insert_values(&mut self, rows: &[NewCustomEventFieldValue]) -> ServiceResult<()> {
        custom_field::insert_values(self, rows).await?;
        Ok(())
    }
}
