//! Postgres-backed trip request store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, query, query_as, FromRow, PgPool, Postgres, Row};
use uuid::Uuid;

use super::StoreError;
use crate::accounts::domain::UserId;
use crate::trips::domain::{OwnerSummary, TripRequest, TripRequestEntry, TripRequestId};
use crate::trips::repository::TripRequestStore;
use crate::trips::status::TripStatus;

const INSERT_TRIP_REQUEST_SQL: &str = include_str!("sql/insert_trip_request.sql");
const LIST_TRIP_REQUESTS_SQL: &str = include_str!("sql/list_trip_requests.sql");
const LIST_TRIP_REQUESTS_BY_OWNER_SQL: &str = include_str!("sql/list_trip_requests_by_owner.sql");
const GET_TRIP_REQUEST_SQL: &str = include_str!("sql/get_trip_request.sql");
const UPDATE_TRIP_REQUEST_STATUS_SQL: &str = include_str!("sql/update_trip_request_status.sql");
const DELETE_TRIP_REQUEST_SQL: &str = include_str!("sql/delete_trip_request.sql");

#[derive(Debug, Clone)]
pub struct PgTripRequestStore {
    pool: PgPool,
}

impl PgTripRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRequestStore for PgTripRequestStore {
    async fn insert(&self, record: TripRequest) -> Result<TripRequest, StoreError> {
        let people = i32::try_from(record.people)
            .map_err(|_| StoreError::Corrupt(format!("people out of range: {}", record.people)))?;

        let stored = query_as::<Postgres, TripRequest>(INSERT_TRIP_REQUEST_SQL)
            .bind(record.id.0)
            .bind(record.user_id.map(|owner| owner.0))
            .bind(&record.full_name)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.destination)
            .bind(&record.departure_city)
            .bind(record.take_off_day)
            .bind(record.return_date)
            .bind(people)
            .bind(&record.visa_type)
            .bind(&record.preferences)
            .bind(record.status.label())
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<TripRequestEntry>, StoreError> {
        let rows = query(LIST_TRIP_REQUESTS_SQL).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let trip = TripRequest::from_row(row)?;
                let owner_name: Option<String> = row.try_get("owner_name")?;
                let owner_email: Option<String> = row.try_get("owner_email")?;
                let owner = match (owner_name, owner_email) {
                    (Some(name), Some(email)) => Some(OwnerSummary { name, email }),
                    _ => None,
                };
                Ok(TripRequestEntry { trip, owner })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<TripRequest>, StoreError> {
        let records = query_as::<Postgres, TripRequest>(LIST_TRIP_REQUESTS_BY_OWNER_SQL)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn fetch(&self, id: &TripRequestId) -> Result<Option<TripRequest>, StoreError> {
        let record = query_as::<Postgres, TripRequest>(GET_TRIP_REQUEST_SQL)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn update_status(
        &self,
        id: &TripRequestId,
        expected: TripStatus,
        next: TripStatus,
        at: DateTime<Utc>,
    ) -> Result<TripRequest, StoreError> {
        let updated = query_as::<Postgres, TripRequest>(UPDATE_TRIP_REQUEST_STATUS_SQL)
            .bind(id.0)
            .bind(expected.label())
            .bind(next.label())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(record) => Ok(record),
            None if self.fetch(id).await?.is_some() => Err(StoreError::StaleStatus),
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: &TripRequestId) -> Result<(), StoreError> {
        let result = query(DELETE_TRIP_REQUEST_SQL)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for TripRequest {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let people: i32 = row.try_get("people")?;
        let people = u32::try_from(people).map_err(|e| sqlx::Error::ColumnDecode {
            index: "people".to_string(),
            source: Box::new(e),
        })?;

        let status: String = row.try_get("status")?;
        let status = status
            .parse::<TripStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: TripRequestId(row.try_get("id")?),
            user_id: row.try_get::<Option<Uuid>, _>("user_id")?.map(UserId),
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            destination: row.try_get("destination")?,
            departure_city: row.try_get("departure_city")?,
            take_off_day: row.try_get("take_off_day")?,
            return_date: row.try_get("return_date")?,
            people,
            visa_type: row.try_get("visa_type")?,
            preferences: row.try_get("preferences")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
