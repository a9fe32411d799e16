//! Client service
//!
//! Clients are the schools and individual buyers that orders are
//! assigned to. B2B clients are institutions; B2C clients are direct
//! purchasers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::ClientType;

/// Client service for buyer records
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

/// A buyer of kits, institutional or individual
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub client_type: ClientType,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    client_type: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let client_type = ClientType::from_str(&row.client_type).ok_or_else(|| {
            AppError::Internal(format!("unknown client type '{}'", row.client_type))
        })?;
        Ok(Client {
            id: row.id,
            name: row.name,
            client_type,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CLIENT_COLUMNS: &str =
    "id, name, client_type, contact_person, phone, email, address, created_at, updated_at";

/// Input for creating a client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub name: String,
    pub client_type: ClientType,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a client
    pub async fn create_client(&self, input: CreateClientInput) -> AppResult<Client> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (name, client_type, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.client_type.as_str())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get a client by ID
    pub async fn get_client(&self, client_id: Uuid) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        row.try_into()
    }

    /// List clients, optionally by type
    pub async fn list_clients(&self, client_type: Option<ClientType>) -> AppResult<Vec<Client>> {
        let client_type = client_type.map(|t| t.as_str().to_string());

        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE ($1::text IS NULL OR client_type = $1)
            ORDER BY name
            "#,
        ))
        .bind(client_type)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update a client. Client type is fixed at creation.
    pub async fn update_client(&self, client_id: Uuid, input: UpdateClientInput) -> AppResult<Client> {
        let existing = self.get_client(client_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let contact_person = input.contact_person.or(existing.contact_person);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let address = input.address.or(existing.address);

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients
            SET name = $1, contact_person = $2, phone = $3, email = $4, address = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&contact_person)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }
}
