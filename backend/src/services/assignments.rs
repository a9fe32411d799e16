//! Assignment (order) service and the stock transition engine
//!
//! The only status boundary with inventory side effects is
//! `transferred_to_dispatch`. The effect is decided by
//! `AssignmentStatus::stock_effect` from previous vs. new status and
//! applied inside the same transaction as the status write, so a
//! concurrent second attempt reads the already-updated status and finds
//! no effect to apply.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::kits::KitRow;
use shared::models::{Assignment, AssignmentStatus, ClientType, Kit, StockEffect};
use shared::planning::dispatch_components_for_kit;
use shared::validation::validate_positive_quantity;

/// Assignment service for managing client orders
#[derive(Clone)]
pub struct AssignmentService {
    db: PgPool,
}

/// Database row for an assignment
#[derive(Debug, FromRow)]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_type: String,
    pub kit_id: Uuid,
    pub quantity: Decimal,
    pub status: String,
    pub grade: Option<String>,
    pub production_month: Option<String>,
    pub batch_id: Option<Uuid>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = AppError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let status = AssignmentStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown status '{}'", row.status)))?;
        let client_type = ClientType::from_str(&row.client_type)
            .ok_or_else(|| AppError::Internal(format!("unknown client type '{}'", row.client_type)))?;
        Ok(Assignment {
            id: row.id,
            client_id: row.client_id,
            client_type,
            kit_id: row.kit_id,
            quantity: row.quantity,
            status,
            grade: row.grade,
            production_month: row.production_month,
            batch_id: row.batch_id,
            courier: row.courier,
            tracking_number: row.tracking_number,
            dispatched_at: row.dispatched_at,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const ASSIGNMENT_COLUMNS: &str =
    "id, client_id, client_type, kit_id, quantity, status, grade, production_month, \
     batch_id, courier, tracking_number, dispatched_at, delivered_at, created_at, updated_at";

/// Input for creating an assignment
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentInput {
    pub client_id: Uuid,
    pub client_type: ClientType,
    pub kit_id: Uuid,
    pub quantity: Decimal,
    pub grade: Option<String>,
    pub production_month: Option<String>,
    pub batch_id: Option<Uuid>,
}

/// Input for updating dispatch metadata
#[derive(Debug, Deserialize)]
pub struct UpdateDispatchInput {
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
}

/// Input for a status change
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: AssignmentStatus,
}

/// Query filters for listing assignments
#[derive(Debug, Default, Deserialize)]
pub struct ListAssignmentsQuery {
    pub status: Option<AssignmentStatus>,
    pub batch_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

impl AssignmentService {
    /// Create a new AssignmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an assignment in the initial `assigned` status
    pub async fn create_assignment(&self, input: CreateAssignmentInput) -> AppResult<Assignment> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let kit_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM kits WHERE id = $1)")
                .bind(input.kit_id)
                .fetch_one(&self.db)
                .await?;
        if !kit_exists {
            return Err(AppError::NotFound("Kit".to_string()));
        }

        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(input.client_id)
                .fetch_one(&self.db)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            INSERT INTO assignments (client_id, client_type, kit_id, quantity, status,
                                     grade, production_month, batch_id)
            VALUES ($1, $2, $3, $4, 'assigned', $5, $6, $7)
            RETURNING {ASSIGNMENT_COLUMNS}
            "#,
        ))
        .bind(input.client_id)
        .bind(input.client_type.as_str())
        .bind(input.kit_id)
        .bind(input.quantity)
        .bind(&input.grade)
        .bind(&input.production_month)
        .bind(input.batch_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get an assignment by ID
    pub async fn get_assignment(&self, assignment_id: Uuid) -> AppResult<Assignment> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1"
        ))
        .bind(assignment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment".to_string()))?;

        row.try_into()
    }

    /// List assignments with optional filters
    pub async fn list_assignments(
        &self,
        query: ListAssignmentsQuery,
    ) -> AppResult<Vec<Assignment>> {
        let status = query.status.map(|s| s.as_str().to_string());

        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM assignments
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR batch_id = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .bind(query.batch_id)
        .bind(query.client_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Change an assignment's status, applying the stock transition
    /// when the packing-output boundary is crossed.
    ///
    /// A `delivered` assignment is migrated to order history and the
    /// live row removed.
    pub async fn update_status(
        &self,
        assignment_id: Uuid,
        input: UpdateStatusInput,
    ) -> AppResult<Option<Assignment>> {
        let new_status = input.status;
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1 FOR UPDATE"
        ))
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment".to_string()))?;
        let assignment: Assignment = row.try_into()?;
        let prev_status = assignment.status;

        if !AssignmentStatus::can_transition(prev_status, new_status) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot move assignment from {} to {}",
                prev_status.as_str(),
                new_status.as_str()
            )));
        }

        if let Some(effect) = AssignmentStatus::stock_effect(prev_status, new_status) {
            let kit = load_kit_in_tx(&mut tx, assignment.kit_id).await?;
            apply_stock_effect(&mut tx, &kit, assignment.quantity, effect).await?;
        }

        let dispatched_at = match new_status {
            AssignmentStatus::Dispatched => Some(Utc::now()),
            _ => assignment.dispatched_at,
        };
        let delivered_at = match new_status {
            AssignmentStatus::Delivered => Some(Utc::now()),
            _ => assignment.delivered_at,
        };

        let updated = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            UPDATE assignments
            SET status = $1, dispatched_at = $2, delivered_at = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {ASSIGNMENT_COLUMNS}
            "#,
        ))
        .bind(new_status.as_str())
        .bind(dispatched_at)
        .bind(delivered_at)
        .bind(assignment_id)
        .fetch_one(&mut *tx)
        .await?;

        // Delivered is terminal: archive and remove the live row
        if new_status == AssignmentStatus::Delivered {
            sqlx::query(
                r#"
                INSERT INTO order_history (assignment_id, client_id, client_type, kit_id,
                                           quantity, grade, production_month, batch_id,
                                           courier, tracking_number, dispatched_at, delivered_at)
                SELECT id, client_id, client_type, kit_id, quantity, grade, production_month,
                       batch_id, courier, tracking_number, dispatched_at, delivered_at
                FROM assignments WHERE id = $1
                "#,
            )
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query("DELETE FROM assignments WHERE id = $1")
                .bind(assignment_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(updated.try_into()?))
    }

    /// Update courier/tracking metadata
    pub async fn update_dispatch_info(
        &self,
        assignment_id: Uuid,
        input: UpdateDispatchInput,
    ) -> AppResult<Assignment> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            UPDATE assignments
            SET courier = COALESCE($1, courier),
                tracking_number = COALESCE($2, tracking_number),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {ASSIGNMENT_COLUMNS}
            "#,
        ))
        .bind(&input.courier)
        .bind(&input.tracking_number)
        .bind(assignment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment".to_string()))?;

        row.try_into()
    }
}

/// Load a kit inside an open transaction
pub(crate) async fn load_kit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    kit_id: Uuid,
) -> AppResult<Kit> {
    let row = sqlx::query_as::<_, KitRow>(
        r#"
        SELECT id, name, program_id, category, subject, serial_number, is_structured,
               packing_requirements, spare_kits, bulk_materials, miscellaneous,
               stock_count, status, created_at, updated_at
        FROM kits WHERE id = $1 FOR SHARE
        "#,
    )
    .bind(kit_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Kit".to_string()))?;

    row.try_into()
}

/// Apply or reverse the packing-output stock transition for one order.
///
/// Forward: finished-goods stock matching the kit's name goes up by the
/// order quantity (the row is created if absent) and every aggregated
/// dispatch component goes down, floored at zero. Reverse mirrors that
/// exactly. A component with no inventory match is skipped, not an
/// error; the gap surfaces through the shortage list instead.
pub(crate) async fn apply_stock_effect(
    tx: &mut Transaction<'_, Postgres>,
    kit: &Kit,
    order_qty: Decimal,
    effect: StockEffect,
) -> AppResult<()> {
    let components = dispatch_components_for_kit(kit, order_qty);

    match effect {
        StockEffect::Apply => {
            let updated = sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = quantity + $1, updated_at = NOW()
                WHERE id = (SELECT id FROM inventory_items
                            WHERE LOWER(name) = LOWER($2) AND kind = 'finished'
                            ORDER BY created_at LIMIT 1)
                "#,
            )
            .bind(order_qty)
            .bind(&kit.name)
            .execute(&mut **tx)
            .await?
            .rows_affected();

            if updated == 0 {
                sqlx::query(
                    r#"
                    INSERT INTO inventory_items (name, kind, quantity, unit, min_stock_level, components)
                    VALUES ($1, 'finished', $2, 'pcs', 0, '[]'::jsonb)
                    "#,
                )
                .bind(&kit.name)
                .bind(order_qty)
                .execute(&mut **tx)
                .await?;
            }

            for component in &components {
                decrement_by_name(tx, &component.name, component.quantity).await?;
            }
        }
        StockEffect::Reverse => {
            sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = GREATEST(quantity - $1, 0), updated_at = NOW()
                WHERE id = (SELECT id FROM inventory_items
                            WHERE LOWER(name) = LOWER($2) AND kind = 'finished'
                            ORDER BY created_at LIMIT 1)
                "#,
            )
            .bind(order_qty)
            .bind(&kit.name)
            .execute(&mut **tx)
            .await?;

            for component in &components {
                increment_by_name(tx, &component.name, component.quantity).await?;
            }
        }
    }

    Ok(())
}

/// Decrement the first name-matched item, floored at zero per
/// `shared::models::clamped_sub`; no match is silently skipped.
pub(crate) async fn decrement_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    quantity: Decimal,
) -> AppResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = GREATEST(quantity - $1, 0), updated_at = NOW()
        WHERE id = (SELECT id FROM inventory_items
                    WHERE LOWER(name) = LOWER($2)
                    ORDER BY created_at LIMIT 1)
        "#,
    )
    .bind(quantity)
    .bind(name)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tracing::debug!(material = name, "no inventory match for dispatch component");
    }
    Ok(())
}

/// Increment the first name-matched item; no match is silently skipped.
pub(crate) async fn increment_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    quantity: Decimal,
) -> AppResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = quantity + $1, updated_at = NOW()
        WHERE id = (SELECT id FROM inventory_items
                    WHERE LOWER(name) = LOWER($2)
                    ORDER BY created_at LIMIT 1)
        "#,
    )
    .bind(quantity)
    .bind(name)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tracing::debug!(material = name, "no inventory match to restore");
    }
    Ok(())
}
