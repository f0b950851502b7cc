//! # Inventory Repository
//!
//! Database operations for inventory records.
//!
//! ## Key Operations
//! - Duplicate-aware create (insert, or report the existing record)
//! - Atomic insert-or-add-quantity merge
//! - Filtered listing for the inventory screen
//! - Distinct brand/category lists for the filter dialog
//!
//! ## Duplicate-Aware Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create("soap", " dove ", "HYGIENE", 5)                  │
//! │                                                                         │
//! │  trim + validate                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  INSERT ... ON CONFLICT DO NOTHING RETURNING ...                       │
//! │       │                                                                 │
//! │       ├── row returned?  → Inserted(new row)                           │
//! │       │                                                                 │
//! │       └── no row (unique key index hit)                                │
//! │              │                                                          │
//! │              ▼                                                          │
//! │         SELECT ... WHERE lower(trim(name))=lower(?) AND ...            │
//! │              │                                                          │
//! │              ▼                                                          │
//! │         Duplicate(existing row)   ← store untouched                    │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write transaction starts with a write statement, so SQLite takes the
//! write lock before anything is read and two concurrent creates cannot both
//! miss each other.
//!
//! ## Errors
//! Failures are logged here (`error!`, or `warn!` for rejected input) and
//! returned. Callers that want the old "nothing found" behavior degrade the
//! `DbResult` themselves.

use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::validation::{apply_quantity_delta, validate_item};
use stockroom_core::{
    CreateOutcome, InventoryItem, ItemFilter, ItemId, MergeOutcome, NewItem,
};
use tracing::{debug, error, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::query::{build_filtered_query, SELECT_COLUMNS};

const ENTITY: &str = "InventoryItem";

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO inventory (name, brand, category, quantity)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT DO NOTHING
    RETURNING id, name, brand, category, quantity
"#;

const SELECT_BY_KEY: &str = r#"
    SELECT id, name, brand, category, quantity
    FROM inventory
    WHERE lower(trim(name)) = lower(?1)
      AND lower(trim(COALESCE(brand, ''))) = lower(?2)
      AND lower(trim(COALESCE(category, ''))) = lower(?3)
"#;

const SELECT_ALL_BY_NAME: &str = r#"
    SELECT id, name, brand, category, quantity
    FROM inventory
    ORDER BY name ASC, id ASC
"#;

/// No-op write that takes the write lock and returns the current row.
const LOCK_BY_ID: &str = r#"
    UPDATE inventory
    SET quantity = COALESCE(quantity, 0)
    WHERE id = ?1
    RETURNING id, name, brand, category, quantity
"#;

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `inventory` row. Older rows may carry NULL labels or quantity.
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: i64,
    name: String,
    brand: Option<String>,
    category: Option<String>,
    quantity: Option<i64>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            id: row.id,
            name: row.name,
            brand: row.brand.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            quantity: row.quantity.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LabelColumn {
    Brand,
    Category,
}

impl LabelColumn {
    const fn as_str(&self) -> &'static str {
        match self {
            LabelColumn::Brand => "brand",
            LabelColumn::Category => "category",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LookupColumn {
    Name,
    Label(LabelColumn),
}

impl LookupColumn {
    const fn as_str(&self) -> &'static str {
        match self {
            LookupColumn::Name => "name",
            LookupColumn::Label(label) => label.as_str(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for inventory records.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.inventory();
///
/// match repo.create(&NewItem::new("Soap", "Dove", "Hygiene", 10)).await? {
///     CreateOutcome::Inserted(item) => println!("added #{}", item.id),
///     CreateOutcome::Duplicate(existing) => println!("already have {}", existing.quantity),
/// }
///
/// let low_stock = repo.get_filtered(None, None, Some("3"), Some("lte")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: Database,
}

impl InventoryRepository {
    /// Creates a repository bound to a storage handle.
    pub fn new(db: Database) -> Self {
        InventoryRepository { db }
    }

    async fn pool(&self) -> DbResult<SqlitePool> {
        self.db.pool().await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a record unless one with the same duplicate key exists.
    ///
    /// ## Arguments
    /// * `item` - Fields of the new record; text is trimmed before use
    ///
    /// ## Returns
    /// * `Ok(CreateOutcome::Inserted(item))` - New row, with its assigned id
    /// * `Ok(CreateOutcome::Duplicate(existing))` - Store unchanged
    /// * `Err(DbError::Rejected)` - Empty name or negative quantity
    pub async fn create(&self, item: &NewItem) -> DbResult<CreateOutcome> {
        let item = item.normalized();
        logged("create", self.create_normalized(&item).await)
    }

    async fn create_normalized(&self, item: &NewItem) -> DbResult<CreateOutcome> {
        validate_item(item)?;

        debug!(
            name = %item.name,
            brand = %item.brand,
            category = %item.category,
            quantity = item.quantity,
            "Creating inventory item"
        );

        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(transaction_failed)?;

        let outcome = match insert_if_absent(&mut tx, item).await? {
            Some(inserted) => CreateOutcome::Inserted(inserted),
            None => CreateOutcome::Duplicate(existing_duplicate(&mut tx, item).await?),
        };

        tx.commit().await.map_err(transaction_failed)?;

        match &outcome {
            CreateOutcome::Inserted(new) => debug!(id = new.id, "Inserted inventory item"),
            CreateOutcome::Duplicate(existing) => {
                debug!(id = existing.id, "Duplicate found, store unchanged")
            }
        }

        Ok(outcome)
    }

    /// Inserts a record, or adds its quantity to the existing duplicate.
    ///
    /// Insert, lookup and quantity update happen in one transaction.
    ///
    /// ## Returns
    /// * `Ok(MergeOutcome { merged: false, .. })` - New row
    /// * `Ok(MergeOutcome { merged: true, .. })` - Existing row, quantity summed
    pub async fn create_or_merge(&self, item: &NewItem) -> DbResult<MergeOutcome> {
        let item = item.normalized();
        logged("create_or_merge", self.merge_normalized(&item).await)
    }

    async fn merge_normalized(&self, item: &NewItem) -> DbResult<MergeOutcome> {
        validate_item(item)?;

        debug!(name = %item.name, quantity = item.quantity, "Creating or merging inventory item");

        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(transaction_failed)?;

        if let Some(inserted) = insert_if_absent(&mut tx, item).await? {
            tx.commit().await.map_err(transaction_failed)?;
            return Ok(MergeOutcome {
                item: inserted,
                merged: false,
            });
        }

        let mut existing = existing_duplicate(&mut tx, item).await?;
        existing.quantity = apply_quantity_delta(existing.id, existing.quantity, item.quantity)?;
        set_quantity(&mut tx, existing.id, existing.quantity).await?;

        tx.commit().await.map_err(transaction_failed)?;

        debug!(id = existing.id, quantity = existing.quantity, "Merged into existing item");
        Ok(MergeOutcome {
            item: existing,
            merged: true,
        })
    }

    /// Replaces the four mutable fields of a record.
    ///
    /// ## Returns
    /// * `Ok(true)` - Record updated
    /// * `Ok(false)` - No record with this id (nothing changed)
    /// * `Err(DbError::UniqueViolation)` - New fields collide with another record
    pub async fn update(&self, id: ItemId, item: &NewItem) -> DbResult<bool> {
        let item = item.normalized();
        logged("update", self.update_normalized(id, &item).await)
    }

    async fn update_normalized(&self, id: ItemId, item: &NewItem) -> DbResult<bool> {
        validate_item(item)?;

        debug!(id, name = %item.name, quantity = item.quantity, "Updating inventory item");

        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                name = ?2,
                brand = ?3,
                category = ?4,
                quantity = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.category)
        .bind(item.quantity)
        .execute(&pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(
                "name, brand, category",
                format!("{} / {} / {}", item.name, item.brand, item.category),
            ),
            other => other,
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Changes a record's quantity by `delta`.
    ///
    /// ## Returns
    /// * `Ok(item)` - Record after the change
    /// * `Err(DbError::NotFound)` - No record with this id
    /// * `Err(DbError::Rejected)` - Result would be negative; row unchanged
    pub async fn adjust_quantity(&self, id: ItemId, delta: i64) -> DbResult<InventoryItem> {
        logged("adjust_quantity", self.adjust(id, delta).await)
    }

    async fn adjust(&self, id: ItemId, delta: i64) -> DbResult<InventoryItem> {
        debug!(id, delta, "Adjusting quantity");

        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(transaction_failed)?;

        let mut item: InventoryItem = sqlx::query_as::<_, InventoryRow>(LOCK_BY_ID)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .map(Into::into)
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        // Dropping `tx` on error rolls back the lock write
        item.quantity = item.adjusted_quantity(delta)?;
        set_quantity(&mut tx, id, item.quantity).await?;

        tx.commit().await.map_err(transaction_failed)?;
        Ok(item)
    }

    /// Deletes a record.
    ///
    /// ## Returns
    /// * `Ok(true)` - Record removed
    /// * `Ok(false)` - No record with this id
    pub async fn delete(&self, id: ItemId) -> DbResult<bool> {
        logged("delete", self.delete_by_id(id).await)
    }

    async fn delete_by_id(&self, id: ItemId) -> DbResult<bool> {
        debug!(id, "Deleting inventory item");

        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM inventory WHERE id = ?1")
            .bind(id)
            .execute(&pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every record. Returns how many were removed.
    pub async fn clear(&self) -> DbResult<u64> {
        logged("clear", self.clear_all().await)
    }

    async fn clear_all(&self) -> DbResult<u64> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM inventory").execute(&pool).await?;

        debug!(removed = result.rows_affected(), "Cleared inventory");
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record, in insertion (id) order.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryItem>> {
        logged("get_all", self.fetch_all().await)
    }

    async fn fetch_all(&self) -> DbResult<Vec<InventoryItem>> {
        let pool = self.pool().await?;
        let rows: Vec<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM inventory ORDER BY id ASC",
            SELECT_COLUMNS
        ))
        .fetch_all(&pool)
        .await?;

        debug!(count = rows.len(), "Loaded inventory");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Filtered listing from raw filter-dialog text, ordered by name.
    ///
    /// Blank values impose no constraint and a blank comparator means `eq`.
    /// Quantity text is read up to its first non-digit, so `"5.5"` filters on
    /// `5`. Quantity text with no leading digits, or a comparator other than
    /// `eq`/`gte`/`lte`, drops the quantity predicate (with a warning).
    ///
    /// ## Example
    /// ```rust,ignore
    /// // quantity >= 5 in Hygiene, any brand
    /// let items = repo.get_filtered(Some("Hygiene"), None, Some("5"), Some("gte")).await?;
    /// ```
    pub async fn get_filtered(
        &self,
        category: Option<&str>,
        brand: Option<&str>,
        quantity: Option<&str>,
        comparator: Option<&str>,
    ) -> DbResult<Vec<InventoryItem>> {
        let filter = ItemFilter::from_raw(category, brand, quantity, comparator);

        if let Some(text) = quantity.filter(|q| !q.trim().is_empty()) {
            if filter.quantity.is_none() {
                warn!(
                    quantity = %text,
                    comparator = comparator.unwrap_or_default(),
                    "Ignoring unusable quantity filter"
                );
            }
        }

        self.get_filtered_by(&filter).await
    }

    /// Filtered listing from a typed filter, ordered by name then id.
    pub async fn get_filtered_by(&self, filter: &ItemFilter) -> DbResult<Vec<InventoryItem>> {
        logged("get_filtered", self.fetch_filtered(filter).await)
    }

    async fn fetch_filtered(&self, filter: &ItemFilter) -> DbResult<Vec<InventoryItem>> {
        debug!(?filter, "Filtering inventory");

        let pool = self.pool().await?;
        let rows: Vec<InventoryRow> = if filter.is_unconstrained() {
            sqlx::query_as(SELECT_ALL_BY_NAME).fetch_all(&pool).await?
        } else {
            let mut query = build_filtered_query(filter);
            query.build_query_as().fetch_all(&pool).await?
        };

        debug!(count = rows.len(), "Filter returned items");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Gets a record by id.
    ///
    /// ## Returns
    /// * `Ok(Some(item))` - Record found
    /// * `Ok(None)` - No record with this id
    pub async fn get_by_id(&self, id: ItemId) -> DbResult<Option<InventoryItem>> {
        logged("get_by_id", self.fetch_by_id(id).await)
    }

    async fn fetch_by_id(&self, id: ItemId) -> DbResult<Option<InventoryItem>> {
        let pool = self.pool().await?;
        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM inventory WHERE id = ?1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Records whose name equals `name` exactly (after trimming).
    pub async fn find_by_name(&self, name: &str) -> DbResult<Vec<InventoryItem>> {
        logged("find_by_name", self.find_by(LookupColumn::Name, name).await)
    }

    /// Records whose brand equals `brand` exactly (after trimming).
    pub async fn find_by_brand(&self, brand: &str) -> DbResult<Vec<InventoryItem>> {
        logged(
            "find_by_brand",
            self.find_by(LookupColumn::Label(LabelColumn::Brand), brand).await,
        )
    }

    /// Records whose category equals `category` exactly (after trimming).
    pub async fn find_by_category(&self, category: &str) -> DbResult<Vec<InventoryItem>> {
        logged(
            "find_by_category",
            self.find_by(LookupColumn::Label(LabelColumn::Category), category)
                .await,
        )
    }

    async fn find_by(&self, column: LookupColumn, value: &str) -> DbResult<Vec<InventoryItem>> {
        let value = value.trim();
        debug!(column = column.as_str(), value = %value, "Looking up inventory items");

        let pool = self.pool().await?;
        let rows: Vec<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM inventory WHERE {} = ?1 ORDER BY name ASC, id ASC",
            SELECT_COLUMNS,
            column.as_str()
        ))
        .bind(value)
        .fetch_all(&pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct non-empty categories, sorted.
    pub async fn list_distinct_categories(&self) -> DbResult<Vec<String>> {
        logged(
            "list_distinct_categories",
            self.distinct(LabelColumn::Category).await,
        )
    }

    /// Distinct non-empty brands, sorted.
    pub async fn list_distinct_brands(&self) -> DbResult<Vec<String>> {
        logged("list_distinct_brands", self.distinct(LabelColumn::Brand).await)
    }

    async fn distinct(&self, column: LabelColumn) -> DbResult<Vec<String>> {
        let column = column.as_str();
        let pool = self.pool().await?;

        let values: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT {col} FROM inventory \
             WHERE {col} IS NOT NULL AND {col} <> '' \
             ORDER BY {col} ASC",
            col = column
        ))
        .fetch_all(&pool)
        .await?;

        Ok(values)
    }

    /// Counts records.
    pub async fn count(&self) -> DbResult<i64> {
        logged("count", self.count_rows().await)
    }

    async fn count_rows(&self) -> DbResult<i64> {
        let pool = self.pool().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn insert_if_absent(
    conn: &mut SqliteConnection,
    item: &NewItem,
) -> DbResult<Option<InventoryItem>> {
    let row: Option<InventoryRow> = sqlx::query_as(INSERT_IF_ABSENT)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.category)
        .bind(item.quantity)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Into::into))
}

/// The row that made [`insert_if_absent`] a no-op.
async fn existing_duplicate(conn: &mut SqliteConnection, item: &NewItem) -> DbResult<InventoryItem> {
    let row: Option<InventoryRow> = sqlx::query_as(SELECT_BY_KEY)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.category)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Into::into).ok_or_else(|| {
        DbError::Internal(format!(
            "insert of '{}' conflicted but no record matches its key",
            item.name
        ))
    })
}

async fn set_quantity(conn: &mut SqliteConnection, id: ItemId, quantity: i64) -> DbResult<()> {
    sqlx::query("UPDATE inventory SET quantity = ?2 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

fn transaction_failed(err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::Internal(msg) | DbError::QueryFailed(msg) => DbError::TransactionFailed(msg),
        other => other,
    }
}

fn logged<T>(operation: &'static str, result: DbResult<T>) -> DbResult<T> {
    result.inspect_err(|e| {
        if e.is_rejected() {
            warn!(operation, error = %e, "Inventory write rejected");
        } else {
            error!(operation, error = %e, "Inventory operation failed");
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use std::collections::HashSet;
    use stockroom_core::{CoreError, QuantityComparator, ValidationError};

    async fn repo() -> InventoryRepository {
        Database::connect(DbConfig::in_memory())
            .await
            .unwrap()
            .inventory()
    }

    async fn seeded() -> InventoryRepository {
        let repo = repo().await;
        for item in [
            NewItem::new("Soap", "Dove", "Hygiene", 10),
            NewItem::new("Rice", "Tio Joao", "Food", 2),
            NewItem::new("Shampoo", "Dove", "Hygiene", 5),
            NewItem::new("Beans", "Camil", "Food", 7),
            NewItem::new("Toothpaste", "Colgate", "Hygiene", 0),
        ] {
            repo.create(&item).await.unwrap();
        }
        repo
    }

    fn names(items: &[InventoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    // -------------------------------------------------------------------------
    // create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_then_get_all_yields_the_record() {
        let repo = repo().await;

        let outcome = repo
            .create(&NewItem::new("Soap", "Dove", "Hygiene", 10))
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());
        assert!(outcome.existing().is_none());

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], outcome.into_item());
        assert_eq!(all[0].fields(), NewItem::new("Soap", "Dove", "Hygiene", 10));
    }

    #[tokio::test]
    async fn test_create_case_and_whitespace_variant_returns_existing() {
        let repo = repo().await;
        repo.create(&NewItem::new("Soap", "Dove", "Hygiene", 10))
            .await
            .unwrap();

        let outcome = repo
            .create(&NewItem::new("soap", " dove ", "HYGIENE", 5))
            .await
            .unwrap();

        let existing = outcome.existing().unwrap();
        assert_eq!(existing.name, "Soap");
        assert_eq!(existing.quantity, 10);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_trims_input() {
        let repo = repo().await;
        let item = repo
            .create(&NewItem::new("  Salt ", " Cisne", "Food  ", 1))
            .await
            .unwrap()
            .into_item();

        assert_eq!(item.fields(), NewItem::new("Salt", "Cisne", "Food", 1));
    }

    #[tokio::test]
    async fn test_create_accepts_long_and_non_ascii_text() {
        let repo = repo().await;
        let name = "A".repeat(300);
        let category = "é".repeat(51);

        let outcome = repo
            .create(&NewItem::new(name.clone(), "Dove", category.clone(), 4))
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, name);
        assert_eq!(all[0].category, category);

        let merged = repo
            .create_or_merge(&NewItem::new(name.clone(), "Dove", category.clone(), 1))
            .await
            .unwrap();
        assert!(merged.merged);
        assert_eq!(merged.item.quantity, 5);

        let longer = name.repeat(2);
        assert!(repo
            .update(all[0].id, &NewItem::new(longer.clone(), "Dove", category.clone(), 5))
            .await
            .unwrap());
        let item = repo.get_by_id(all[0].id).await.unwrap().unwrap();
        assert_eq!(item.name, longer);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_same_name_different_brand_is_not_duplicate() {
        let repo = repo().await;
        repo.create(&NewItem::new("Soap", "Dove", "Hygiene", 1))
            .await
            .unwrap();
        let outcome = repo
            .create(&NewItem::new("Soap", "Lux", "Hygiene", 1))
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());

        let outcome = repo
            .create(&NewItem::new("Soap", "", "Hygiene", 1))
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let repo = repo().await;

        let err = repo
            .create(&NewItem::new("   ", "Dove", "Hygiene", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let err = repo
            .create(&NewItem::new("Soap", "Dove", "Hygiene", -1))
            .await
            .unwrap_err();
        assert!(err.is_rejected());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_creates_insert_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(DbConfig::new(dir.path().join("inventory.db")))
            .await
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo = db.inventory();
                let name = if i % 2 == 0 { "Soap" } else { "SOAP" };
                tokio::spawn(async move {
                    repo.create(&NewItem::new(name, "Dove", "Hygiene", i))
                        .await
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if !handle.await.unwrap().unwrap().is_duplicate() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(db.inventory().count().await.unwrap(), 1);
        db.close().await;
    }

    // -------------------------------------------------------------------------
    // create_or_merge
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_or_merge_sums_quantities_in_place() {
        let repo = repo().await;

        let first = repo
            .create_or_merge(&NewItem::new("Soap", "Dove", "Hygiene", 10))
            .await
            .unwrap();
        assert!(!first.merged);

        let second = repo
            .create_or_merge(&NewItem::new("soap", "DOVE", " hygiene", 5))
            .await
            .unwrap();
        assert!(second.merged);
        assert_eq!(second.item.id, first.item.id);
        assert_eq!(second.item.quantity, 15);
        assert_eq!(second.item.name, "Soap");

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 15);
    }

    #[tokio::test]
    async fn test_create_or_merge_overflow_leaves_row_unchanged() {
        let repo = repo().await;
        repo.create(&NewItem::new("Pins", "", "", i64::MAX))
            .await
            .unwrap();

        let err = repo
            .create_or_merge(&NewItem::new("pins", "", "", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::QuantityOverflow { .. })));
        assert_eq!(repo.get_all().await.unwrap()[0].quantity, i64::MAX);
    }

    // -------------------------------------------------------------------------
    // update / adjust / delete / clear
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_replaces_fields_and_leaves_others() {
        let repo = seeded().await;
        let before = repo.get_all().await.unwrap();
        let target = before[1].clone();

        let changed = repo
            .update(target.id, &NewItem::new("Rice 5kg", "Tio Joao", "Grains", 4))
            .await
            .unwrap();
        assert!(changed);

        let after = repo.get_all().await.unwrap();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            if old.id == target.id {
                assert_eq!(new.fields(), NewItem::new("Rice 5kg", "Tio Joao", "Grains", 4));
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[tokio::test]
    async fn test_update_missing_id_is_noop() {
        let repo = seeded().await;
        let before = repo.get_all().await.unwrap();

        let changed = repo
            .update(9_999, &NewItem::new("Ghost", "", "", 1))
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(repo.get_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_into_existing_key_is_unique_violation() {
        let repo = seeded().await;
        let shampoo = repo.find_by_name("Shampoo").await.unwrap().remove(0);

        let err = repo
            .update(shampoo.id, &NewItem::new("SOAP", "dove", "Hygiene", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let unchanged = repo.get_by_id(shampoo.id).await.unwrap().unwrap();
        assert_eq!(unchanged, shampoo);
    }

    #[tokio::test]
    async fn test_update_may_change_case_of_own_key() {
        let repo = seeded().await;
        let soap = repo.find_by_name("Soap").await.unwrap().remove(0);

        assert!(repo
            .update(soap.id, &NewItem::new("SOAP", "Dove", "Hygiene", 10))
            .await
            .unwrap());
        assert_eq!(repo.get_by_id(soap.id).await.unwrap().unwrap().name, "SOAP");
    }

    #[tokio::test]
    async fn test_adjust_quantity() {
        let repo = seeded().await;
        let soap = repo.find_by_name("Soap").await.unwrap().remove(0);

        let item = repo.adjust_quantity(soap.id, -4).await.unwrap();
        assert_eq!(item.quantity, 6);

        let item = repo.adjust_quantity(soap.id, 3).await.unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(repo.get_by_id(soap.id).await.unwrap().unwrap().quantity, 9);
    }

    #[tokio::test]
    async fn test_adjust_quantity_never_goes_negative() {
        let repo = seeded().await;
        let rice = repo.find_by_name("Rice").await.unwrap().remove(0);

        let err = repo.adjust_quantity(rice.id, -3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientQuantity {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(repo.get_by_id(rice.id).await.unwrap().unwrap().quantity, 2);

        let item = repo.adjust_quantity(rice.id, -2).await.unwrap();
        assert_eq!(item.quantity, 0);
    }

    #[tokio::test]
    async fn test_adjust_quantity_unknown_id() {
        let repo = repo().await;
        let err = repo.adjust_quantity(42, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let repo = seeded().await;
        let rice = repo.find_by_name("Rice").await.unwrap().remove(0);

        assert!(repo.delete(rice.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 4);
        assert!(repo.get_by_id(rice.id).await.unwrap().is_none());

        // Repeated delete is a no-op
        assert!(!repo.delete(rice.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = seeded().await;
        assert_eq!(repo.clear().await.unwrap(), 5);
        assert!(repo.get_all().await.unwrap().is_empty());
        assert_eq!(repo.clear().await.unwrap(), 0);
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_all_is_in_insertion_order() {
        let repo = seeded().await;
        let all = repo.get_all().await.unwrap();
        assert_eq!(names(&all), ["Soap", "Rice", "Shampoo", "Beans", "Toothpaste"]);
    }

    #[tokio::test]
    async fn test_get_filtered_gte_is_ordered_subset() {
        let repo = seeded().await;

        let items = repo
            .get_filtered(None, None, Some("5"), Some("gte"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["Beans", "Shampoo", "Soap"]);
        assert!(items.iter().all(|i| i.quantity >= 5));
    }

    #[tokio::test]
    async fn test_get_filtered_lte_and_eq() {
        let repo = seeded().await;

        let items = repo
            .get_filtered(None, None, Some("5"), Some("lte"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["Rice", "Shampoo", "Toothpaste"]);

        let items = repo
            .get_filtered(None, None, Some("5"), Some("eq"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["Shampoo"]);

        // Missing comparator means eq
        let items = repo.get_filtered(None, None, Some("5"), None).await.unwrap();
        assert_eq!(names(&items), ["Shampoo"]);
    }

    #[tokio::test]
    async fn test_get_filtered_without_criteria_is_name_ordered() {
        let repo = seeded().await;

        let items = repo.get_filtered(Some(" "), None, Some(""), None).await.unwrap();
        assert_eq!(
            names(&items),
            ["Beans", "Rice", "Shampoo", "Soap", "Toothpaste"]
        );
        assert_eq!(repo.get_filtered_by(&ItemFilter::all()).await.unwrap(), items);
    }

    #[tokio::test]
    async fn test_get_filtered_unparsable_quantity_is_ignored() {
        let repo = seeded().await;

        let unfiltered = repo.get_filtered(None, None, None, None).await.unwrap();
        for text in ["lots", "-", ".5"] {
            let items = repo
                .get_filtered(None, None, Some(text), Some("gte"))
                .await
                .unwrap();
            assert_eq!(items, unfiltered);
        }
        assert_eq!(unfiltered.len(), 5);
    }

    #[tokio::test]
    async fn test_get_filtered_reads_leading_integer_of_quantity() {
        let repo = repo().await;
        for (name, quantity) in [("A", 3), ("B", 5), ("C", 9)] {
            repo.create(&NewItem::new(name, "", "", quantity)).await.unwrap();
        }

        let items = repo
            .get_filtered(None, None, Some("5.5"), Some("gte"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["B", "C"]);

        let items = repo
            .get_filtered(None, None, Some("5abc"), Some("lte"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["A", "B"]);

        let items = repo
            .get_filtered(None, None, Some("12abc"), Some("eq"))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_get_filtered_unknown_comparator_is_unfiltered() {
        let repo = repo().await;
        for (name, quantity) in [("A", 3), ("B", 5), ("C", 9)] {
            repo.create(&NewItem::new(name, "", "", quantity)).await.unwrap();
        }

        for comparator in ["between", "gt", "GREATER"] {
            let items = repo
                .get_filtered(None, None, Some("5"), Some(comparator))
                .await
                .unwrap();
            assert_eq!(names(&items), ["A", "B", "C"], "comparator {:?}", comparator);
        }

        // Strictly-greater is still reachable through a typed filter
        let filter = ItemFilter::all().with_quantity(5, QuantityComparator::Gt);
        let items = repo.get_filtered_by(&filter).await.unwrap();
        assert_eq!(names(&items), ["C"]);
    }

    #[tokio::test]
    async fn test_get_filtered_by_category_and_brand() {
        let repo = seeded().await;

        let items = repo
            .get_filtered(Some("Hygiene"), Some("Dove"), None, None)
            .await
            .unwrap();
        assert_eq!(names(&items), ["Shampoo", "Soap"]);

        // Label filters are exact, blank means unconstrained
        let items = repo
            .get_filtered(Some("hygiene"), Some(""), None, None)
            .await
            .unwrap();
        assert!(items.is_empty());

        let items = repo
            .get_filtered(Some("Food"), Some(" "), Some("3"), Some("gte"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["Beans"]);
    }

    #[tokio::test]
    async fn test_get_filtered_by_search_and_in_memory_mirror() {
        let repo = seeded().await;
        let filter = ItemFilter::all()
            .with_search("DOVE")
            .with_quantity(6, QuantityComparator::Gte);

        let items = repo.get_filtered_by(&filter).await.unwrap();
        assert_eq!(names(&items), ["Soap"]);

        let expected: Vec<_> = repo
            .get_filtered(None, None, None, None)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect();
        assert_eq!(items, expected);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = repo().await;
        repo.create(&NewItem::new("Tape 50%", "", "", 1))
            .await
            .unwrap();
        repo.create(&NewItem::new("Tape 500", "", "", 1))
            .await
            .unwrap();

        let items = repo
            .get_filtered_by(&ItemFilter::all().with_search("50%"))
            .await
            .unwrap();
        assert_eq!(names(&items), ["Tape 50%"]);
    }

    #[tokio::test]
    async fn test_name_order_is_case_sensitive_with_id_tie_break() {
        let repo = repo().await;
        for (name, brand) in [("banana", "A"), ("apple", "A"), ("Apple", "B"), ("Cherry", "A")] {
            repo.create(&NewItem::new(name, brand, "Fruit", 1))
                .await
                .unwrap();
        }

        let items = repo.get_filtered(None, None, None, None).await.unwrap();
        assert_eq!(names(&items), ["Apple", "Cherry", "apple", "banana"]);
    }

    #[tokio::test]
    async fn test_list_distinct_categories() {
        let repo = repo().await;
        for (name, category) in [("Soap", "Hygiene"), ("Shampoo", "Hygiene"), ("Rice", "Food")] {
            repo.create(&NewItem::new(name, "", category, 1))
                .await
                .unwrap();
        }

        let categories: HashSet<String> =
            repo.list_distinct_categories().await.unwrap().into_iter().collect();
        assert_eq!(
            categories,
            HashSet::from(["Hygiene".to_string(), "Food".to_string()])
        );

        // No brand was ever set
        assert!(repo.list_distinct_brands().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_distinct_brands_sorted() {
        let repo = seeded().await;
        assert_eq!(
            repo.list_distinct_brands().await.unwrap(),
            ["Camil", "Colgate", "Dove", "Tio Joao"]
        );
    }

    #[tokio::test]
    async fn test_find_by_label() {
        let repo = seeded().await;

        assert_eq!(names(&repo.find_by_brand("Dove").await.unwrap()), ["Shampoo", "Soap"]);
        assert_eq!(names(&repo.find_by_category(" Food ").await.unwrap()), ["Beans", "Rice"]);
        assert!(repo.find_by_name("soap").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_null_columns_read_as_empty() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO inventory (name, brand, category, quantity) VALUES ('Old', NULL, NULL, NULL)")
            .execute(&db.pool().await.unwrap())
            .await
            .unwrap();

        let repo = db.inventory();
        let all = repo.get_all().await.unwrap();
        assert_eq!(all[0].fields(), NewItem::new("Old", "", "", 0));
        assert!(repo.list_distinct_categories().await.unwrap().is_empty());

        // A blank-label create collides with the NULL-label row
        let outcome = repo.create(&NewItem::new("old", "", "", 3)).await.unwrap();
        assert_eq!(outcome.existing().map(|i| i.id), Some(all[0].id));

        let item = repo.adjust_quantity(all[0].id, 2).await.unwrap();
        assert_eq!(item.quantity, 2);
    }

    #[tokio::test]
    async fn test_legacy_padded_labels_are_duplicates() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO inventory (name, brand, category, quantity) VALUES (' Soap', 'Dove ', ' Hygiene ', 4)")
            .execute(&db.pool().await.unwrap())
            .await
            .unwrap();

        let repo = db.inventory();
        let legacy = repo.get_all().await.unwrap().remove(0);

        let outcome = repo
            .create(&NewItem::new("soap", "DOVE", "Hygiene", 1))
            .await
            .unwrap();
        assert_eq!(outcome.existing().map(|i| i.id), Some(legacy.id));

        let merged = repo
            .create_or_merge(&NewItem::new("Soap", "Dove", "Hygiene", 6))
            .await
            .unwrap();
        assert!(merged.merged);
        assert_eq!(merged.item.id, legacy.id);
        assert_eq!(merged.item.quantity, 10);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    // -------------------------------------------------------------------------
    // storage lifecycle
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_operations_open_on_demand() {
        let db = Database::new(DbConfig::in_memory());
        let repo = db.inventory();

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(db.is_open().await);
    }

    #[tokio::test]
    async fn test_data_persists_across_close_and_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");

        let db = Database::new(DbConfig::new(&path));
        db.inventory()
            .create(&NewItem::new("Soap", "Dove", "Hygiene", 10))
            .await
            .unwrap();
        db.close().await;

        // Re-opens on demand
        assert_eq!(db.inventory().count().await.unwrap(), 1);
        db.close().await;

        let other = Database::connect(DbConfig::new(&path)).await.unwrap();
        let all = other.inventory().get_all().await.unwrap();
        assert_eq!(all[0].fields(), NewItem::new("Soap", "Dove", "Hygiene", 10));
        other.close().await;
    }

    #[tokio::test]
    async fn test_unavailable_storage_fails_every_operation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let repo = Database::new(DbConfig::new(blocker.join("inventory.db"))).inventory();

        assert!(repo
            .create(&NewItem::new("Soap", "", "", 1))
            .await
            .unwrap_err()
            .is_storage_unavailable());
        assert!(repo.get_all().await.unwrap_err().is_storage_unavailable());
        assert!(repo
            .list_distinct_brands()
            .await
            .unwrap_err()
            .is_storage_unavailable());
    }
}
