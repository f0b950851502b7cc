//! # Filtered Query Builder
//!
//! Turns an [`ItemFilter`] into a parameterized SELECT.
//!
//! ## Shape
//! ```text
//! SELECT id, name, brand, category, quantity FROM inventory WHERE 1=1
//!     [AND category = ?]
//!     [AND brand = ?]
//!     [AND COALESCE(quantity, 0) <op> ?]        <op> ∈ { =, >=, <=, > }
//!     [AND (name LIKE ? ESCAPE '\' OR brand LIKE ? ESCAPE '\' OR category LIKE ? ESCAPE '\')]
//! ORDER BY name ASC, id ASC
//! ```
//!
//! Every value is bound, never spliced into the SQL text. The comparator
//! operator is the only dynamic SQL fragment and comes from a closed enum.

use sqlx::{QueryBuilder, Sqlite};
use stockroom_core::ItemFilter;

/// Column list shared by every inventory read.
pub const SELECT_COLUMNS: &str = "id, name, brand, category, quantity";

/// Builds the ordered, filtered inventory query.
///
/// The result owns its bind values, so it can outlive `filter`.
pub fn build_filtered_query(filter: &ItemFilter) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM inventory WHERE 1=1",
        SELECT_COLUMNS
    ));

    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category.clone());
    }

    if let Some(brand) = &filter.brand {
        qb.push(" AND brand = ");
        qb.push_bind(brand.clone());
    }

    if let Some(quantity) = &filter.quantity {
        qb.push(" AND COALESCE(quantity, 0) ");
        qb.push(quantity.comparator.sql_operator());
        qb.push(" ");
        qb.push_bind(quantity.value);
    }

    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        qb.push(" AND (name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR brand LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR category LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }

    qb.push(" ORDER BY name ASC, id ASC");
    qb
}

/// `%term%` with LIKE wildcards in `term` matched literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
