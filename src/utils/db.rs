use anyhow::anyhow;
use sqlx::PgPool;
use sqlx::postgres::PgRow;

use scolaris_core::{AppError, PaginationMeta, PaginationParams};

/// Maps constraint violations of an INSERT/UPDATE to client errors.
///
/// Unique violations become 409 with `unique_msg`, foreign key violations
/// become 400 with `fk_msg`. Anything else is a 500.
pub fn map_write_error(e: sqlx::Error, unique_msg: &str, fk_msg: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!(unique_msg.to_string()));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(fk_msg.to_string()));
        }
    }
    AppError::from(e)
}

/// Dynamic WHERE clause with numbered placeholders.
///
/// Every value is bound as text; templates cast it where the column is not
/// text (`room_id = ${}::uuid`). `{}` in a template is replaced by the
/// placeholder number of the value.
#[derive(Debug, Default)]
pub struct SqlFilters {
    conditions: Vec<String>,
    params: Vec<String>,
}

impl SqlFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, template: &str, value: impl ToString) -> &mut Self {
        self.params.push(value.to_string());
        let placeholder = self.params.len().to_string();
        self.conditions.push(template.replace("{}", &placeholder));
        self
    }

    /// Pushes a case-insensitive substring match.
    pub fn push_ilike(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(&format!("{} ILIKE ${{}}", column), format!("%{}%", value))
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Counts the filtered rows of `from`, then fetches one page of them.
///
/// `from` is everything between `SELECT` columns and `WHERE`, joins included.
pub async fn fetch_page<T>(
    db: &PgPool,
    columns: &str,
    from: &str,
    filters: &SqlFilters,
    order_by: &str,
    pagination: &PaginationParams,
) -> Result<(Vec<T>, PaginationMeta), AppError>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let where_clause = filters.clause();

    let count_query = format!("SELECT COUNT(*) FROM {}{}", from, where_clause);
    let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
    for param in filters.params() {
        count_sql = count_sql.bind(param);
    }
    let total = count_sql.fetch_one(db).await?;

    let data_query = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        columns,
        from,
        where_clause,
        order_by,
        pagination.limit(),
        pagination.offset()
    );
    let mut data_sql = sqlx::query_as::<_, T>(&data_query);
    for param in filters.params() {
        data_sql = data_sql.bind(param);
    }
    let rows = data_sql.fetch_all(db).await?;

    Ok((rows, PaginationMeta::from_params(total, pagination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_have_no_clause() {
        let filters = SqlFilters::new();
        assert!(filters.is_empty());
        assert_eq!(filters.clause(), "");
    }

    #[test]
    fn test_placeholders_follow_push_order() {
        let room_id = uuid::Uuid::nil();
        let mut filters = SqlFilters::new();
        filters
            .push("room_id = ${}::uuid", room_id)
            .push("capacity >= ${}::int", 30)
            .push_ilike("facility", "projector");

        assert_eq!(
            filters.clause(),
            " WHERE room_id = $1::uuid AND capacity >= $2::int AND facility ILIKE $3"
        );
        assert_eq!(
            filters.params(),
            &[room_id.to_string(), "30".to_string(), "%projector%".to_string()]
        );
    }

    #[test]
    fn test_placeholder_can_repeat_in_one_condition() {
        let mut filters = SqlFilters::new();
        filters.push("(first_name ILIKE ${} OR email ILIKE ${})", "%sa%");
        assert_eq!(
            filters.clause(),
            " WHERE (first_name ILIKE $1 OR email ILIKE $1)"
        );
    }
}
