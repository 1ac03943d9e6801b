use std::fmt;

/// Table holding all memos
pub const MEMOS_TABLE: &str = "memos";

/// An id no row can have. `delete` with `Neq(Id, NIL_ID)` removes every row.
pub const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Columns of the `memos` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Title,
    Content,
    Category,
    Tags,
    CreatedAt,
    UpdatedAt,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Content => "content",
            Column::Category => "category",
            Column::Tags => "tags",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row predicate understood by every store
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals the value
    Eq(Column, String),
    /// Column differs from the value
    Neq(Column, String),
    /// At least one of the columns contains `needle`, ignoring case
    AnyContains { columns: Vec<Column>, needle: String },
}

impl Filter {
    pub fn eq(column: Column, value: impl Into<String>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn neq(column: Column, value: impl Into<String>) -> Self {
        Filter::Neq(column, value.into())
    }

    pub fn any_contains(columns: &[Column], needle: impl Into<String>) -> Self {
        Filter::AnyContains {
            columns: columns.to_vec(),
            needle: needle.into(),
        }
    }

    /// Matches every row
    pub fn everything() -> Self {
        Filter::neq(Column::Id, NIL_ID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub column: Column,
    pub ascending: bool,
}

/// Filters (all must hold) plus an optional ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: Column, ascending: bool) -> Self {
        self.order = Some(Order { column, ascending });
        self
    }

    /// Most recently created first
    pub fn newest_first(self) -> Self {
        self.order_by(Column::CreatedAt, false)
    }
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter(Filter::eq(Column::Category, "work"))
            .newest_first();

        assert_eq!(
            query.filters,
            vec![Filter::Eq(Column::Category, "work".to_string())]
        );
        assert_eq!(
            query.order,
            Some(Order {
                column: Column::CreatedAt,
                ascending: false
            })
        );
    }

    #[test]
    fn test_everything_filter_uses_nil_id() {
        assert_eq!(
            Filter::everything(),
            Filter::Neq(Column::Id, NIL_ID.to_string())
        );
        assert_eq!(Column::CreatedAt.to_string(), "created_at");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("plain"), "plain");
    }
}
