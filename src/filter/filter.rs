use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{PresentFilter, SqlResult};

/// Column list shared by every present SELECT
pub const PRESENT_COLUMNS: &str =
    "\"id\", \"name\", \"description\", \"wishlist_id\", \"reserver_id\", \"is_reserved\"";

/// Insertion order, with id as the tie breaker
const ORDER_COLUMNS: [&str; 2] = ["created_at", "id"];

pub struct Filter {
    table_name: String,
    matching: Option<PresentFilter>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            matching: None,
            limit: None,
        })
    }

    pub fn matching(&mut self, filter: PresentFilter) -> &mut Self {
        self.matching = Some(filter);
        self
    }

    pub fn limit(&mut self, limit: i64) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = match &self.matching {
            Some(filter) => FilterWhere::generate(filter, 0)?,
            None => (String::new(), vec![]),
        };

        let query = [
            format!("SELECT {}", PRESENT_COLUMNS),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            self.build_order_clause(),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = chars.next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false);
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {:?}", name)));
        }
        Ok(())
    }

    fn build_order_clause(&self) -> String {
        let parts: Vec<String> = ORDER_COLUMNS.iter().map(|column| format!("\"{}\" ASC", column)).collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    fn build_limit_clause(&self) -> String {
        match self.limit {
            Some(l) => format!("LIMIT {}", l),
            None => String::new(),
        }
    }
}
