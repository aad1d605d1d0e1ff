use super::error::FilterError;
use super::types::PresentFilter;

/// Renders a [`PresentFilter`] into a parameterized WHERE clause.
pub struct FilterWhere {
    param_values: Vec<String>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(filter: &PresentFilter, starting_param_index: usize) -> Result<(String, Vec<String>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let clause = filter_where.build(filter)?;
        Ok((clause, filter_where.param_values))
    }

    fn build(&mut self, filter: &PresentFilter) -> Result<String, FilterError> {
        match filter {
            PresentFilter::Wishlist { wishlist_id } => {
                Ok(format!("\"wishlist_id\" = {}", self.param(wishlist_id.clone())))
            }
            PresentFilter::Unreserved { wishlist_id } => Ok(format!(
                "\"wishlist_id\" = {} AND \"is_reserved\" = FALSE",
                self.param(wishlist_id.clone())
            )),
            PresentFilter::ReservedBy { user_id } => Ok(format!(
                "\"is_reserved\" = TRUE AND \"reserver_id\" = {}",
                self.param(user_id.clone())
            )),
            PresentFilter::Keyword { keyword } => {
                if keyword.is_empty() {
                    return Err(FilterError::EmptyKeyword);
                }
                // One placeholder serves both columns
                let p = self.param(Self::like_pattern(keyword));
                Ok(format!(
                    "(\"name\" ILIKE {p} ESCAPE '\\' OR \"description\" ILIKE {p} ESCAPE '\\')"
                ))
            }
        }
    }

    /// Wraps a keyword in `%...%` with LIKE metacharacters escaped, so the
    /// keyword only ever matches as a literal substring.
    pub fn like_pattern(keyword: &str) -> String {
        let mut pattern = String::with_capacity(keyword.len() + 2);
        pattern.push('%');
        for c in keyword.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    fn param(&mut self, value: String) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
