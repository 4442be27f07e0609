use regex::RegexBuilder;
use serde::Deserialize;

use crate::storage::Filter;

/// Параметры постраничного чтения: `?limit=&offset=&search=`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
}

impl PageQuery {
    /// `search` трактуется как регулярное выражение без учета регистра
    pub fn to_filter(&self) -> Result<Filter, regex::Error> {
        let defaults = Filter::default();
        let search = match self.search.as_deref().map(str::trim) {
            Some(pattern) if !pattern.is_empty() => {
                Some(RegexBuilder::new(pattern).case_insensitive(true).build()?)
            }
            _ => None,
        };

        Ok(Filter {
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
            search,
        })
    }
}
