//! Query model for paginated list screens: page/search/sort/filter selection plus the
//! static configuration tables (sort options, tabs, page sizes) that constrain it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::QueryError, protocol::ListRequest};

/// Tab value that stands for "no filter".
pub const ALL_TAB: &str = "all";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_wire(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            other => Err(QueryError::InvalidSortKey {
                key: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub label: String,
    pub key: String,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(label: impl Into<String>, key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            direction,
        }
    }

    /// Select-field value in `field|direction` form, e.g. `last_login|desc`.
    pub fn value(&self) -> String {
        format!("{}|{}", self.key, self.direction.as_wire())
    }
}

/// Splits a `field|direction` select value. Does not check the field against any table.
pub fn parse_sort_value(value: &str) -> Result<(String, SortDirection), QueryError> {
    let invalid = || QueryError::InvalidSortKey {
        key: value.to_string(),
    };
    let (key, direction) = value.split_once('|').ok_or_else(invalid)?;
    if key.is_empty() {
        return Err(invalid());
    }
    let direction = direction.parse().map_err(|_| invalid())?;
    Ok((key.to_string(), direction))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabOption {
    pub label: String,
    pub value: String,
}

impl TabOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Filter tag carried by a tab value; the `all` tab clears filtering.
pub fn filter_tag_for_tab(value: &str) -> Option<String> {
    if value == ALL_TAB {
        None
    } else {
        Some(value.to_string())
    }
}

/// Immutable per-screen configuration handed to a controller at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    sort_options: Vec<SortOption>,
    tabs: Vec<TabOption>,
    page_size_options: Vec<usize>,
    default_page_size: usize,
}

impl ListConfig {
    /// The first sort option becomes the initial sort.
    pub fn new(sort_options: Vec<SortOption>, tabs: Vec<TabOption>) -> Self {
        Self {
            sort_options,
            tabs,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    pub fn affiliates() -> Self {
        Self::new(
            vec![
                SortOption::new("Last Login (newest)", "last_login", SortDirection::Descending),
                SortOption::new("Last Login (oldest)", "last_login", SortDirection::Ascending),
                SortOption::new("Role (lowest)", "role", SortDirection::Descending),
                SortOption::new("Role (highest)", "role", SortDirection::Ascending),
            ],
            vec![TabOption::new("All", ALL_TAB)],
        )
    }

    pub fn users() -> Self {
        Self::new(
            vec![
                SortOption::new("Last Login (newest)", "last_login", SortDirection::Descending),
                SortOption::new("Last Login (oldest)", "last_login", SortDirection::Ascending),
                SortOption::new("Name (A-Z)", "name", SortDirection::Ascending),
                SortOption::new("Name (Z-A)", "name", SortDirection::Descending),
            ],
            vec![TabOption::new("All", ALL_TAB)],
        )
    }

    pub fn sort_options(&self) -> &[SortOption] {
        &self.sort_options
    }

    pub fn tabs(&self) -> &[TabOption] {
        &self.tabs
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn allows_sort_key(&self, key: &str) -> bool {
        self.sort_options.iter().any(|option| option.key == key)
    }
}

/// Everything that determines which page of which result set is requested.
///
/// Changing the search text, sort or filter moves back to the first page since the
/// old offset points into a different result set. A page-size change also resets to
/// the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    page_index: usize,
    page_size: usize,
    search_text: String,
    sort_key: String,
    sort_direction: SortDirection,
    filter_tag: Option<String>,
}

impl QueryState {
    pub fn new(config: &ListConfig) -> Self {
        let (sort_key, sort_direction) = config
            .sort_options()
            .first()
            .map(|option| (option.key.clone(), option.direction))
            .unwrap_or_else(|| (String::new(), SortDirection::Descending));
        Self {
            page_index: 0,
            page_size: config.default_page_size(),
            search_text: String::new(),
            sort_key,
            sort_direction,
            filter_tag: None,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn filter_tag(&self) -> Option<&str> {
        self.filter_tag.as_deref()
    }

    pub fn sort_value(&self) -> String {
        format!("{}|{}", self.sort_key, self.sort_direction.as_wire())
    }

    /// Stored verbatim; trimming and case folding are left to the server.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page_index = 0;
    }

    pub fn set_sort(
        &mut self,
        config: &ListConfig,
        key: &str,
        direction: SortDirection,
    ) -> Result<(), QueryError> {
        if !config.allows_sort_key(key) {
            return Err(QueryError::InvalidSortKey {
                key: key.to_string(),
            });
        }
        self.sort_key = key.to_string();
        self.sort_direction = direction;
        self.page_index = 0;
        Ok(())
    }

    pub fn set_filter_tag(&mut self, tag: Option<String>) {
        self.filter_tag = tag;
        self.page_index = 0;
    }

    /// No upper bound: past the end the server answers with an empty page.
    pub fn set_page_index(&mut self, index: i64) -> Result<(), QueryError> {
        let index = usize::try_from(index).map_err(|_| QueryError::OutOfRange { index })?;
        self.page_index = index;
        Ok(())
    }

    pub fn set_page_size(&mut self, size: i64) -> Result<(), QueryError> {
        let size = match usize::try_from(size) {
            Ok(size) if size > 0 => size,
            _ => return Err(QueryError::InvalidPageSize { size }),
        };
        self.page_size = size;
        self.page_index = 0;
        Ok(())
    }

    /// Offset of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size as u64)
    }

    pub fn has_next_page(&self, total_count: u64) -> bool {
        (self.page_index as u64 + 1).saturating_mul(self.page_size as u64) < total_count
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Wire request for the current state; pages are 1-based on the wire.
    pub fn to_request(&self) -> ListRequest {
        ListRequest {
            page: self.page_index as u64 + 1,
            per_page: self.page_size as u64,
            search: self.search_text.clone(),
            sort: self.sort_key.clone(),
            criteria: self.sort_direction,
            filter_tag: self.filter_tag.clone(),
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page={} per_page={} search={:?} sort={}",
            self.page_index + 1,
            self.page_size,
            self.search_text,
            self.sort_value()
        )?;
        if let Some(tag) = &self.filter_tag {
            write!(f, " filter={tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(config: &ListConfig, index: i64) -> QueryState {
        let mut query = QueryState::new(config);
        query.set_page_index(index).expect("page index");
        query
    }

    #[test]
    fn starts_on_first_sort_option_and_default_page_size() {
        let query = QueryState::new(&ListConfig::affiliates());
        assert_eq!(query.page_index(), 0);
        assert_eq!(query.page_size(), 10);
        assert_eq!(query.sort_value(), "last_login|desc");
        assert_eq!(query.search_text(), "");
        assert_eq!(query.filter_tag(), None);
    }

    #[test]
    fn search_sort_and_filter_changes_return_to_first_page() {
        let config = ListConfig::affiliates();

        let mut query = paged(&config, 4);
        query.set_search_text("  Mixed Case ");
        assert_eq!(query.page_index(), 0);
        assert_eq!(query.search_text(), "  Mixed Case ");

        let mut query = paged(&config, 4);
        query
            .set_sort(&config, "role", SortDirection::Ascending)
            .expect("sort");
        assert_eq!(query.page_index(), 0);
        assert_eq!(query.sort_value(), "role|asc");

        let mut query = paged(&config, 4);
        query.set_filter_tag(Some("isProspect".into()));
        assert_eq!(query.page_index(), 0);

        let mut query = paged(&config, 4);
        query.set_filter_tag(None);
        assert_eq!(query.page_index(), 0);
    }

    #[test]
    fn unknown_sort_key_is_rejected_without_changes() {
        let config = ListConfig::affiliates();
        let before = paged(&config, 3);
        let mut query = before.clone();

        let err = query
            .set_sort(&config, "balance", SortDirection::Ascending)
            .expect_err("must reject");
        assert_eq!(
            err,
            QueryError::InvalidSortKey {
                key: "balance".into()
            }
        );
        assert_eq!(query, before);
    }

    #[test]
    fn negative_page_index_is_out_of_range() {
        let config = ListConfig::affiliates();
        let mut query = paged(&config, 2);
        let err = query.set_page_index(-1).expect_err("must reject");
        assert_eq!(err, QueryError::OutOfRange { index: -1 });
        assert_eq!(query.page_index(), 2);

        query.set_page_index(10_000).expect("no upper bound");
        assert_eq!(query.page_index(), 10_000);
    }

    #[test]
    fn page_size_must_be_positive_and_resets_page() {
        let config = ListConfig::affiliates();
        let mut query = paged(&config, 3);

        for size in [0, -5] {
            let err = query.set_page_size(size).expect_err("must reject");
            assert_eq!(err, QueryError::InvalidPageSize { size });
        }
        assert_eq!(query.page_size(), 10);
        assert_eq!(query.page_index(), 3);

        query.set_page_size(25).expect("page size");
        assert_eq!(query.page_size(), 25);
        assert_eq!(query.page_index(), 0);
    }

    #[test]
    fn request_uses_one_based_pages() {
        let config = ListConfig::affiliates();
        let mut query = QueryState::new(&config);
        query.set_search_text("bob");
        query.set_page_index(2).expect("page");

        let request = query.to_request();
        assert_eq!(request.page, 3);
        assert_eq!(request.per_page, 10);
        assert_eq!(request.search, "bob");
        assert_eq!(request.sort, "last_login");
        assert_eq!(request.criteria, SortDirection::Descending);
    }

    #[test]
    fn page_navigation_bounds_follow_total_count() {
        let config = ListConfig::affiliates();
        let mut query = QueryState::new(&config);
        assert_eq!(query.page_count(23), 3);
        assert_eq!(query.page_count(0), 0);
        assert!(query.has_next_page(23));
        assert!(!query.has_previous_page());

        query.set_page_index(2).expect("page");
        assert!(!query.has_next_page(23));
        assert!(query.has_previous_page());
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn sort_values_parse_and_render() {
        assert_eq!(
            parse_sort_value("role|asc").expect("parse"),
            ("role".to_string(), SortDirection::Ascending)
        );
        assert!(parse_sort_value("role").is_err());
        assert!(parse_sort_value("role|sideways").is_err());
        assert!(parse_sort_value("|asc").is_err());

        let config = ListConfig::affiliates();
        let option = &config.sort_options()[2];
        assert_eq!(option.value(), "role|desc");
        assert_eq!(option.label, "Role (lowest)");
    }

    #[test]
    fn all_tab_clears_filtering() {
        assert_eq!(filter_tag_for_tab(ALL_TAB), None);
        assert_eq!(
            filter_tag_for_tab("isReturning"),
            Some("isReturning".to_string())
        );
    }
}
