use super::error::QueryError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::include::{parse_fields, parse_include};
use super::page::parse_page;
use super::params::QueryParams;
use super::types::{PageDefaults, ParsedQuery};

/// Decomposes the five JSON:API query namespaces into a `ParsedQuery`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser {
    page_defaults: PageDefaults,
}

impl QueryParser {
    pub fn new(page_defaults: PageDefaults) -> Self {
        Self { page_defaults }
    }

    pub fn parse(&self, params: &QueryParams) -> Result<ParsedQuery, QueryError> {
        let filter = FilterWhere::parse(&params.filters())?;
        let sort = params.first("sort").map(FilterOrder::parse).unwrap_or_default();
        let page = parse_page(
            params.member("page", "offset"),
            params.member("page", "limit"),
            self.page_defaults,
        );
        let include = params.first("include").map(parse_include).unwrap_or_default();
        let fields = parse_fields(params.members("fields"));

        Ok(ParsedQuery { filter, sort, page, include, fields })
    }

    pub fn parse_str(&self, raw: &str) -> Result<ParsedQuery, QueryError> {
        self.parse(&QueryParams::parse(raw))
    }
}
