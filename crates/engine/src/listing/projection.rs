use atlas_types::{CountryEntity, ListParameters};
use atlas_util::contains_case_insensitive;
use serde::Serialize;

/// One element of the pagination control strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageControl {
    Page(usize),
    Ellipsis,
}

/// Entities passing the region filter whose common name contains the query,
/// ignoring case. The query is matched as given, whitespace included. Input
/// order is preserved.
pub fn filter<'a>(entities: &'a [CountryEntity], parameters: &ListParameters) -> Vec<&'a CountryEntity> {
    entities
        .iter()
        .filter(|entity| parameters.region.admits(&entity.region))
        .filter(|entity| contains_case_insensitive(&entity.name.common, &parameters.query))
        .collect()
}

/// Number of pages needed for `len` items; never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// First page, last page and the pages adjacent to `current`. Any run of
/// hidden pages collapses into one ellipsis, even a single page.
pub fn pagination_window(current: usize, total: usize) -> Vec<PageControl> {
    let total = total.max(1);
    let current = clamp_page(current, total);
    let mut pages = vec![1, current.saturating_sub(1).max(1), current, (current + 1).min(total), total];
    pages.sort_unstable();
    pages.dedup();

    let mut controls = Vec::with_capacity(pages.len() + 2);
    let mut previous = 0;
    for page in pages {
        match page - previous {
            1 => {}
            _ => controls.push(PageControl::Ellipsis),
        }
        controls.push(PageControl::Page(page));
        previous = page;
    }
    controls
}

/// The visible page of the list for a parameter set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjection<'a> {
    /// Parameters the projection was computed for.
    pub parameters: ListParameters,
    pub items: Vec<&'a CountryEntity>,
    pub filtered_len: usize,
    pub total_pages: usize,
    /// Page actually shown, clamped into `[1, total_pages]`.
    pub page: usize,
    pub requested_page: usize,
    pub page_size: usize,
    pub controls: Vec<PageControl>,
}

impl ListProjection<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether the requested page was out of range and had to be clamped.
    pub fn needs_reconcile(&self) -> bool {
        self.page != self.requested_page
    }
}

pub fn project<'a>(entities: &'a [CountryEntity], parameters: &ListParameters) -> ListProjection<'a> {
    let filtered = filter(entities, parameters);
    let page_size = parameters.page_size.max(1);
    let filtered_len = filtered.len();
    let total_pages = total_pages(filtered_len, page_size);
    let page = clamp_page(parameters.page, total_pages);
    let items = filtered.into_iter().skip((page - 1) * page_size).take(page_size).collect();

    ListProjection {
        parameters: parameters.clone(),
        items,
        filtered_len,
        total_pages,
        page,
        requested_page: parameters.page,
        page_size,
        controls: pagination_window(page, total_pages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_types::Region;
    use serde_json::json;

    fn entity(common: &str, region: &str) -> CountryEntity {
        serde_json::from_value(json!({ "cca2": "XX", "cca3": "XXX", "name": { "common": common }, "region": region }))
            .expect("entity")
    }

    fn sample() -> Vec<CountryEntity> {
        vec![
            entity("Austria", "Europe"),
            entity("France", "Europe"),
            entity("French Polynesia", "Oceania"),
            entity("Germany", "Europe"),
            entity("San Francisco Island", "Americas"),
        ]
    }

    fn parameters(query: &str, region: Region, page: usize, page_size: usize) -> ListParameters {
        ListParameters {
            query: query.into(),
            region,
            page,
            page_size,
        }
    }

    #[test]
    fn filter_matches_region_and_case_insensitive_substring() {
        let entities = sample();
        let names: Vec<_> = filter(&entities, &parameters("FRA", Region::All, 1, 20))
            .into_iter()
            .map(|entity| entity.name.common.as_str())
            .collect();
        assert_eq!(names, vec!["France", "San Francisco Island"]);

        let europe = filter(&entities, &parameters("fr", Region::Europe, 1, 20));
        assert_eq!(europe.len(), 1);
    }

    #[test]
    fn filter_is_idempotent() {
        let entities = sample();
        let params = parameters("an", Region::Europe, 1, 20);
        let once: Vec<CountryEntity> = filter(&entities, &params).into_iter().cloned().collect();
        let twice: Vec<CountryEntity> = filter(&once, &params).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(250, 20), 13);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let entities = sample();
        let projection = project(&entities, &parameters("", Region::All, 9, 2));
        assert_eq!(projection.total_pages, 3);
        assert_eq!(projection.page, 3);
        assert_eq!(projection.requested_page, 9);
        assert!(projection.needs_reconcile());
        assert_eq!(projection.items.len(), 1);
        assert!(projection.has_previous());
        assert!(!projection.has_next());
    }

    #[test]
    fn empty_filter_result_shows_one_empty_page() {
        let entities = sample();
        let projection = project(&entities, &parameters("zzz", Region::All, 4, 20));
        assert_eq!(projection.filtered_len, 0);
        assert_eq!(projection.total_pages, 1);
        assert_eq!(projection.page, 1);
        assert!(projection.items.is_empty());
        assert_eq!(projection.controls, vec![PageControl::Page(1)]);
    }

    #[test]
    fn window_collapses_long_gaps() {
        use PageControl::{Ellipsis, Page};
        assert_eq!(pagination_window(1, 1), vec![Page(1)]);
        assert_eq!(pagination_window(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(pagination_window(7, 13), vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Ellipsis, Page(13)]);
        assert_eq!(pagination_window(3, 13), vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(13)]);
        assert_eq!(pagination_window(1, 13), vec![Page(1), Page(2), Ellipsis, Page(13)]);
    }

    #[test]
    fn single_hidden_page_becomes_an_ellipsis() {
        use PageControl::{Ellipsis, Page};
        assert_eq!(pagination_window(4, 7), vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Ellipsis, Page(7)]);
        assert_eq!(pagination_window(1, 4), vec![Page(1), Page(2), Ellipsis, Page(4)]);
        assert_eq!(pagination_window(4, 4), vec![Page(1), Ellipsis, Page(3), Page(4)]);
    }

    #[test]
    fn whitespace_in_the_query_is_significant() {
        let entities = vec![entity("France", "Europe"), entity("New Zealand", "Oceania")];
        assert!(filter(&entities, &parameters("   ", Region::All, 1, 20)).is_empty());

        let spaced: Vec<_> = filter(&entities, &parameters(" zealand", Region::All, 1, 20))
            .into_iter()
            .map(|entity| entity.name.common.as_str())
            .collect();
        assert_eq!(spaced, vec!["New Zealand"]);
        assert!(filter(&entities, &parameters("france ", Region::All, 1, 20)).is_empty());
    }
}
