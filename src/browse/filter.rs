use crate::client::Publication;

/// Narrow the already-loaded page to the publications matching `query`.
///
/// The match is a case-insensitive substring test over title, abstract,
/// authors and keywords. Each match is paired with its index in `items`.
/// Order is preserved and an empty query returns the page unchanged. Only the
/// given items are considered; this never reaches out to the backend for more
/// results.
pub fn filter_page<'a>(items: &'a [Publication], query: &str) -> Vec<(usize, &'a Publication)> {
    if query.is_empty() {
        return items.iter().enumerate().collect();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, p)| p.matches(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(id: &str, title: &str, keywords: &[&str]) -> Publication {
        Publication {
            id: id.to_string(),
            title: title.to_string(),
            abstract_text: format!("Abstract for {title}"),
            authors: vec!["Ada Lovelace".to_string()],
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            urls: Vec::new(),
            year: 2020,
            doi: None,
        }
    }

    fn sample() -> Vec<Publication> {
        vec![
            publication("1", "Rodent bone loss", &["microgravity", "bone"]),
            publication("2", "Plant roots in orbit", &["plant-biology"]),
            publication("3", "Cosmic radiation and DNA", &["radiation"]),
            publication("4", "Microgravity and muscle", &[]),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let items = sample();
        let visible = filter_page(&items, "");
        assert_eq!(visible.len(), items.len());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let items = sample();
        let ids: Vec<&str> = filter_page(&items, "MICROGRAVITY")
            .iter()
            .map(|(_, p)| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_filter_matches_authors() {
        let items = sample();
        assert_eq!(filter_page(&items, "lovelace").len(), 4);
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let items = sample();
        let once: Vec<Publication> = filter_page(&items, "ro")
            .into_iter()
            .map(|(_, p)| p.clone())
            .collect();
        let twice: Vec<Publication> = filter_page(&once, "ro")
            .into_iter()
            .map(|(_, p)| p.clone())
            .collect();
        assert_eq!(once, twice);

        let positions: Vec<usize> = filter_page(&items, "ro").iter().map(|(i, _)| *i).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_duplicate_ids_keep_their_own_index() {
        let items = vec![
            publication("dup", "Bone loss, first flight", &[]),
            publication("dup", "Bone loss, second flight", &[]),
        ];
        let positions: Vec<usize> = filter_page(&items, "second").iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, vec![1]);
    }

    #[test]
    fn test_no_tokenization() {
        let items = sample();
        // Both words appear in item 1, but not as one contiguous substring
        assert!(filter_page(&items, "bone rodent").is_empty());
    }
}
