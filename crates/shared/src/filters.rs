//! Predicate combinators for the film stock list. A filter set narrows the
//! full set down to the stocks matching every active predicate; an empty
//! predicate matches everything.

use serde::{Deserialize, Serialize};

use crate::domain::{FilmProcess, FilmStock, FilmStockFilterMode, FilmType};

pub fn is_empty_or_contains<T: PartialEq>(values: &[T], value: &T) -> bool {
    values.is_empty() || values.contains(value)
}

pub fn apply_predicates<T: Clone>(items: &[T], predicates: &[&dyn Fn(&T) -> bool]) -> Vec<T> {
    items
        .iter()
        .filter(|item| predicates.iter().all(|predicate| predicate(item)))
        .cloned()
        .collect()
}

/// Distinct values of `transform` over `items`, sorted ascending.
pub fn map_distinct<T, U, F>(items: &[T], transform: F) -> Vec<U>
where
    U: Ord,
    F: Fn(&T) -> U,
{
    let mut values: Vec<U> = items.iter().map(transform).collect();
    values.sort();
    values.dedup();
    values
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmStockFilterSet {
    pub filter_mode: FilmStockFilterMode,
    pub manufacturers: Vec<String>,
    pub iso_values: Vec<i32>,
    pub types: Vec<FilmType>,
    pub processes: Vec<FilmProcess>,
}

impl FilmStockFilterSet {
    pub fn manufacturer_matches(&self, stock: &FilmStock) -> bool {
        is_empty_or_contains(&self.manufacturers, &stock.make)
    }

    pub fn iso_matches(&self, stock: &FilmStock) -> bool {
        is_empty_or_contains(&self.iso_values, &stock.iso)
    }

    pub fn type_matches(&self, stock: &FilmStock) -> bool {
        is_empty_or_contains(&self.types, &stock.film_type)
    }

    pub fn process_matches(&self, stock: &FilmStock) -> bool {
        is_empty_or_contains(&self.processes, &stock.process)
    }

    pub fn added_by_matches(&self, stock: &FilmStock) -> bool {
        match self.filter_mode {
            FilmStockFilterMode::All => true,
            FilmStockFilterMode::Preadded => stock.is_preadded,
            FilmStockFilterMode::UserAdded => !stock.is_preadded,
        }
    }

    pub fn matches(&self, stock: &FilmStock) -> bool {
        self.manufacturer_matches(stock)
            && self.type_matches(stock)
            && self.process_matches(stock)
            && self.iso_matches(stock)
            && self.added_by_matches(stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(make: &str, iso: i32, preadded: bool) -> FilmStock {
        FilmStock {
            make: make.into(),
            model: "Test".into(),
            iso,
            is_preadded: preadded,
            ..FilmStock::default()
        }
    }

    #[test]
    fn empty_filter_set_matches_everything() {
        let set = FilmStockFilterSet::default();
        assert!(set.matches(&stock("Kodak", 400, true)));
        assert!(set.matches(&stock("Ilford", 125, false)));
    }

    #[test]
    fn predicates_compose_as_conjunction() {
        let set = FilmStockFilterSet {
            manufacturers: vec!["Kodak".into()],
            iso_values: vec![400],
            ..FilmStockFilterSet::default()
        };
        assert!(set.matches(&stock("Kodak", 400, true)));
        assert!(!set.matches(&stock("Kodak", 100, true)));
        assert!(!set.matches(&stock("Ilford", 400, true)));
    }

    #[test]
    fn added_by_mode_splits_preadded_from_user_added() {
        let preadded_only = FilmStockFilterSet {
            filter_mode: FilmStockFilterMode::Preadded,
            ..FilmStockFilterSet::default()
        };
        assert!(preadded_only.matches(&stock("Kodak", 400, true)));
        assert!(!preadded_only.matches(&stock("Kodak", 400, false)));
    }

    #[test]
    fn map_distinct_sorts_and_dedups() {
        let stocks = [
            stock("Kodak", 400, true),
            stock("Ilford", 125, true),
            stock("Fuji", 400, false),
        ];
        assert_eq!(map_distinct(&stocks, |s| s.iso), vec![125, 400]);
    }
}
