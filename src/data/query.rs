use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::QueryError;
use super::model::Volcano;

/// Number of deadliest eruptions `top_death_agents` looks at by default.
pub const DEFAULT_TOP_AGENTS: usize = 10;

// ---------------------------------------------------------------------------
// VolcanoQuery – read-only statistics over a loaded record sequence
// ---------------------------------------------------------------------------

/// Owns the record sequence produced by the loader and answers queries
/// against it.  Nothing here mutates the records, so every query returns the
/// same answer for the same dataset.
#[derive(Debug, Clone, Default)]
pub struct VolcanoQuery {
    volcanoes: Vec<Volcano>,
}

impl VolcanoQuery {
    pub fn new(volcanoes: Vec<Volcano>) -> Self {
        debug!("query engine holds {} records", volcanoes.len());
        Self { volcanoes }
    }

    /// The records in source order.
    pub fn records(&self) -> &[Volcano] {
        &self.volcanoes
    }

    pub fn count(&self) -> usize {
        self.volcanoes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volcanoes.is_empty()
    }

    // -- Filters --

    /// Records that erupted in `[from, to)`, in source order.  Records
    /// without a year never match.
    pub fn erupted_between(&self, from: i32, to: i32) -> Vec<&Volcano> {
        self.volcanoes
            .iter()
            .filter(|v| matches!(v.year, Some(year) if year >= from && year < to))
            .collect()
    }

    /// Records from the ten years starting at `start`, e.g. `1980` for the eighties.
    pub fn erupted_in_decade(&self, start: i32) -> Vec<&Volcano> {
        self.erupted_between(start, start.saturating_add(10))
    }

    /// Names of eruptions with a VEI of at least `min`.
    pub fn filter_by_min_vei(&self, min: u8) -> Vec<&str> {
        self.names_where(|v| v.vei >= min)
    }

    /// Names of volcanoes at or above `threshold` meters.
    pub fn filter_by_min_elevation(&self, threshold: f64) -> Vec<&str> {
        self.names_where(|v| v.elevation >= threshold)
    }

    /// Names of southern-hemisphere VEI 5 eruptions after 1800 that caused
    /// no tsunami.
    pub fn complex_filter(&self) -> Vec<&str> {
        self.names_where(|v| {
            matches!(v.year, Some(year) if year > 1800)
                && !v.tsunami
                && v.latitude < 0.0
                && v.vei == 5
        })
    }

    /// Exact, case-sensitive match on the country field.
    pub fn count_by_country(&self, country: &str) -> usize {
        self.volcanoes.iter().filter(|v| v.country == country).count()
    }

    // -- Rankings --

    /// The eruption with the highest death toll (unknown counts as zero).
    /// Ties go to the record that comes first.
    pub fn most_deadly(&self) -> Option<&Volcano> {
        self.volcanoes.iter().reduce(|best, v| {
            if v.deaths_or_zero() > best.deaths_or_zero() {
                v
            } else {
                best
            }
        })
    }

    /// The volcano type with the most records.  Ties go to the type seen first.
    pub fn most_common_type(&self) -> Option<&str> {
        let mut order: Vec<(&str, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for v in &self.volcanoes {
            let slot = *index.entry(v.kind.as_str()).or_insert_with(|| {
                order.push((v.kind.as_str(), 0));
                order.len() - 1
            });
            order[slot].1 += 1;
        }

        order
            .into_iter()
            .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
            .map(|(kind, _)| kind)
    }

    /// Distinct volcano types in first-seen order.
    pub fn distinct_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.volcanoes
            .iter()
            .map(|v| v.kind.as_str())
            .filter(|kind| seen.insert(*kind))
            .collect()
    }

    /// Death agents of the `limit` deadliest eruptions, de-duplicated in
    /// first-seen order.  Equal death tolls keep their source order.
    pub fn top_death_agents(&self, limit: usize) -> Vec<&str> {
        let mut ranked: Vec<&Volcano> = self.volcanoes.iter().collect();
        // `sort_by_key` is stable.
        ranked.sort_by_key(|v| Reverse(v.deaths_or_zero()));

        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .take(limit)
            .flat_map(|v| v.agents.iter().map(String::as_str))
            .filter(|agent| seen.insert(*agent))
            .collect()
    }

    // -- Ratios --

    /// Percentage of eruptions that caused a tsunami, computed as
    /// `tsunamis * 100 / total` in integer arithmetic (truncating).
    pub fn tsunami_percentage(&self) -> Result<u64, QueryError> {
        let total = self.total("tsunami_percentage")? as u64;
        Ok(self.tsunami_count() as u64 * 100 / total)
    }

    /// Same ratio as [`Self::tsunami_percentage`] without truncation.
    pub fn tsunami_share(&self) -> Result<f64, QueryError> {
        let total = self.total("tsunami_share")?;
        Ok(self.tsunami_count() as f64 * 100.0 / total as f64)
    }

    pub fn average_elevation(&self) -> Result<f64, QueryError> {
        let total = self.total("average_elevation")?;
        let sum: f64 = self.volcanoes.iter().map(|v| v.elevation).sum();
        Ok(sum / total as f64)
    }

    /// Percentage of records with a strictly positive latitude.
    pub fn percent_in_northern_hemisphere(&self) -> Result<f64, QueryError> {
        let total = self.total("percent_in_northern_hemisphere")?;
        let north = self.volcanoes.iter().filter(|v| v.is_northern()).count();
        Ok(north as f64 * 100.0 / total as f64)
    }

    // -- Helpers --

    fn names_where(&self, predicate: impl Fn(&Volcano) -> bool) -> Vec<&str> {
        self.volcanoes
            .iter()
            .filter(|v| predicate(*v))
            .map(|v| v.name.as_str())
            .collect()
    }

    fn tsunami_count(&self) -> usize {
        self.volcanoes.iter().filter(|v| v.tsunami).count()
    }

    fn total(&self, operation: &'static str) -> Result<usize, QueryError> {
        match self.volcanoes.len() {
            0 => Err(QueryError::EmptyCollection { operation }),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn volcano(name: &str) -> Volcano {
        Volcano {
            name: name.to_string(),
            country: "Nowhere".to_string(),
            kind: "Stratovolcano".to_string(),
            year: Some(1900),
            latitude: 10.0,
            vei: 3,
            elevation: 1000.0,
            ..Default::default()
        }
    }

    fn with_deaths(name: &str, deaths: Option<u64>) -> Volcano {
        Volcano {
            deaths,
            ..volcano(name)
        }
    }

    fn with_kind(name: &str, kind: &str) -> Volcano {
        Volcano {
            kind: kind.to_string(),
            ..volcano(name)
        }
    }

    fn query(records: Vec<Volcano>) -> VolcanoQuery {
        VolcanoQuery::new(records)
    }

    fn names_of(records: Vec<&Volcano>) -> Vec<&str> {
        records.into_iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn count_matches_records() {
        let q = query(vec![volcano("a"), volcano("b"), volcano("c")]);
        assert_eq!(q.count(), 3);
        assert_eq!(q.records().len(), 3);
        assert!(!q.is_empty());
    }

    #[test]
    fn decade_is_half_open_and_ordered() {
        let years = [1979, 1980, 1985, 1989, 1990, 1982];
        let records = years
            .iter()
            .enumerate()
            .map(|(i, &year)| Volcano {
                year: Some(year),
                ..volcano(&format!("v{i}"))
            })
            .collect();
        let q = query(records);

        let names: Vec<&str> = q
            .erupted_in_decade(1980)
            .into_iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["v1", "v2", "v3", "v5"]);
        assert_eq!(q.erupted_between(1980, 1990).len(), 4);
        assert!(q.erupted_between(1990, 1980).is_empty());
    }

    #[test]
    fn undated_records_never_match_a_decade() {
        let q = query(vec![
            Volcano { year: None, ..volcano("undated") },
            Volcano { year: Some(0), ..volcano("year zero") },
        ]);
        assert_eq!(names_of(q.erupted_in_decade(0)), vec!["year zero"]);
        assert!(q.erupted_between(i32::MIN, i32::MAX).iter().all(|v| v.year.is_some()));
    }

    #[test]
    fn decade_near_i32_max_saturates() {
        let q = query(vec![
            Volcano { year: Some(i32::MAX - 1), ..volcano("late") },
            Volcano { year: Some(i32::MAX), ..volcano("last") },
        ]);
        assert_eq!(names_of(q.erupted_in_decade(i32::MAX - 3)), vec!["late"]);
        assert!(q.erupted_in_decade(i32::MAX).is_empty());
    }

    #[test]
    fn min_vei_keeps_source_order() {
        let q = query(vec![
            Volcano { vei: 6, ..volcano("Pinatubo") },
            Volcano { vei: 4, ..volcano("Hekla") },
            Volcano { vei: 7, ..volcano("Tambora") },
            Volcano { vei: 5, ..volcano("St. Helens") },
        ]);
        assert_eq!(q.filter_by_min_vei(6), vec!["Pinatubo", "Tambora"]);
        assert_eq!(q.filter_by_min_vei(0).len(), 4);
        assert!(q.filter_by_min_vei(8).is_empty());
    }

    #[test]
    fn most_deadly_treats_unknown_as_zero() {
        let q = query(vec![with_deaths("quiet", None), with_deaths("deadly", Some(100))]);
        assert_eq!(q.most_deadly().map(|v| v.name.as_str()), Some("deadly"));
    }

    #[test]
    fn most_deadly_tie_goes_to_first() {
        let q = query(vec![
            with_deaths("first", Some(50)),
            with_deaths("second", Some(50)),
            with_deaths("third", Some(10)),
        ]);
        assert_eq!(q.most_deadly().map(|v| v.name.as_str()), Some("first"));

        let unknown = query(vec![with_deaths("a", None), with_deaths("b", Some(0))]);
        assert_eq!(unknown.most_deadly().map(|v| v.name.as_str()), Some("a"));
    }

    #[test]
    fn tsunami_percentage_truncates() {
        let mut records = vec![volcano("a"), volcano("b"), volcano("c"), volcano("d")];
        records[2].tsunami = true;
        let q = query(records);
        assert_eq!(q.tsunami_percentage(), Ok(25));
        assert_eq!(q.tsunami_share(), Ok(25.0));

        // 1 of 3 is 33.33..%; the integer form drops the fraction.
        let q = query(vec![
            Volcano { tsunami: true, ..volcano("a") },
            volcano("b"),
            volcano("c"),
        ]);
        assert_eq!(q.tsunami_percentage(), Ok(33));
        let share = q.tsunami_share().unwrap();
        assert!((share - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn most_common_type_counts_occurrences() {
        let q = query(vec![
            with_kind("a", "Caldera"),
            with_kind("b", "Stratovolcano"),
            with_kind("c", "Stratovolcano"),
            with_kind("d", "Caldera"),
            with_kind("e", "Stratovolcano"),
        ]);
        assert_eq!(q.most_common_type(), Some("Stratovolcano"));
    }

    #[test]
    fn most_common_type_tie_goes_to_first_seen() {
        let q = query(vec![
            with_kind("a", "Shield volcano"),
            with_kind("b", "Caldera"),
            with_kind("c", "Caldera"),
            with_kind("d", "Shield volcano"),
        ]);
        assert_eq!(q.most_common_type(), Some("Shield volcano"));
    }

    #[test]
    fn country_match_is_exact() {
        let q = query(vec![
            Volcano { country: "Japan".into(), ..volcano("Unzen") },
            Volcano { country: "Japanese Empire".into(), ..volcano("Sakurajima") },
            Volcano { country: "japan".into(), ..volcano("Asama") },
            Volcano { country: "Japan".into(), ..volcano("Fuji") },
        ]);
        assert_eq!(q.count_by_country("Japan"), 2);
        assert_eq!(q.count_by_country("Iceland"), 0);
    }

    #[test]
    fn average_elevation_over_all_records() {
        let q = query(vec![
            Volcano { elevation: 1000.0, ..volcano("a") },
            Volcano { elevation: 3000.0, ..volcano("b") },
            Volcano { elevation: -100.0, ..volcano("c") },
        ]);
        assert_eq!(q.average_elevation(), Ok(1300.0));
    }

    #[test]
    fn distinct_types_first_seen_order() {
        let q = query(vec![
            with_kind("a", "Caldera"),
            with_kind("b", "Stratovolcano"),
            with_kind("c", "Caldera"),
            with_kind("d", "Complex volcano"),
        ]);
        assert_eq!(
            q.distinct_types(),
            vec!["Caldera", "Stratovolcano", "Complex volcano"]
        );
    }

    #[test]
    fn northern_share_excludes_equator() {
        let q = query(vec![
            Volcano { latitude: 19.4, ..volcano("a") },
            Volcano { latitude: 0.0, ..volcano("b") },
            Volcano { latitude: -8.2, ..volcano("c") },
        ]);
        let pct = q.percent_in_northern_hemisphere().unwrap();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn complex_filter_needs_every_condition() {
        let matching = Volcano {
            year: Some(1886),
            latitude: -38.2,
            vei: 5,
            ..volcano("Tarawera")
        };
        let q = query(vec![
            matching.clone(),
            Volcano { year: Some(1800), ..matching.clone() },
            Volcano { name: "undated".into(), year: None, ..matching.clone() },
            Volcano { tsunami: true, ..matching.clone() },
            Volcano { latitude: 0.0, ..matching.clone() },
            Volcano { vei: 6, ..matching.clone() },
            Volcano { name: "Puyehue".into(), year: Some(1960), latitude: -40.6, ..matching },
        ]);
        assert_eq!(q.complex_filter(), vec!["Tarawera", "Puyehue"]);
    }

    #[test]
    fn min_elevation_is_inclusive() {
        let q = query(vec![
            Volcano { elevation: 4999.0, ..volcano("low") },
            Volcano { elevation: 5000.0, ..volcano("edge") },
            Volcano { elevation: 5892.0, ..volcano("high") },
        ]);
        assert_eq!(q.filter_by_min_elevation(5000.0), vec!["edge", "high"]);
    }

    #[test]
    fn top_death_agents_dedups_in_rank_order() {
        let q = query(vec![
            Volcano { agents: vec![], ..with_deaths("c", Some(100)) },
            Volcano { agents: vec!["Ash".into()], ..with_deaths("b", Some(300)) },
            Volcano {
                agents: vec!["Ash".into(), "Lava".into()],
                ..with_deaths("a", Some(500))
            },
        ]);
        assert_eq!(q.top_death_agents(DEFAULT_TOP_AGENTS), vec!["Ash", "Lava"]);
    }

    #[test]
    fn top_death_agents_respects_limit_and_stable_ties() {
        let q = query(vec![
            Volcano { agents: vec!["M".into()], ..with_deaths("a", Some(10)) },
            Volcano { agents: vec!["T".into()], ..with_deaths("b", Some(10)) },
            Volcano { agents: vec!["P".into()], ..with_deaths("c", Some(90)) },
            Volcano { agents: vec!["W".into()], ..with_deaths("d", None) },
        ]);
        assert_eq!(q.top_death_agents(2), vec!["P", "M"]);
        assert_eq!(q.top_death_agents(10), vec!["P", "M", "T", "W"]);
        assert!(q.top_death_agents(0).is_empty());
    }

    #[test]
    fn empty_collection_is_explicit() {
        let q = VolcanoQuery::default();
        assert_eq!(q.count(), 0);
        assert!(q.most_deadly().is_none());
        assert!(q.most_common_type().is_none());
        assert!(q.distinct_types().is_empty());
        assert!(q.top_death_agents(10).is_empty());
        assert_eq!(
            q.average_elevation(),
            Err(QueryError::EmptyCollection { operation: "average_elevation" })
        );
        assert!(matches!(
            q.tsunami_percentage(),
            Err(QueryError::EmptyCollection { .. })
        ));
        assert!(q.tsunami_share().is_err());
        assert!(q.percent_in_northern_hemisphere().is_err());
    }

    fn arb_volcano() -> impl Strategy<Value = Volcano> {
        let year = prop::option::weighted(0.9, 1700i32..2020);
        (year, 0u8..=8, -60.0f64..70.0).prop_map(|(year, vei, latitude)| Volcano {
            year,
            vei,
            latitude,
            ..volcano("p")
        })
    }

    proptest! {
        #[test]
        fn raising_min_vei_never_grows(records in prop::collection::vec(arb_volcano(), 0..40), lo in 0u8..=8, hi in 0u8..=8) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let q = query(records);
            prop_assert!(q.filter_by_min_vei(hi).len() <= q.filter_by_min_vei(lo).len());
            let expected = q.records().iter().filter(|v| v.vei >= lo).count();
            prop_assert_eq!(q.filter_by_min_vei(lo).len(), expected);
        }

        #[test]
        fn decade_membership(records in prop::collection::vec(arb_volcano(), 0..40), start in 1700i32..2020) {
            let q = query(records);
            let hits = q.erupted_in_decade(start);
            prop_assert!(hits.len() <= q.count());
            prop_assert!(hits.iter().all(|v| matches!(v.year, Some(y) if y >= start && y < start + 10)));
            let expected = q
                .records()
                .iter()
                .filter(|v| v.year.is_some_and(|y| (start..start + 10).contains(&y)))
                .count();
            prop_assert_eq!(hits.len(), expected);
        }
    }
}
