use std::fmt;

use log::warn;
use serde::Serialize;

use crate::data::query::DEFAULT_TOP_AGENTS;
use crate::data::{QueryError, Volcano, VolcanoQuery};

// ---------------------------------------------------------------------------
// Report parameters
// ---------------------------------------------------------------------------

/// Arguments for the parameterised queries in a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// First year of the decade to list.
    pub decade_start: i32,
    pub min_vei: u8,
    /// Meters.
    pub min_elevation: f64,
    /// Country to count eruptions for; skipped when `None`.
    pub country: Option<String>,
    pub top_agents: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            decade_start: 1980,
            min_vei: 6,
            min_elevation: 5000.0,
            country: None,
            top_agents: DEFAULT_TOP_AGENTS,
        }
    }
}

// ---------------------------------------------------------------------------
// Report – every query answered once
// ---------------------------------------------------------------------------

/// Snapshot of all statistics for one dataset, independent of rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub count: usize,
    pub decade_start: i32,
    pub erupted_in_decade: Vec<String>,
    pub min_vei: u8,
    pub high_vei: Vec<String>,
    pub most_deadly: Option<Volcano>,
    pub tsunami_percentage: Option<u64>,
    pub most_common_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryCount>,
    pub average_elevation: Option<f64>,
    pub distinct_types: Vec<String>,
    pub percent_northern: Option<f64>,
    pub complex_filter: Vec<String>,
    pub min_elevation: f64,
    pub elevated: Vec<String>,
    pub top_death_agents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCount {
    pub name: String,
    pub eruptions: usize,
}

impl Report {
    pub fn build(query: &VolcanoQuery, options: &ReportOptions) -> Self {
        Report {
            count: query.count(),
            decade_start: options.decade_start,
            erupted_in_decade: query
                .erupted_in_decade(options.decade_start)
                .into_iter()
                .map(|v| v.name.clone())
                .collect(),
            min_vei: options.min_vei,
            high_vei: owned(query.filter_by_min_vei(options.min_vei)),
            most_deadly: query.most_deadly().cloned(),
            tsunami_percentage: skip_empty(query.tsunami_percentage()),
            most_common_type: query.most_common_type().map(str::to_owned),
            country: options.country.as_ref().map(|name| CountryCount {
                name: name.clone(),
                eruptions: query.count_by_country(name),
            }),
            average_elevation: skip_empty(query.average_elevation()),
            distinct_types: owned(query.distinct_types()),
            percent_northern: skip_empty(query.percent_in_northern_hemisphere()),
            complex_filter: owned(query.complex_filter()),
            min_elevation: options.min_elevation,
            elevated: owned(query.filter_by_min_elevation(options.min_elevation)),
            top_death_agents: owned(query.top_death_agents(options.top_agents)),
        }
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_owned).collect()
}

fn skip_empty<T>(result: Result<T, QueryError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("leaving field out of report: {err}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        writeln!(f, "{label}: <none>")
    } else {
        writeln!(f, "{label} ({}): {}", items.len(), items.join(", "))
    }
}

fn write_opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, label: &str, value: &Option<T>) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "{label}: {v}"),
        None => writeln!(f, "{label}: n/a"),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Eruptions: {}", self.count)?;
        write_list(
            f,
            &format!(
                "Erupted {}-{}",
                self.decade_start,
                self.decade_start.saturating_add(9)
            ),
            &self.erupted_in_decade,
        )?;
        write_list(f, &format!("VEI >= {}", self.min_vei), &self.high_vei)?;
        write_opt(f, "Most deadly", &self.most_deadly)?;
        write_opt(f, "Caused a tsunami (%)", &self.tsunami_percentage)?;
        write_opt(f, "Most common type", &self.most_common_type)?;
        if let Some(country) = &self.country {
            writeln!(f, "Eruptions in {}: {}", country.name, country.eruptions)?;
        }
        write_opt(
            f,
            "Average elevation (m)",
            &self.average_elevation.map(|e| format!("{e:.1}")),
        )?;
        write_list(f, "Types", &self.distinct_types)?;
        write_opt(
            f,
            "Northern hemisphere (%)",
            &self.percent_northern.map(|p| format!("{p:.2}")),
        )?;
        write_list(
            f,
            "Southern VEI 5 after 1800 without tsunami",
            &self.complex_filter,
        )?;
        write_list(
            f,
            &format!("Elevation >= {} m", self.min_elevation),
            &self.elevated,
        )?;
        write_list(f, "Top agents of death", &self.top_death_agents)
    }
}
