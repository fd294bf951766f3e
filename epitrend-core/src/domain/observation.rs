//! A single (entity, date) observation and the columns eligible for forward-fill.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the dataset, keyed by `(entity_id, date)`.
///
/// Every numeric field may be absent in the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity_id: String,
    pub iso_code: Option<String>,
    pub date: NaiveDate,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    pub people_vaccinated: Option<f64>,
    pub population: Option<f64>,
}

impl Observation {
    /// An observation with every numeric field absent.
    pub fn empty(entity_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            entity_id: entity_id.into(),
            iso_code: None,
            date,
            total_cases: None,
            new_cases: None,
            total_deaths: None,
            new_deaths: None,
            people_vaccinated: None,
            population: None,
        }
    }

    /// Number of absent values among the fill-eligible columns plus population.
    pub fn null_count(&self) -> usize {
        FillColumn::ALL
            .iter()
            .filter(|c| c.get(self).is_none())
            .count()
            + usize::from(self.population.is_none())
    }
}

/// Numeric columns that the cleaner forward-fills within an entity.
///
/// `population` is an entity attribute and is never filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillColumn {
    TotalCases,
    NewCases,
    TotalDeaths,
    NewDeaths,
    PeopleVaccinated,
}

impl FillColumn {
    pub const ALL: [FillColumn; 5] = [
        FillColumn::TotalCases,
        FillColumn::NewCases,
        FillColumn::TotalDeaths,
        FillColumn::NewDeaths,
        FillColumn::PeopleVaccinated,
    ];

    /// Column name in the source CSV.
    pub fn name(self) -> &'static str {
        match self {
            FillColumn::TotalCases => "total_cases",
            FillColumn::NewCases => "new_cases",
            FillColumn::TotalDeaths => "total_deaths",
            FillColumn::NewDeaths => "new_deaths",
            FillColumn::PeopleVaccinated => "people_vaccinated",
        }
    }

    pub fn get(self, obs: &Observation) -> Option<f64> {
        match self {
            FillColumn::TotalCases => obs.total_cases,
            FillColumn::NewCases => obs.new_cases,
            FillColumn::TotalDeaths => obs.total_deaths,
            FillColumn::NewDeaths => obs.new_deaths,
            FillColumn::PeopleVaccinated => obs.people_vaccinated,
        }
    }

    pub fn slot_mut(self, obs: &mut Observation) -> &mut Option<f64> {
        match self {
            FillColumn::TotalCases => &mut obs.total_cases,
            FillColumn::NewCases => &mut obs.new_cases,
            FillColumn::TotalDeaths => &mut obs.total_deaths,
            FillColumn::NewDeaths => &mut obs.new_deaths,
            FillColumn::PeopleVaccinated => &mut obs.people_vaccinated,
        }
    }
}

impl std::fmt::Display for FillColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
