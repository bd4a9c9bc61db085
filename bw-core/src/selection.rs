use crate::contents::Contents;
use serde::{Deserialize, Serialize};

/// The (country, county, region, year) tuple a pipeline run is keyed on.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub country: String,
    pub county: String,
    pub region: String,
    /// Opaque token, used verbatim in the series path.
    pub year: String,
}

/// Addressable fields of a [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionField {
    Country,
    County,
    Region,
    Year,
}

impl SelectionField {
    /// Position in the country > county > region hierarchy.
    /// `Year` stands outside it.
    fn level(&self) -> Option<u8> {
        match self {
            SelectionField::Country => Some(0),
            SelectionField::County => Some(1),
            SelectionField::Region => Some(2),
            SelectionField::Year => None,
        }
    }
}

impl Selection {
    pub fn new(country: &str, county: &str, region: &str, year: &str) -> Self {
        Selection {
            country: country.to_string(),
            county: county.to_string(),
            region: region.to_string(),
            year: year.to_string(),
        }
    }

    /// True iff all four fields are non-empty.
    pub fn is_complete(&self) -> bool {
        [&self.country, &self.county, &self.region, &self.year]
            .iter()
            .all(|s| !s.is_empty())
    }

    pub fn get(&self, field: SelectionField) -> &str {
        match field {
            SelectionField::Country => &self.country,
            SelectionField::County => &self.county,
            SelectionField::Region => &self.region,
            SelectionField::Year => &self.year,
        }
    }

    fn slot(&mut self, field: SelectionField) -> &mut String {
        match field {
            SelectionField::Country => &mut self.country,
            SelectionField::County => &mut self.county,
            SelectionField::Region => &mut self.region,
            SelectionField::Year => &mut self.year,
        }
    }

    /// Resource path of the raw series: `{year}/{country}/{county}/{region}`.
    pub fn series_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.year, self.country, self.county, self.region
        )
    }
}

/// Mutable selection held by the UI while the user picks a region.
///
/// Changing a field at hierarchy level k clears every field below it.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    current: Selection,
    catalogue: Option<Contents>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the state to a region catalogue so the choices at each level can be listed.
    pub fn with_catalogue(catalogue: Contents) -> Self {
        SelectionState {
            current: Selection::default(),
            catalogue: Some(catalogue),
        }
    }

    pub fn set(&mut self, field: SelectionField, value: &str) {
        if self.current.get(field) == value {
            return;
        }
        *self.current.slot(field) = value.to_string();
        if let Some(level) = field.level() {
            for downstream in [SelectionField::County, SelectionField::Region] {
                if downstream.level().is_some_and(|l| l > level) {
                    self.current.slot(downstream).clear();
                }
            }
        }
    }

    pub fn get(&self, field: SelectionField) -> &str {
        self.current.get(field)
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_complete()
    }

    pub fn selection(&self) -> &Selection {
        &self.current
    }

    /// Copy of the current selection, if it is complete enough to run.
    pub fn capture(&self) -> Option<Selection> {
        self.is_complete().then(|| self.current.clone())
    }

    pub fn countries(&self) -> &[String] {
        match &self.catalogue {
            Some(c) => c.countries.as_slice(),
            None => &[],
        }
    }

    /// Counties offered for the chosen country; empty until a country is set.
    pub fn available_counties(&self) -> &[String] {
        match &self.catalogue {
            Some(c) if !self.current.country.is_empty() => c.counties_of(&self.current.country),
            _ => &[],
        }
    }

    /// Regions offered for the chosen county; empty until a county is set.
    pub fn available_regions(&self) -> &[String] {
        match &self.catalogue {
            Some(c) if !self.current.county.is_empty() => c.regions_of(&self.current.county),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn filled() -> SelectionState {
        let mut state = SelectionState::new();
        state.set(SelectionField::Country, "India");
        state.set(SelectionField::County, "Kerala");
        state.set(SelectionField::Region, "Munnar");
        state.set(SelectionField::Year, "2024");
        state
    }

    #[test]
    fn test_is_complete_requires_all_fields() {
        assert!(filled().is_complete());
        assert!(!Selection::new("India", "Kerala", "", "2024").is_complete());
        assert!(!Selection::new("India", "Kerala", "Munnar", "").is_complete());
        assert!(!Selection::default().is_complete());
    }

    #[test]
    fn test_setting_county_clears_region() {
        let mut state = filled();
        state.set(SelectionField::County, "Goa");
        assert_eq!(state.get(SelectionField::Country), "India");
        assert_eq!(state.get(SelectionField::County), "Goa");
        assert_eq!(state.get(SelectionField::Region), "");
        assert_eq!(state.get(SelectionField::Year), "2024");
        assert!(state.capture().is_none());
    }

    #[test]
    fn test_setting_country_clears_county_and_region() {
        let mut state = filled();
        state.set(SelectionField::Country, "Peru");
        assert_eq!(state.get(SelectionField::County), "");
        assert_eq!(state.get(SelectionField::Region), "");
        assert_eq!(state.get(SelectionField::Year), "2024");
    }

    #[test]
    fn test_unchanged_value_and_year_clear_nothing() {
        let mut state = filled();
        state.set(SelectionField::Country, "India");
        state.set(SelectionField::Year, "2023");
        assert_eq!(
            state.capture(),
            Some(Selection::new("India", "Kerala", "Munnar", "2023"))
        );
    }

    #[test]
    fn test_series_path() {
        let selection = Selection::new("India", "Kerala", "Munnar", "2024");
        assert_eq!(selection.series_path(), "2024/India/Kerala/Munnar");
    }

    #[test]
    fn test_catalogue_choices_follow_selection() {
        let catalogue = Contents {
            countries: vec!["India".to_string()],
            counties: BTreeMap::from([("India".to_string(), vec!["Kerala".to_string()])]),
            regions: BTreeMap::from([("Kerala".to_string(), vec!["Munnar".to_string()])]),
        };
        let mut state = SelectionState::with_catalogue(catalogue);
        assert_eq!(state.countries(), ["India"]);
        assert!(state.available_counties().is_empty());
        state.set(SelectionField::Country, "India");
        assert_eq!(state.available_counties(), ["Kerala"]);
        assert!(state.available_regions().is_empty());
        state.set(SelectionField::County, "Kerala");
        assert_eq!(state.available_regions(), ["Munnar"]);
    }
}
