//! Read-only content catalog.
//!
//! Cases and missions are looked up by id. Everything is validated on load,
//! so the session store can rely on the content invariants.

use crate::content::{Case, ContentError, Mission};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Bundled starter content
const BUILTIN_CATALOG: &str = include_str!("../content/catalog.json");

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    cases: Vec<Case>,
    #[serde(default)]
    missions: Vec<Mission>,
}

/// Cases and missions keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cases: BTreeMap<String, Case>,
    missions: BTreeMap<String, Mission>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Catalog::default();
        for case in file.cases {
            catalog.add_case(case)?;
        }
        for mission in file.missions {
            catalog.add_mission(mission)?;
        }
        Ok(catalog)
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn add_case(&mut self, case: Case) -> Result<(), ContentError> {
        case.validate()?;
        if self.cases.contains_key(&case.id) {
            return Err(ContentError::DuplicateId(case.id));
        }
        self.cases.insert(case.id.clone(), case);
        Ok(())
    }

    pub fn add_mission(&mut self, mission: Mission) -> Result<(), ContentError> {
        mission.validate()?;
        if self.missions.contains_key(&mission.id) {
            return Err(ContentError::DuplicateId(mission.id));
        }
        self.missions.insert(mission.id.clone(), mission);
        Ok(())
    }

    pub fn case(&self, id: &str) -> Option<&Case> {
        self.cases.get(id)
    }

    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.get(id)
    }

    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.values()
    }

    pub fn missions(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values()
    }

    /// Cases from one era, oldest first
    pub fn cases_in_era<'a>(&'a self, era: &'a str) -> Vec<&'a Case> {
        let mut cases: Vec<&Case> = self.cases.values().filter(|c| c.era == era).collect();
        cases.sort_by_key(|c| c.year);
        cases
    }
}
