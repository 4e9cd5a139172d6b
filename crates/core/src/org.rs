#![forbid(unsafe_code)]

use crate::ids::OrgUnitId;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrgUnitKind {
    Region,
    Area,
    Station,
}

impl OrgUnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrgUnitKind::Region => "region",
            OrgUnitKind::Area => "area",
            OrgUnitKind::Station => "station",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrgError> {
        match value.trim() {
            "region" => Ok(OrgUnitKind::Region),
            "area" => Ok(OrgUnitKind::Area),
            "station" => Ok(OrgUnitKind::Station),
            other => Err(OrgError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrgUnit {
    pub id: OrgUnitId,
    pub kind: OrgUnitKind,
    pub name: String,
    pub parent_id: Option<OrgUnitId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrgError {
    NotFound(String),
    UnknownKind(String),
    DuplicateName(String),
    MissingParent(String),
    WrongParentKind(String),
    RegionWithParent(String),
}

impl std::fmt::Display for OrgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "org unit not found: {name}"),
            Self::UnknownKind(value) => write!(f, "unknown org unit kind: {value}"),
            Self::DuplicateName(name) => write!(f, "duplicate org unit name: {name}"),
            Self::MissingParent(name) => write!(f, "org unit has no parent: {name}"),
            Self::WrongParentKind(name) => write!(f, "org unit has wrong parent kind: {name}"),
            Self::RegionWithParent(name) => write!(f, "region must not have a parent: {name}"),
        }
    }
}

impl std::error::Error for OrgError {}

/// Immutable per-request snapshot of the region → area → station tree,
/// built from the flat unit set via parent pointers.
#[derive(Clone, Debug)]
pub struct OrgTree {
    units: Vec<OrgUnit>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<OrgUnitId, usize>,
}

impl OrgTree {
    /// Builds the tree and checks the chain invariant: a station's parent is
    /// an area, an area's parent is a region, a region has no parent.
    pub fn build(units: Vec<OrgUnit>) -> Result<Self, OrgError> {
        let mut by_name = HashMap::with_capacity(units.len());
        let mut by_id = HashMap::with_capacity(units.len());
        for (index, unit) in units.iter().enumerate() {
            if by_name.insert(unit.name.clone(), index).is_some() {
                return Err(OrgError::DuplicateName(unit.name.clone()));
            }
            by_id.insert(unit.id, index);
        }

        for unit in &units {
            match (unit.kind, unit.parent_id) {
                (OrgUnitKind::Region, None) => {}
                (OrgUnitKind::Region, Some(_)) => {
                    return Err(OrgError::RegionWithParent(unit.name.clone()));
                }
                (_, None) => return Err(OrgError::MissingParent(unit.name.clone())),
                (kind, Some(parent_id)) => {
                    let parent = by_id
                        .get(&parent_id)
                        .map(|index| &units[*index])
                        .ok_or_else(|| OrgError::MissingParent(unit.name.clone()))?;
                    let expected = match kind {
                        OrgUnitKind::Station => OrgUnitKind::Area,
                        OrgUnitKind::Area => OrgUnitKind::Region,
                        OrgUnitKind::Region => unreachable!("handled above"),
                    };
                    if parent.kind != expected {
                        return Err(OrgError::WrongParentKind(unit.name.clone()));
                    }
                }
            }
        }

        Ok(Self {
            units,
            by_name,
            by_id,
        })
    }

    pub fn get(&self, name: &str) -> Option<&OrgUnit> {
        self.by_name.get(name).map(|index| &self.units[*index])
    }

    pub fn kind_of(&self, name: &str) -> Option<OrgUnitKind> {
        self.get(name).map(|unit| unit.kind)
    }

    fn parent_of(&self, unit: &OrgUnit) -> Option<&OrgUnit> {
        let parent_id = unit.parent_id?;
        self.by_id.get(&parent_id).map(|index| &self.units[*index])
    }

    /// The {area, region} chain above a station. O(depth) = O(3).
    pub fn ancestors(&self, station_name: &str) -> Result<StationChain, OrgError> {
        let station = self
            .get(station_name)
            .filter(|unit| unit.kind == OrgUnitKind::Station)
            .ok_or_else(|| OrgError::NotFound(station_name.to_string()))?;
        let area = self
            .parent_of(station)
            .ok_or_else(|| OrgError::MissingParent(station.name.clone()))?;
        let region = self
            .parent_of(area)
            .ok_or_else(|| OrgError::MissingParent(area.name.clone()))?;
        Ok(StationChain {
            station: station.name.clone(),
            area: area.name.clone(),
            region: region.name.clone(),
        })
    }

    pub fn station_area(&self, station_name: &str) -> Option<String> {
        self.ancestors(station_name).ok().map(|chain| chain.area)
    }

    pub fn station_region(&self, station_name: &str) -> Option<String> {
        self.ancestors(station_name).ok().map(|chain| chain.region)
    }

    /// Stations whose parent is the named area. O(n) scan over the snapshot.
    pub fn stations_in_area(&self, area_name: &str) -> Result<Vec<String>, OrgError> {
        let area = self
            .get(area_name)
            .filter(|unit| unit.kind == OrgUnitKind::Area)
            .ok_or_else(|| OrgError::NotFound(area_name.to_string()))?;
        Ok(self.children_of(area.id, OrgUnitKind::Station))
    }

    pub fn areas_in_region(&self, region_name: &str) -> Result<Vec<String>, OrgError> {
        let region = self
            .get(region_name)
            .filter(|unit| unit.kind == OrgUnitKind::Region)
            .ok_or_else(|| OrgError::NotFound(region_name.to_string()))?;
        Ok(self.children_of(region.id, OrgUnitKind::Area))
    }

    /// Every station under the named region, walked iteratively area by area.
    pub fn stations_in_region(&self, region_name: &str) -> Result<Vec<String>, OrgError> {
        let region = self
            .get(region_name)
            .filter(|unit| unit.kind == OrgUnitKind::Region)
            .ok_or_else(|| OrgError::NotFound(region_name.to_string()))?;
        let mut stations = Vec::new();
        for area_name in self.children_of(region.id, OrgUnitKind::Area) {
            if let Some(area) = self.get(&area_name) {
                stations.extend(self.children_of(area.id, OrgUnitKind::Station));
            }
        }
        Ok(stations)
    }

    fn children_of(&self, parent_id: OrgUnitId, kind: OrgUnitKind) -> Vec<String> {
        self.units
            .iter()
            .filter(|unit| unit.parent_id == Some(parent_id) && unit.kind == kind)
            .map(|unit| unit.name.clone())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StationChain {
    pub station: String,
    pub area: String,
    pub region: String,
}
