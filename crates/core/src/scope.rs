#![forbid(unsafe_code)]

use crate::org::{OrgError, OrgTree, OrgUnitKind};
use crate::role::Role;
use std::collections::BTreeSet;

/// The hierarchy level a post's target audience resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Station,
    Area,
    Region,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Station => "station",
            Scope::Area => "area",
            Scope::Region => "region",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrgError> {
        match value.trim() {
            "station" => Ok(Scope::Station),
            "area" => Ok(Scope::Area),
            "region" => Ok(Scope::Region),
            other => Err(OrgError::UnknownKind(other.to_string())),
        }
    }
}

/// Derives a post's scope from the kind of the validated target unit.
pub fn scope_of_target(tree: &OrgTree, target: &str) -> Option<Scope> {
    match tree.kind_of(target)? {
        OrgUnitKind::Station => Some(Scope::Station),
        OrgUnitKind::Area => Some(Scope::Area),
        OrgUnitKind::Region => Some(Scope::Region),
    }
}

/// The target set a user is allowed to *see*: own station + area + region,
/// widened for area managers (all stations in the area) and region managers
/// (all stations and areas in the region). Admins get no widening here; the
/// engine's admin bypass applies to creation targeting only.
pub fn allowed_targets(
    tree: &OrgTree,
    station: &str,
    role: Role,
) -> Result<BTreeSet<String>, OrgError> {
    let chain = tree.ancestors(station)?;
    let mut targets = BTreeSet::new();
    targets.insert(chain.station.clone());
    targets.insert(chain.area.clone());
    targets.insert(chain.region.clone());

    match role {
        Role::AreaManager => {
            targets.extend(tree.stations_in_area(&chain.area)?);
        }
        Role::RegionManager => {
            targets.extend(tree.stations_in_region(&chain.region)?);
            targets.extend(tree.areas_in_region(&chain.region)?);
        }
        Role::Member | Role::StationManager | Role::Admin => {}
    }

    Ok(targets)
}

/// The targets relevant when narrowing the feed to one station: the station
/// itself plus its area and region.
pub fn relevant_chain(tree: &OrgTree, station: &str) -> Result<BTreeSet<String>, OrgError> {
    let chain = tree.ancestors(station)?;
    let mut targets = BTreeSet::new();
    targets.insert(chain.station);
    targets.insert(chain.area);
    targets.insert(chain.region);
    Ok(targets)
}

/// The target set a user may *create* posts for, by role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreationTargets {
    /// Admin: any existing unit.
    Any,
    Only(BTreeSet<String>),
}

impl CreationTargets {
    pub fn permits(&self, target: &str) -> bool {
        match self {
            CreationTargets::Any => true,
            CreationTargets::Only(targets) => targets.contains(target),
        }
    }
}

/// Targeting rules on create: a member only their own station; a station
/// manager their station or its area; an area manager their area or any
/// station inside it; a region manager only their region. The area/region
/// overrides cover managers whose station sits outside their managed unit.
pub fn creation_targets(
    tree: &OrgTree,
    role: Role,
    station: &str,
    area_override: Option<&str>,
    region_override: Option<&str>,
) -> Result<CreationTargets, OrgError> {
    let mut targets = BTreeSet::new();
    match role {
        Role::Admin => return Ok(CreationTargets::Any),
        Role::Member => {
            targets.insert(station.to_string());
        }
        Role::StationManager => {
            let chain = tree.ancestors(station)?;
            targets.insert(chain.station);
            targets.insert(chain.area);
        }
        Role::AreaManager => {
            let area = match area_override {
                Some(area) => area.to_string(),
                None => tree.ancestors(station)?.area,
            };
            targets.extend(tree.stations_in_area(&area)?);
            targets.insert(area);
        }
        Role::RegionManager => {
            let region = match region_override {
                Some(region) => region.to_string(),
                None => tree.ancestors(station)?.region,
            };
            targets.insert(region);
        }
    }
    Ok(CreationTargets::Only(targets))
}
