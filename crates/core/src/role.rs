#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Member,
    StationManager,
    AreaManager,
    RegionManager,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::StationManager => "station_manager",
            Role::AreaManager => "area_manager",
            Role::RegionManager => "region_manager",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RoleParseError> {
        match value.trim() {
            "member" => Ok(Role::Member),
            "station_manager" => Ok(Role::StationManager),
            "area_manager" => Ok(Role::AreaManager),
            "region_manager" => Ok(Role::RegionManager),
            "admin" => Ok(Role::Admin),
            other => Err(RoleParseError::Unknown(other.to_string())),
        }
    }

    /// Managers may approve ideas and create polls; admins count as managers
    /// for those guards.
    pub fn is_manager(self) -> bool {
        matches!(
            self,
            Role::StationManager | Role::AreaManager | Role::RegionManager | Role::Admin
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleParseError {
    Unknown(String),
}

impl std::fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(value) => write!(f, "unknown role: {value}"),
        }
    }
}

impl std::error::Error for RoleParseError {}
