use std::fmt;

#[derive(Debug)]
pub enum RegionTableError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Empty,
    DuplicateName(String),
    TooManyRegions(usize),
    MissingSampler {
        region: String,
        sampler: &'static str,
    },
    InvalidParameter {
        region: String,
        reason: String,
    },
    UnknownRegion(String),
}

impl fmt::Display for RegionTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionTableError::Io(err) => write!(f, "failed to read region table: {}", err),
            RegionTableError::Parse(err) => write!(f, "failed to parse region table: {}", err),
            RegionTableError::Empty => write!(f, "region table defines no regions"),
            RegionTableError::DuplicateName(name) => {
                write!(f, "region '{}' is defined more than once", name)
            }
            RegionTableError::TooManyRegions(n) => {
                write!(f, "{} regions exceed the region id space", n)
            }
            RegionTableError::MissingSampler { region, sampler } => {
                write!(f, "region '{}' has no {} sampler", region, sampler)
            }
            RegionTableError::InvalidParameter { region, reason } => {
                write!(f, "region '{}': {}", region, reason)
            }
            RegionTableError::UnknownRegion(name) => write!(f, "unknown region '{}'", name),
        }
    }
}

impl std::error::Error for RegionTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegionTableError::Io(err) => Some(err),
            RegionTableError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RegionTableError {
    fn from(err: std::io::Error) -> Self {
        RegionTableError::Io(err)
    }
}

impl From<toml::de::Error> for RegionTableError {
    fn from(err: toml::de::Error) -> Self {
        RegionTableError::Parse(err)
    }
}
