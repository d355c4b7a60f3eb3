//! Project input types and request validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::estimation::currency::CurrencyService;

/// Largest accepted dimension, in meters.
pub const MAX_DIMENSION_M: f64 = 1000.0;

/// Kind of construction work being estimated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    House,
    Room,
    Roof,
    Wall,
    Foundation,
}

impl ProjectType {
    pub const ALL: [ProjectType; 5] = [
        Self::House,
        Self::Room,
        Self::Roof,
        Self::Wall,
        Self::Foundation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Room => "room",
            Self::Roof => "roof",
            Self::Wall => "wall",
            Self::Foundation => "foundation",
        }
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown project type '{}'", s))
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered quality tier. Declaration order is the tier order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Economy,
    Standard,
    Premium,
    Luxury,
}

impl QualityLevel {
    pub const ALL: [QualityLevel; 4] = [Self::Economy, Self::Standard, Self::Premium, Self::Luxury];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Luxury => "luxury",
        }
    }

    /// Position in the tier order, starting at 0 for economy.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Number of tiers between `self` and `other`.
    pub fn distance(&self, other: QualityLevel) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown quality level '{}'", s))
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    #[default]
    Simple,
    Detailed,
}

impl EstimationMode {
    pub const ALL: [EstimationMode; 2] = [Self::Simple, Self::Detailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }
}

impl FromStr for EstimationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown estimation mode '{}'", s))
    }
}

/// Supported region. Drives the default currency and brand availability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Morocco,
    France,
    Spain,
    Germany,
    UnitedKingdom,
    UnitedStates,
    Canada,
    UnitedArabEmirates,
    Japan,
}

impl Location {
    pub const ALL: [Location; 9] = [
        Self::Morocco,
        Self::France,
        Self::Spain,
        Self::Germany,
        Self::UnitedKingdom,
        Self::UnitedStates,
        Self::Canada,
        Self::UnitedArabEmirates,
        Self::Japan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Morocco => "Morocco",
            Self::France => "France",
            Self::Spain => "Spain",
            Self::Germany => "Germany",
            Self::UnitedKingdom => "United Kingdom",
            Self::UnitedStates => "United States",
            Self::Canada => "Canada",
            Self::UnitedArabEmirates => "United Arab Emirates",
            Self::Japan => "Japan",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Morocco => "morocco",
            Self::France => "france",
            Self::Spain => "spain",
            Self::Germany => "germany",
            Self::UnitedKingdom => "united_kingdom",
            Self::UnitedStates => "united_states",
            Self::Canada => "canada",
            Self::UnitedArabEmirates => "united_arab_emirates",
            Self::Japan => "japan",
        }
    }

    /// ISO 3166 alpha-2 codes accepted as aliases.
    fn iso_codes(&self) -> &'static [&'static str] {
        match self {
            Self::Morocco => &["MA"],
            Self::France => &["FR"],
            Self::Spain => &["ES"],
            Self::Germany => &["DE"],
            Self::UnitedKingdom => &["GB", "UK"],
            Self::UnitedStates => &["US", "USA"],
            Self::Canada => &["CA"],
            Self::UnitedArabEmirates => &["AE", "UAE"],
            Self::Japan => &["JP"],
        }
    }

    pub fn default_currency(&self) -> &'static str {
        match self {
            Self::Morocco => "MAD",
            Self::France | Self::Spain | Self::Germany => "EUR",
            Self::UnitedKingdom => "GBP",
            Self::UnitedStates => "USD",
            Self::Canada => "CAD",
            Self::UnitedArabEmirates => "AED",
            Self::Japan => "JPY",
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| {
                l.name().eq_ignore_ascii_case(needle)
                    || l.key().eq_ignore_ascii_case(needle)
                    || l.iso_codes().iter().any(|c| c.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| format!("unsupported location '{}'", s))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Project geometry in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Validated, immutable input of one estimation request
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInput {
    pub project_type: ProjectType,
    pub dimensions: Dimensions,
    pub location: Location,
    pub quality_level: QualityLevel,
    pub estimation_mode: EstimationMode,
    /// Advisory ceiling in the response currency.
    pub budget: Option<f64>,
    /// Requested output currency, upper-cased. `None` means the location default.
    pub currency: Option<String>,
}

impl ProjectInput {
    pub fn response_currency(&self) -> &str {
        self.currency
            .as_deref()
            .unwrap_or_else(|| self.location.default_currency())
    }
}

/// Request body for `POST /estimates`.
///
/// Every field is optional at the serde level so that missing fields are
/// reported together by [`EstimateRequest::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub quality_level: Option<String>,
    #[serde(default)]
    pub estimation_mode: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl EstimateRequest {
    pub fn validate(&self, currencies: &CurrencyService) -> Result<ProjectInput, ValidationError> {
        let mut errors = ValidationError::new();

        let project_type = parse_required(&mut errors, "projectType", &self.project_type);
        let length = check_dimension(&mut errors, "length", self.length);
        let width = check_dimension(&mut errors, "width", self.width);
        let height = check_dimension(&mut errors, "height", self.height);
        let location = parse_required(&mut errors, "location", &self.location);
        let quality_level = parse_required(&mut errors, "qualityLevel", &self.quality_level);

        let estimation_mode = match self.estimation_mode.as_deref() {
            None => Some(EstimationMode::default()),
            Some(raw) => match raw.parse::<EstimationMode>() {
                Ok(mode) => Some(mode),
                Err(msg) => {
                    errors.push("estimationMode", msg);
                    None
                }
            },
        };

        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget <= 0.0 {
                errors.push("budget", "must be a positive number");
            }
        }

        let currency = match self.currency.as_deref() {
            None => None,
            Some(code) if currencies.is_supported(code) => Some(code.trim().to_ascii_uppercase()),
            Some(code) => {
                errors.push("currency", format!("unsupported currency '{}'", code));
                None
            }
        };

        match (
            project_type,
            length,
            width,
            height,
            location,
            quality_level,
            estimation_mode,
        ) {
            (
                Some(project_type),
                Some(length),
                Some(width),
                Some(height),
                Some(location),
                Some(quality_level),
                Some(estimation_mode),
            ) if errors.is_empty() => Ok(ProjectInput {
                project_type,
                dimensions: Dimensions {
                    length,
                    width,
                    height,
                },
                location,
                quality_level,
                estimation_mode,
                budget: self.budget,
                currency,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOption {
    pub name: &'static str,
    pub default_currency: &'static str,
}

/// Closed input sets the engine understands, for `GET /estimates/options`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOptionsResponse {
    pub project_types: Vec<ProjectType>,
    pub locations: Vec<LocationOption>,
    pub quality_levels: Vec<QualityLevel>,
    pub estimation_modes: Vec<EstimationMode>,
}

impl EstimateOptionsResponse {
    pub fn current() -> Self {
        Self {
            project_types: ProjectType::ALL.to_vec(),
            locations: Location::ALL
                .iter()
                .map(|l| LocationOption {
                    name: l.name(),
                    default_currency: l.default_currency(),
                })
                .collect(),
            quality_levels: QualityLevel::ALL.to_vec(),
            estimation_modes: EstimationMode::ALL.to_vec(),
        }
    }
}

fn parse_required<T: FromStr<Err = String>>(
    errors: &mut ValidationError,
    field: &str,
    raw: &Option<String>,
) -> Option<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(field, "is required");
            None
        }
        Some(value) => match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(msg) => {
                errors.push(field, msg);
                None
            }
        },
    }
}

fn check_dimension(errors: &mut ValidationError, field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        None => {
            errors.push(field, "is required");
            None
        }
        Some(v) if !v.is_finite() || v <= 0.0 => {
            errors.push(field, "must be greater than 0");
            None
        }
        Some(v) if v > MAX_DIMENSION_M => {
            errors.push(field, format!("must not exceed {} m", MAX_DIMENSION_M));
            None
        }
        Some(v) => Some(v),
    }
}
