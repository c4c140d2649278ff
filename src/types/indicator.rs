use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DCAT_NS: &str = "http://www.w3.org/ns/dcat#";
pub const DCT_NS: &str = "http://purl.org/dc/terms/";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Findability,
    Accessibility,
    Interoperability,
    Reusability,
    Contextuality,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Findability => "Findability",
            Self::Accessibility => "Accessibility",
            Self::Interoperability => "Interoperability",
            Self::Reusability => "Reusability",
            Self::Contextuality => "Contextuality",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Dataset,
    Distribution,
}

impl EntityType {
    pub fn compact(self) -> &'static str {
        match self {
            Self::Dataset => "dcat:Dataset",
            Self::Distribution => "dcat:Distribution",
        }
    }

    pub fn iri(self) -> String {
        match self {
            Self::Dataset => format!("{DCAT_NS}Dataset"),
            Self::Distribution => format!("{DCAT_NS}Distribution"),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.compact())
    }
}

/// DCAT-AP property paths the rubric can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Property {
    Keyword,
    Theme,
    Spatial,
    Temporal,
    AccessUrl,
    DownloadUrl,
    Format,
    /// `dct:format/rdf:value`, the media type literal behind a format node.
    FormatValue,
    MediaType,
    License,
    AccessRights,
    ContactPoint,
    Publisher,
    Rights,
    ByteSize,
    Issued,
    Modified,
}

impl Property {
    pub const ALL: [Property; 17] = [
        Self::Keyword,
        Self::Theme,
        Self::Spatial,
        Self::Temporal,
        Self::AccessUrl,
        Self::DownloadUrl,
        Self::Format,
        Self::FormatValue,
        Self::MediaType,
        Self::License,
        Self::AccessRights,
        Self::ContactPoint,
        Self::Publisher,
        Self::Rights,
        Self::ByteSize,
        Self::Issued,
        Self::Modified,
    ];

    pub fn compact(self) -> &'static str {
        match self {
            Self::Keyword => "dcat:keyword",
            Self::Theme => "dcat:theme",
            Self::Spatial => "dct:spatial",
            Self::Temporal => "dct:temporal",
            Self::AccessUrl => "dcat:accessURL",
            Self::DownloadUrl => "dcat:downloadURL",
            Self::Format => "dct:format",
            Self::FormatValue => "dct:format/rdf:value",
            Self::MediaType => "dcat:mediaType",
            Self::License => "dct:license",
            Self::AccessRights => "dct:accessRights",
            Self::ContactPoint => "dcat:contactPoint",
            Self::Publisher => "dct:publisher",
            Self::Rights => "dct:rights",
            Self::ByteSize => "dcat:byteSize",
            Self::Issued => "dct:issued",
            Self::Modified => "dct:modified",
        }
    }

    /// SPARQL property path built from full IRIs.
    pub fn sparql_path(self) -> String {
        self.compact()
            .split('/')
            .map(expand_compact)
            .map(|iri| format!("<{iri}>"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn expand_compact(compact: &str) -> String {
    match compact.split_once(':') {
        Some(("dcat", local)) => format!("{DCAT_NS}{local}"),
        Some(("dct", local)) => format!("{DCT_NS}{local}"),
        Some(("rdf", local)) => format!("{RDF_NS}{local}"),
        _ => compact.to_string(),
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.compact())
    }
}

impl FromStr for Property {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|property| property.compact() == value.trim())
            .ok_or_else(|| format!("unknown property path: {value}"))
    }
}

impl TryFrom<String> for Property {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Property> for String {
    fn from(property: Property) -> Self {
        property.compact().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Presence,
    Vocabulary,
    Reachability,
    Conformance,
}

impl IndicatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Vocabulary => "vocabulary",
            Self::Reachability => "reachability",
            Self::Conformance => "conformance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    Exact,
    TermInValue,
    ValueInTerm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRef {
    pub file: String,
    #[serde(default)]
    pub field: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub dimension: Dimension,
    pub entity: EntityType,
    pub property: Option<Property>,
    pub label: Option<String>,
    pub kind: IndicatorKind,
    pub weight: f64,
    pub vocabulary: Option<VocabularyRef>,
    pub match_mode: Option<MatchMode>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Indicator {
    /// Row label, e.g. `dct:license from vocabulary`.
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let property = self.property.map_or("-", Property::compact);
        match self.kind {
            IndicatorKind::Presence => property.to_string(),
            IndicatorKind::Vocabulary => format!("{property} from vocabulary"),
            IndicatorKind::Reachability => format!("{property} code=200"),
            IndicatorKind::Conformance => "DCAT-AP compliance".to_string(),
        }
    }
}
