use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// How far a student is willing to move for an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum Mobility {
    #[default]
    None,
    City,
    State,
}

impl Mobility {
    /// Whether geographic filtering applies to this student
    pub fn is_mobile(&self) -> bool {
        matches!(self, Mobility::City | Mobility::State)
    }
}

/// Anything but a recognised string (null, booleans, numbers) means no mobility
impl From<Value> for Mobility {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Mobility::from(s),
            _ => Mobility::None,
        }
    }
}

impl From<String> for Mobility {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cidade" | "city" => Mobility::City,
            "estado" | "state" => Mobility::State,
            _ => Mobility::None,
        }
    }
}

impl From<Mobility> for String {
    fn from(value: Mobility) -> Self {
        match value {
            Mobility::None => "nenhuma".to_string(),
            Mobility::City => "cidade".to_string(),
            Mobility::State => "estado".to_string(),
        }
    }
}

/// Student attributes as returned by the profile service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(rename = "escolaridade", default, deserialize_with = "null_as_empty")]
    pub schooling_level: String,
    #[serde(
        rename = "areas_interesse",
        default,
        deserialize_with = "string_or_list"
    )]
    pub interest_areas: Vec<String>,
    #[serde(rename = "descricao", default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "disponibilidade_de_deslocamento", default)]
    pub mobility: Mobility,
    #[serde(rename = "cidade", default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(rename = "uf", default, deserialize_with = "null_as_empty")]
    pub state: String,
}

/// Profile text fields may be null when the student never filled them in
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Interest areas arrive either as a single string or as a list
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// Opportunity record stored alongside each vector in the index
///
/// Only the fields the pipeline reads are typed; everything else is carried
/// through untouched so responses echo the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCandidate {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "uf", default)]
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OpportunityCandidate {
    pub fn new(name: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            state: state.into(),
            extra: Map::new(),
        }
    }
}

/// A candidate together with its distance to the query (lower is closer)
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub candidate: OpportunityCandidate,
    pub score: f32,
}

/// Persisted pairing of a student with a recommended opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    #[serde(rename = "id_usuario")]
    pub student_id: String,
    #[serde(rename = "id_oportunidade")]
    pub opportunity_id: i64,
}
