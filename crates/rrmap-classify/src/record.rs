//! # Regression Structural Records
//!
//! One record per regression, as produced by the classification step of the
//! report generator. Field names follow the classification JSON
//! (`regid`, `tabid`, `vars`, `dimensions_same_as_regid`, ...); the Rust
//! names describe the meaning.
//!
//! Blank strings are read as absent so that `""` and a missing key never
//! produce different structural signatures.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use rrmap_core::{CellId, RegressionId, TableId};

/// Tags attached to a regression, kept sorted.
pub type TagSet = BTreeSet<String>;

/// Structural description of one regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionStructuralRecord {
    /// Regression id, unique within its table.
    #[serde(rename = "regid", alias = "regression_id")]
    pub regression_id: RegressionId,
    /// Table the regression is reported in.
    #[serde(rename = "tabid", alias = "table_id")]
    pub table_id: TableId,
    /// Classification tags (`main_result`, `robustness`, ...).
    #[serde(rename = "regression_tags", alias = "tags", default, deserialize_with = "tag_set")]
    pub tags: TagSet,
    /// Variables in specification order.
    #[serde(rename = "vars", alias = "variables", default, deserialize_with = "null_as_empty")]
    pub variables: Vec<VariableSpec>,
    /// Dimensions (fixed effects, clustering, sample splits) in order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dimensions: Vec<DimensionSpec>,
    /// Sibling regression whose dimensions this one shares.
    #[serde(
        rename = "dimensions_same_as_regid",
        alias = "dimensions_inherit_from",
        default,
        deserialize_with = "blank_id_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub dimensions_inherit_from: Option<RegressionId>,
    /// One-line description of the regression.
    #[serde(rename = "short_descr", default, deserialize_with = "blank_as_none")]
    pub short_description: Option<String>,
    /// Standard error type (robust, clustered, ...).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub standard_error_type: Option<String>,
    /// Problem noticed in the prompt or media the classification came from.
    #[serde(rename = "error_in_prompt_or_media", default, deserialize_with = "blank_as_none")]
    pub source_warning: Option<String>,
    /// Statistics printed below the coefficients.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reported_stats: Vec<ReportedStat>,
}

/// One variable of a regression specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Role code (`d`, `x_eff`, `x_co`, `fe`, ...).
    #[serde(rename = "var_type", default, deserialize_with = "text_or_empty")]
    pub role: String,
    /// Label printed in the article.
    #[serde(rename = "label_in_article", default, deserialize_with = "blank_as_none")]
    pub article_label: Option<String>,
    /// Symbol used in the script.
    #[serde(rename = "var_in_code", default, deserialize_with = "blank_as_none")]
    pub code_symbol: Option<String>,
    /// Measurement unit.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit: Option<String>,
    /// Table cell holding this variable's estimate. Unique per record and
    /// excluded from structural signatures.
    #[serde(
        rename = "cell_id_estimate",
        default,
        deserialize_with = "blank_id_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimate_cell: Option<CellId>,
}

/// One dimension of a regression specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Dimension class (`fe`, `cluster`, `sample`, ...).
    #[serde(rename = "dim_class", default, deserialize_with = "text_or_empty")]
    pub class: String,
    /// Dimension type within the class.
    #[serde(rename = "dim_type", default, deserialize_with = "text_or_empty")]
    pub dim_type: String,
    /// Free-text type used when `dim_type` is `other`.
    #[serde(rename = "other_dim_type", default, deserialize_with = "blank_as_none")]
    pub other_type: Option<String>,
    /// Variable in the script encoding the dimension.
    #[serde(rename = "var_in_code", default, deserialize_with = "blank_as_none")]
    pub code_symbol: Option<String>,
    /// Dummy set used instead of a single variable.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub dummy_set: Option<String>,
}

/// How a dimension is represented in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionCode<'a> {
    /// A single variable.
    Variable(&'a str),
    /// A set of dummies.
    DummySet(&'a str),
}

impl DimensionSpec {
    /// The code representation: the variable if named, else the dummy set.
    pub fn code(&self) -> Option<DimensionCode<'_>> {
        match (&self.code_symbol, &self.dummy_set) {
            (Some(v), _) => Some(DimensionCode::Variable(v.as_str())),
            (None, Some(d)) => Some(DimensionCode::DummySet(d.as_str())),
            (None, None) => None,
        }
    }

    /// The type to show: `other_type` replaces the literal `other`.
    pub fn display_type(&self) -> &str {
        match (&*self.dim_type, &self.other_type) {
            ("other", Some(t)) => t.as_str(),
            (t, _) => t,
        }
    }
}

/// A reported statistic (N, R², ...) with its table and code values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedStat {
    /// Statistic label.
    #[serde(rename = "stat_label", default, deserialize_with = "blank_as_none")]
    pub label: Option<String>,
    /// Value as printed in the table.
    #[serde(rename = "value_table", default)]
    pub table_value: Option<serde_json::Value>,
    /// Value as computed by the code.
    #[serde(rename = "value_code", default)]
    pub code_value: Option<serde_json::Value>,
    /// Table cell holding the statistic.
    #[serde(default, deserialize_with = "blank_id_as_none", skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<CellId>,
}

/// Semantic role of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// Dependent variable (`d`).
    Dependent,
    /// Variable of interest (`x_eff`).
    Effect,
    /// Fixed effect (`fe`).
    FixedEffect,
    /// Control variable (`x_co`).
    Control,
    /// Any other role code.
    Other,
}

impl VariableSpec {
    /// Classify the role code.
    pub fn role_kind(&self) -> VariableRole {
        match self.role.as_str() {
            "d" => VariableRole::Dependent,
            "x_eff" => VariableRole::Effect,
            "fe" => VariableRole::FixedEffect,
            "x_co" => VariableRole::Control,
            _ => VariableRole::Other,
        }
    }
}

/// Display category of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// `main_result`.
    MainResult,
    /// `robustness`.
    Robustness,
    /// Any tag mentioning `experiment`.
    Experiment,
    /// Everything else.
    Other,
}

impl TagKind {
    /// Categorize a tag.
    pub fn of(tag: &str) -> Self {
        match tag {
            "main_result" => Self::MainResult,
            "robustness" => Self::Robustness,
            t if t.contains("experiment") => Self::Experiment,
            _ => Self::Other,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(blank_as_none(deserializer)?.unwrap_or_default())
}

fn blank_id_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + AsRef<str>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.as_ref().is_empty()))
}

/// Tags arrive as a comma-separated string or as an array.
fn tag_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TagSet, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        Joined(String),
        List(Vec<String>),
    }

    let raw = Option::<RawTags>::deserialize(deserializer)?;
    let items: Vec<String> = match raw {
        None => Vec::new(),
        Some(RawTags::Joined(s)) => s.split(',').map(str::to_string).collect(),
        Some(RawTags::List(v)) => v,
    };
    Ok(items
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}
