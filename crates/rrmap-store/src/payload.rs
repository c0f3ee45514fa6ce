//! # Snapshot Payload Schema
//!
//! Serde schema of one mapping payload as emitted by the report generator:
//!
//! ```text
//! cell_map          { <cell_id>: { regid?, runid?, script_num?, code_line?, value? } }
//! reg_info          { <regid>: { color?, cell_ids, tabid? } }
//! code_locations    [ [runid|null, script_num, code_line], ... ]
//! cell_to_code_idx  { <cell_id>: <index into code_locations> }
//! code_to_cells     { "s<script>_l<line>": { tabid?, regid?, cell_ids } }
//! wrong_number_info [ { cellid, tabid, wrong_number, number_in_log, runid?, script_num?, code_line? } ]
//! ```
//!
//! Decoding only checks shape. Cross-reference checks happen in
//! [`MappingStore::load`](crate::store::MappingStore::load). Objects are
//! decoded into ordered entry lists so that a key repeated inside
//! `cell_map` survives decoding and can be rejected there.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use rrmap_core::{CellId, Color, MalformedSnapshot, RegressionId, RunId, TableId};

/// One mapping payload, decoded but not yet validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPayload {
    /// Per-cell metadata, in payload order.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub cell_map: Vec<(CellId, CellEntry)>,
    /// Regression groups, in payload order.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub reg_info: Vec<(RegressionId, RegInfoEntry)>,
    /// Shared table of code locations.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code_locations: Vec<RawCodeLocation>,
    /// Cell to index into `code_locations`.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub cell_to_code_idx: Vec<(CellId, usize)>,
    /// Inverse index from `s<script>_l<line>` keys to cells.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub code_to_cells: Vec<(String, CodeLinkEntry)>,
    /// Known mismatches between table and log.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wrong_number_info: Vec<WrongNumberEntry>,
}

impl SnapshotPayload {
    /// Decode a payload from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MalformedSnapshot> {
        serde_json::from_slice(bytes).map_err(|e| MalformedSnapshot::Decode(e.to_string()))
    }

    /// Decode a payload from JSON text.
    pub fn from_json(text: &str) -> Result<Self, MalformedSnapshot> {
        Self::from_slice(text.as_bytes())
    }
}

/// Metadata of one cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellEntry {
    /// Regression the cell belongs to.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub regid: Option<RegressionId>,
    /// Run whose log holds the cell's value.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub runid: Option<RunId>,
    /// Script that produced the value.
    #[serde(default, deserialize_with = "loose_index")]
    pub script_num: Option<u32>,
    /// Line within `script_num`.
    #[serde(default, deserialize_with = "loose_index")]
    pub code_line: Option<u32>,
    /// Value as rendered in the table.
    #[serde(default, deserialize_with = "loose_text")]
    pub value: Option<String>,
}

/// One regression group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegInfoEntry {
    /// Display color.
    #[serde(default)]
    pub color: Option<Color>,
    /// Member cells. `None` when the key is absent.
    #[serde(default, deserialize_with = "cell_id_list")]
    pub cell_ids: Option<Vec<CellId>>,
    /// Table the regression is reported in.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub tabid: Option<TableId>,
}

/// `[runid|null, script_num, code_line]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCodeLocation(
    #[serde(deserialize_with = "blank_id_as_none")] pub Option<RunId>,
    #[serde(deserialize_with = "strict_index")] pub u32,
    #[serde(deserialize_with = "strict_index")] pub u32,
);

/// Cells produced by one code line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeLinkEntry {
    /// Table holding the cells.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub tabid: Option<TableId>,
    /// Regression estimated on that line.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub regid: Option<RegressionId>,
    /// Cells, in payload order.
    #[serde(default, deserialize_with = "cell_id_list")]
    pub cell_ids: Option<Vec<CellId>>,
}

/// One mismatch between table and log.
#[derive(Debug, Clone, Deserialize)]
pub struct WrongNumberEntry {
    /// Affected cell. Missing or blank ids are rejected at load.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub cellid: Option<CellId>,
    /// Table of the cell.
    pub tabid: TableId,
    /// Value printed in the table.
    #[serde(default, deserialize_with = "loose_text")]
    pub wrong_number: Option<String>,
    /// Value found in the log.
    #[serde(default, deserialize_with = "loose_text")]
    pub number_in_log: Option<String>,
    /// Run whose log was compared.
    #[serde(default, deserialize_with = "blank_id_as_none")]
    pub runid: Option<RunId>,
    /// Script that printed the value.
    #[serde(default, deserialize_with = "loose_index")]
    pub script_num: Option<u32>,
    /// Line within `script_num`.
    #[serde(default, deserialize_with = "loose_index")]
    pub code_line: Option<u32>,
}

/// JSON object decoded as an ordered list of entries, repeats included.
pub(crate) struct OrderedEntries<K, V>(pub(crate) Vec<(K, V)>);

impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<K, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<K, V> {
            type Value = OrderedEntries<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

pub(crate) fn ordered_entries<'de, D, K, V>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    Ok(Option::<OrderedEntries<K, V>>::deserialize(deserializer)?
        .map(|e| e.0)
        .unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_id_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + AsRef<str>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.as_ref().is_empty()))
}

/// A number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseIndex {
    Number(u32),
    Text(String),
}

fn strict_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match LooseIndex::deserialize(deserializer)? {
        LooseIndex::Number(n) => Ok(n),
        LooseIndex::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a script or line number"))),
    }
}

fn loose_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match Option::<LooseIndex>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseIndex::Number(n)) => Ok(Some(n)),
        Some(LooseIndex::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(LooseIndex::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a script or line number"))),
    }
}

/// Displayed numbers arrive as strings or as JSON numbers.
fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Cell lists arrive as `"c1,c2"` or `["c1", "c2"]`. Blank items are dropped.
fn cell_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<CellId>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawList {
        Joined(String),
        List(Vec<CellId>),
    }

    let ids = match Option::<RawList>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawList::Joined(s)) => s.split(',').map(CellId::new).collect::<Vec<_>>(),
        Some(RawList::List(v)) => v,
    };
    Ok(Some(ids.into_iter().filter(|c| !c.is_blank()).collect()))
}
