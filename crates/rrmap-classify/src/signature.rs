//! # Structural Signatures
//!
//! The structure of a regression is its tags, its variables without the
//! estimate cell link, and its resolved dimensions. The signature is the
//! canonical (RFC 8785) serialization of exactly those fields, so two
//! records compare equal iff their structures do. Field order in the
//! source JSON, or in these structs, has no influence on the bytes.

use serde::Serialize;

use rrmap_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest};

use crate::record::{DimensionSpec, TagSet, VariableSpec};

/// Variable fields that take part in a signature.
#[derive(Serialize)]
struct VariableShape<'a> {
    role: &'a str,
    article_label: Option<&'a str>,
    code_symbol: Option<&'a str>,
    unit: Option<&'a str>,
}

impl<'a> From<&'a VariableSpec> for VariableShape<'a> {
    fn from(v: &'a VariableSpec) -> Self {
        Self {
            role: &v.role,
            article_label: v.article_label.as_deref(),
            code_symbol: v.code_symbol.as_deref(),
            unit: v.unit.as_deref(),
        }
    }
}

/// Dimension fields that take part in a signature.
#[derive(Serialize)]
struct DimensionShape<'a> {
    class: &'a str,
    dim_type: &'a str,
    other_type: Option<&'a str>,
    code_symbol: Option<&'a str>,
    dummy_set: Option<&'a str>,
}

impl<'a> From<&'a DimensionSpec> for DimensionShape<'a> {
    fn from(d: &'a DimensionSpec) -> Self {
        Self {
            class: &d.class,
            dim_type: &d.dim_type,
            other_type: d.other_type.as_deref(),
            code_symbol: d.code_symbol.as_deref(),
            dummy_set: d.dummy_set.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct SignatureBody<'a> {
    tags: &'a TagSet,
    variables: Vec<VariableShape<'a>>,
    dimensions: Vec<DimensionShape<'a>>,
}

/// Canonical comparison key of a regression's structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralSignature {
    canonical: CanonicalBytes,
    digest: ContentDigest,
}

impl StructuralSignature {
    /// Compute the signature of a structure.
    ///
    /// Variable order and dimension order are significant; tags are a set.
    pub fn compute(
        tags: &TagSet,
        variables: &[VariableSpec],
        dimensions: &[DimensionSpec],
    ) -> Result<Self, CanonicalizationError> {
        let body = SignatureBody {
            tags,
            variables: variables.iter().map(VariableShape::from).collect(),
            dimensions: dimensions.iter().map(DimensionShape::from).collect(),
        };
        let canonical = CanonicalBytes::new(&body)?;
        let digest = sha256_digest(&canonical);
        Ok(Self { canonical, digest })
    }

    /// The canonical JSON text used as comparison key.
    pub fn key(&self) -> &str {
        self.canonical.as_str()
    }

    /// SHA-256 of the canonical key.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Short id for display.
    pub fn short_id(&self) -> String {
        self.digest.short_hex(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rrmap_core::CellId;

    fn var(role: &str, code: &str, cell: Option<&str>) -> VariableSpec {
        VariableSpec {
            role: role.into(),
            article_label: None,
            code_symbol: Some(code.into()),
            unit: None,
            estimate_cell: cell.map(CellId::new),
        }
    }

    fn tags(items: &[&str]) -> TagSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn estimate_cell_does_not_affect_signature() {
        let a = StructuralSignature::compute(&tags(&[]), &[var("x_eff", "treat", Some("c1_r1_c1"))], &[]).unwrap();
        let b = StructuralSignature::compute(&tags(&[]), &[var("x_eff", "treat", Some("c1_r1_c2"))], &[]).unwrap();
        assert_eq!(a, b);
        assert!(!a.key().contains("c1_r1"));
    }

    #[test]
    fn variable_order_is_significant() {
        let v1 = [var("d", "y", None), var("x_eff", "x", None)];
        let v2 = [var("x_eff", "x", None), var("d", "y", None)];
        let a = StructuralSignature::compute(&tags(&[]), &v1, &[]).unwrap();
        let b = StructuralSignature::compute(&tags(&[]), &v2, &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tag_order_is_not() {
        let a = StructuralSignature::compute(&tags(&["b", "a"]), &[], &[]).unwrap();
        let b = StructuralSignature::compute(&tags(&["a", "b"]), &[], &[]).unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.short_id().len(), 12);
    }

    #[test]
    fn key_is_sorted_compact_json() {
        let s = StructuralSignature::compute(&tags(&["main_result"]), &[], &[]).unwrap();
        assert_eq!(s.key(), r#"{"dimensions":[],"tags":["main_result"],"variables":[]}"#);
    }
}
