//! Index mapping specifications.
//!
//! A `MappingSpec` describes the fields a vector index is created with.
//! It can be configured explicitly or inferred from the first document of
//! a batch.

use serde::{Deserialize, Serialize};

use crate::document::VectorDocument;

/// Similarity metric used when indexing vector fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Dot product.
    DotProduct,
    /// Euclidean distance.
    L2Norm,
}

impl Similarity {
    /// The engine-side name of the similarity metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Similarity::Cosine => "cosine",
            Similarity::DotProduct => "dot_product",
            Similarity::L2Norm => "l2_norm",
        }
    }
}

/// One vector field of an index mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorFieldSpec {
    /// Field name.
    pub name: String,
    /// Dimensionality every document must match exactly.
    pub dims: usize,
}

/// The fields a vector index is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Vector fields, each indexed as a dense_vector.
    pub vector_fields: Vec<VectorFieldSpec>,
    /// Exact-match fields, such as the external id.
    pub keyword_fields: Vec<String>,
    /// Similarity metric shared by all vector fields.
    pub similarity: Similarity,
}

impl MappingSpec {
    /// Derive a mapping from a document: every vector-shaped field becomes
    /// a dense_vector with its observed dimensionality, and the external
    /// id is mapped as a keyword.
    pub fn infer_from(document: &VectorDocument, similarity: Similarity) -> Self {
        let vector_fields = document
            .vector_fields()
            .into_iter()
            .map(|(name, dims)| VectorFieldSpec {
                name: name.to_string(),
                dims,
            })
            .collect();

        Self {
            vector_fields,
            keyword_fields: vec!["id".to_string()],
            similarity,
        }
    }

    /// Check that a document carries exactly the mapped vector fields with
    /// matching dimensionalities.
    ///
    /// A missing mapped field, a dimensionality mismatch, and a
    /// vector-shaped field the mapping does not know are all rejected.
    pub fn check_document(&self, document: &VectorDocument) -> Result<(), String> {
        for field in &self.vector_fields {
            match document.vector_dims(&field.name) {
                Some(dims) if dims == field.dims => {}
                Some(dims) => {
                    return Err(format!(
                        "field {} has {} dimensions, mapping expects {}",
                        field.name, dims, field.dims
                    ));
                }
                None => {
                    return Err(format!(
                        "field {} is missing or not a numeric vector",
                        field.name
                    ));
                }
            }
        }

        for (name, _) in document.vector_fields() {
            if !self.vector_fields.iter().any(|field| field.name == name) {
                return Err(format!("unmapped vector field {}", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> VectorDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_similarity_names() {
        assert_eq!(Similarity::Cosine.as_str(), "cosine");
        assert_eq!(Similarity::DotProduct.as_str(), "dot_product");
        assert_eq!(Similarity::L2Norm.as_str(), "l2_norm");
        assert_eq!(Similarity::default(), Similarity::Cosine);
    }

    #[test]
    fn test_infer_from_document() {
        let document = doc(json!({
            "text_embedding": [0.1, 0.2, 0.3],
            "image_embedding": [0.1, 0.2],
            "title": "hello"
        }));

        let mapping = MappingSpec::infer_from(&document, Similarity::Cosine);

        assert_eq!(mapping.vector_fields.len(), 2);
        assert!(mapping.vector_fields.contains(&VectorFieldSpec {
            name: "text_embedding".to_string(),
            dims: 3,
        }));
        assert!(mapping.vector_fields.contains(&VectorFieldSpec {
            name: "image_embedding".to_string(),
            dims: 2,
        }));
        assert_eq!(mapping.keyword_fields, vec!["id".to_string()]);
        assert_eq!(mapping.similarity, Similarity::Cosine);
    }

    #[test]
    fn test_infer_from_document_without_vectors() {
        let document = doc(json!({ "title": "hello" }));

        let mapping = MappingSpec::infer_from(&document, Similarity::Cosine);

        assert!(mapping.vector_fields.is_empty());
    }

    #[test]
    fn test_check_document_accepts_matching_fields() {
        let mapping = MappingSpec::infer_from(
            &doc(json!({ "text_embedding": [0.1, 0.2, 0.3] })),
            Similarity::Cosine,
        );

        let result = mapping.check_document(&doc(json!({
            "text_embedding": [0.4, 0.5, 0.6],
            "city": "Lisbon"
        })));

        assert!(result.is_ok());
    }

    #[test]
    fn test_check_document_rejects_dims_mismatch() {
        let mapping = MappingSpec::infer_from(
            &doc(json!({ "text_embedding": [0.1, 0.2, 0.3] })),
            Similarity::Cosine,
        );

        let result = mapping.check_document(&doc(json!({ "text_embedding": [0.1, 0.2] })));

        let reason = result.unwrap_err();
        assert!(reason.contains("text_embedding"));
        assert!(reason.contains("2 dimensions"));
    }

    #[test]
    fn test_check_document_rejects_missing_vector_field() {
        let mapping = MappingSpec::infer_from(
            &doc(json!({ "text_embedding": [0.1, 0.2, 0.3] })),
            Similarity::Cosine,
        );

        let result = mapping.check_document(&doc(json!({ "title": "no vectors here" })));

        assert!(result.unwrap_err().contains("text_embedding"));
    }

    #[test]
    fn test_check_document_rejects_unmapped_vector_field() {
        let mapping = MappingSpec::infer_from(
            &doc(json!({ "text_embedding": [0.1, 0.2, 0.3] })),
            Similarity::Cosine,
        );

        let result = mapping.check_document(&doc(json!({
            "text_embedding": [0.1, 0.2, 0.3],
            "image_embedding": [0.9, 0.9]
        })));

        assert!(result.unwrap_err().contains("image_embedding"));
    }
}
