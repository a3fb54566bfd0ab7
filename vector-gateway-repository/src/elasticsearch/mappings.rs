//! Elasticsearch index settings and mapping bodies.
//!
//! This module builds the creation body for vector indices from a
//! `MappingSpec`.

use serde_json::{json, Map, Value};

use vector_gateway_shared::MappingSpec;

/// Primary shard count for new indices.
const NUMBER_OF_SHARDS: u32 = 1;

/// Replica count for new indices.
const NUMBER_OF_REPLICAS: u32 = 1;

/// Build the creation body for an index described by `mapping`.
///
/// The body includes:
/// - **dense_vector**: One entry per vector field, indexed with the
///   mapping's similarity metric and an exact `dims`
/// - **keyword**: Exact-match fields such as the external id
///
/// Field definitions must sit under the top-level `mappings` key next to
/// `settings`; the engine accepts a body with the definitions at the root
/// without complaint and brings the index up unmapped.
pub fn index_create_body(mapping: &MappingSpec) -> Value {
    let mut properties = Map::new();

    for field in &mapping.vector_fields {
        properties.insert(
            field.name.clone(),
            json!({
                "type": "dense_vector",
                "dims": field.dims,
                "index": true,
                "similarity": mapping.similarity.as_str()
            }),
        );
    }

    for field in &mapping.keyword_fields {
        properties.insert(field.clone(), json!({ "type": "keyword" }));
    }

    json!({
        "settings": {
            "number_of_shards": NUMBER_OF_SHARDS,
            "number_of_replicas": NUMBER_OF_REPLICAS
        },
        "mappings": {
            "properties": properties
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_gateway_shared::{Similarity, VectorFieldSpec};

    fn mapping_with(vector_fields: Vec<VectorFieldSpec>) -> MappingSpec {
        MappingSpec {
            vector_fields,
            keyword_fields: vec!["id".to_string()],
            similarity: Similarity::Cosine,
        }
    }

    #[test]
    fn test_create_body_structure() {
        let mapping = mapping_with(vec![VectorFieldSpec {
            name: "text_embedding".to_string(),
            dims: 384,
        }]);

        let body = index_create_body(&mapping);

        // Check settings exist
        assert!(body["settings"]["number_of_shards"].is_number());
        assert!(body["settings"]["number_of_replicas"].is_number());

        // Check mappings exist
        assert!(body["mappings"]["properties"]["text_embedding"].is_object());
        assert!(body["mappings"]["properties"]["id"].is_object());
    }

    #[test]
    fn test_field_definitions_nest_under_mappings() {
        let mapping = mapping_with(vec![VectorFieldSpec {
            name: "text_embedding".to_string(),
            dims: 384,
        }]);

        let body = index_create_body(&mapping);

        // Definitions placed at the body root would be silently ignored
        assert!(body.get("properties").is_none());
        assert_eq!(
            body["mappings"]["properties"]["text_embedding"]["type"],
            "dense_vector"
        );
    }

    #[test]
    fn test_vector_field_definition() {
        let mapping = MappingSpec {
            vector_fields: vec![VectorFieldSpec {
                name: "image_embedding".to_string(),
                dims: 512,
            }],
            keyword_fields: vec![],
            similarity: Similarity::DotProduct,
        };

        let body = index_create_body(&mapping);
        let field = &body["mappings"]["properties"]["image_embedding"];

        assert_eq!(field["type"], "dense_vector");
        assert_eq!(field["dims"], 512);
        assert_eq!(field["index"], true);
        assert_eq!(field["similarity"], "dot_product");
    }

    #[test]
    fn test_keyword_field_definition() {
        let mapping = mapping_with(vec![]);

        let body = index_create_body(&mapping);

        assert_eq!(body["mappings"]["properties"]["id"]["type"], "keyword");
    }

    #[test]
    fn test_multiple_vector_fields() {
        let mapping = mapping_with(vec![
            VectorFieldSpec {
                name: "text_embedding".to_string(),
                dims: 384,
            },
            VectorFieldSpec {
                name: "image_embedding".to_string(),
                dims: 512,
            },
        ]);

        let body = index_create_body(&mapping);
        let properties = body["mappings"]["properties"].as_object().unwrap();

        assert_eq!(properties.len(), 3);
        assert_eq!(properties["text_embedding"]["dims"], 384);
        assert_eq!(properties["image_embedding"]["dims"], 512);
    }
}
