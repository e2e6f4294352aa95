use crate::core::error::EngineError;
use crate::model::{Collection, CollectionItem, Flow, RequestTemplate};

/// Splits a `"<collectionId>:<itemId>"` reference. Bare ids yield no scope.
fn split_reference(reference_id: &str) -> (Option<&str>, &str) {
    match reference_id.split_once(':') {
        Some((scope, id)) if !scope.is_empty() && !id.is_empty() => (Some(scope), id),
        _ => (None, reference_id),
    }
}

fn find_in_items<'a>(items: &'a [CollectionItem], id: &str) -> Option<&'a RequestTemplate> {
    for item in items {
        match item {
            CollectionItem::Request(template) if template.id == id => return Some(template),
            CollectionItem::Request(_) => {}
            CollectionItem::Folder { items, .. } => {
                if let Some(found) = find_in_items(items, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

pub fn find_request<'a>(
    collections: &'a [Collection],
    reference_id: &str,
) -> Result<&'a RequestTemplate, EngineError> {
    let (collection_id, item_id) = split_reference(reference_id);
    let found = match collection_id {
        Some(collection_id) => collections
            .iter()
            .find(|collection| collection.id == collection_id)
            .and_then(|collection| find_in_items(&collection.items, item_id)),
        None => collections
            .iter()
            .find_map(|collection| find_in_items(&collection.items, item_id)),
    };
    found.ok_or_else(|| EngineError::RequestNotFound(reference_id.to_string()))
}

pub fn find_flow<'a>(flows: &'a [Flow], reference_id: &str) -> Result<&'a Flow, EngineError> {
    let (_, flow_id) = split_reference(reference_id);
    flows
        .iter()
        .find(|flow| flow.id == flow_id || flow.id == reference_id)
        .ok_or_else(|| EngineError::FlowNotFound(reference_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;

    fn request(id: &str) -> CollectionItem {
        CollectionItem::Request(RequestTemplate::new(id, HttpMethod::GET, format!("/{id}")))
    }

    fn collections() -> Vec<Collection> {
        vec![
            Collection {
                id: "c1".into(),
                name: "First".into(),
                items: vec![
                    request("r1"),
                    CollectionItem::Folder {
                        id: "f1".into(),
                        name: "Nested".into(),
                        items: vec![CollectionItem::Folder {
                            id: "f2".into(),
                            name: "Deeper".into(),
                            items: vec![request("deep")],
                        }],
                    },
                ],
            },
            Collection {
                id: "c2".into(),
                name: "Second".into(),
                items: vec![request("r2"), request("shared")],
            },
        ]
    }

    #[test]
    fn test_find_request_scoped() {
        let collections = collections();
        assert_eq!(find_request(&collections, "c1:r1").unwrap().url, "/r1");
        assert_eq!(find_request(&collections, "c1:deep").unwrap().id, "deep");
        // scoped lookups never leak into other collections
        assert!(matches!(
            find_request(&collections, "c1:r2"),
            Err(EngineError::RequestNotFound(reference)) if reference == "c1:r2"
        ));
    }

    #[test]
    fn test_find_request_bare_id_searches_all() {
        let collections = collections();
        assert_eq!(find_request(&collections, "r2").unwrap().id, "r2");
        assert_eq!(find_request(&collections, "deep").unwrap().id, "deep");
        assert!(find_request(&collections, "nope").is_err());
    }

    #[test]
    fn test_find_request_folder_id_is_not_a_request() {
        let collections = collections();
        assert!(find_request(&collections, "c1:f1").is_err());
    }

    #[test]
    fn test_find_flow() {
        let flows = vec![Flow {
            id: "login".into(),
            name: "Login".into(),
            nodes: vec![],
            connections: vec![],
        }];
        assert_eq!(find_flow(&flows, "login").unwrap().id, "login");
        assert_eq!(find_flow(&flows, "flows:login").unwrap().id, "login");
        assert_eq!(
            find_flow(&flows, "other").unwrap_err().to_string(),
            "Flow not found: other"
        );
    }
}
