//! Integration tests for the metaobject query track.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use shopify_orm::client::{GraphqlTransport, TransportError};
use shopify_orm::loader::Loader;
use shopify_orm::query::Conditions;
use shopify_orm::relation::PageArgs;
use shopify_orm::schema::{AttributeConfig, AttributeKind, ModelSchema, Registry};
use shopify_orm::OrmError;

#[derive(Clone)]
struct MockTransport {
    inner: Arc<MockInner>,
}

struct MockInner {
    responses: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    fn new(responses: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl GraphqlTransport for MockTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .push((query.to_string(), variables));
        let response = self.inner.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| json!({ "data": {} })))
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(
        ModelSchema::builder("Faq")
            .metaobject("faq")
            .attribute(AttributeConfig::new("question", AttributeKind::String))
            .attribute(AttributeConfig::new("answer", AttributeKind::String))
            .build(),
    );
    registry
}

fn loader(transport: MockTransport) -> Loader<MockTransport> {
    Loader::builder()
        .transport(transport)
        .registry(registry())
        .build()
        .unwrap()
}

fn faq_node(id: u32, question: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Metaobject/{id}"),
        "handle": format!("faq-{id}"),
        "displayName": question,
        "type": "faq",
        "question": {"value": question},
        "fields": [
            {"key": "question", "value": "shadowed by the alias"},
            {"key": "answer", "value": "42"}
        ]
    })
}

#[tokio::test]
async fn test_metaobjects_query_the_generic_root_with_a_quoted_type() {
    let transport = MockTransport::new(vec![json!({
        "data": {
            "metaobjects": {
                "pageInfo": {
                    "hasNextPage": false,
                    "hasPreviousPage": false,
                    "startCursor": "a",
                    "endCursor": "b"
                },
                "nodes": [faq_node(1, "Where is my order?")]
            }
        }
    })]);
    let loader = loader(transport.clone());

    let faqs = loader.metaobjects("Faq").unwrap().to_vec().await.unwrap();
    assert_eq!(faqs.len(), 1);

    let (query, _) = &transport.requests()[0];
    assert!(query.starts_with("query { metaobjects(type: \"faq\", first: 50)"));
    assert!(query.contains("question: field(key: \"question\") { value }"));
}

#[tokio::test]
async fn test_aliased_keys_win_over_the_fields_array() {
    let transport = MockTransport::new(vec![json!({
        "data": {
            "metaobjects": {
                "pageInfo": {
                    "hasNextPage": false,
                    "hasPreviousPage": false,
                    "startCursor": "a",
                    "endCursor": "b"
                },
                "nodes": [faq_node(1, "Where is my order?")]
            }
        }
    })]);
    let loader = loader(transport);

    let faqs = loader.metaobjects("Faq").unwrap().to_vec().await.unwrap();
    let faq = &faqs[0];
    // "question" is present both aliased and in the fields array
    assert_eq!(faq.get("question").unwrap().as_str(), Some("Where is my order?"));
    // "answer" only appears in the fields array
    assert_eq!(faq.get("answer").unwrap().as_str(), Some("42"));
    assert_eq!(faq.handle(), Some("faq-1"));
    assert_eq!(faq.type_name(), Some("faq"));
}

#[tokio::test]
async fn test_find_queries_the_metaobject_root_by_gid() {
    let transport = MockTransport::new(vec![json!({
        "data": { "metaobject": faq_node(9, "How do returns work?") }
    })]);
    let loader = loader(transport.clone());

    let faq = loader.metaobjects("Faq").unwrap().find("9").await.unwrap();
    assert_eq!(faq.id(), Some("gid://shopify/Metaobject/9"));
    assert_eq!(faq.display_name(), Some("How do returns work?"));

    let (query, variables) = &transport.requests()[0];
    assert!(query.starts_with("query($id: ID!) { metaobject(id: $id)"));
    assert_eq!(variables["id"], "gid://shopify/Metaobject/9");
}

#[tokio::test]
async fn test_find_raises_not_found_on_a_null_node() {
    let transport = MockTransport::new(vec![json!({ "data": { "metaobject": null } })]);
    let loader = loader(transport);

    let error = loader
        .metaobjects("Faq")
        .unwrap()
        .find("9")
        .await
        .unwrap_err();
    assert!(matches!(error, OrmError::NotFound { .. }));
}

#[tokio::test]
async fn test_metaobject_paging_honors_the_total_limit() {
    let page = |ids: &[u32], has_next: bool, cursor: &str| {
        json!({
            "data": {
                "metaobjects": {
                    "pageInfo": {
                        "hasNextPage": has_next,
                        "hasPreviousPage": false,
                        "startCursor": "s",
                        "endCursor": cursor
                    },
                    "nodes": ids.iter().map(|id| faq_node(*id, "q")).collect::<Vec<_>>()
                }
            }
        })
    };
    let transport = MockTransport::new(vec![
        page(&[1, 2], true, "c2"),
        page(&[3, 4], true, "c4"),
    ]);
    let loader = loader(transport.clone());
    let relation = loader.metaobjects("Faq").unwrap().limit(3).per_page(2);

    let faqs = relation.to_vec().await.unwrap();
    assert_eq!(faqs.len(), 3);
    assert_eq!(transport.requests().len(), 2);
    assert!(transport.requests()[1].0.contains("after: \"c2\""));
}

#[tokio::test]
async fn test_metaobject_conditions_render_into_the_query_argument() {
    let transport = MockTransport::new(vec![json!({ "data": { "metaobjects": null } })]);
    let loader = loader(transport.clone());
    let relation = loader
        .metaobjects("Faq")
        .unwrap()
        .filter(Conditions::raw("display_name:returns"))
        .unwrap();

    let page = relation.fetch_page(PageArgs::default()).await.unwrap();
    assert!(page.is_empty());
    assert!(transport.requests()[0]
        .0
        .contains("query: \"display_name:returns\""));
}
