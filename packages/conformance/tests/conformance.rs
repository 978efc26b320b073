//! End-to-end conformance tests for the hypermedia demo service.
//!
//! Each test spawns an ephemeral in-process service (real TCP, real HTTP) via
//! [`hypermedia_conformance::spawn_server`] and drives it with a `reqwest`
//! client that only follows links and templates found in the responses.
//!
//! # Coverage
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `hal_forms_collection_reads_back` | HAL-FORMS rendering + client-side deserialisation |
//! | `follow_self_link_and_submit_default_template` | Link discovery, template-driven update |
//! | `create_then_delete` | `POST` → `Location`, `DELETE`, 404 body |
//! | `every_format_round_trips_an_entity` | All four formats through the codec |
//! | `uber_collection_reads_back` | UBER collection deserialisation |
//! | `collection_json_template_drives_create` | Collection+JSON template-driven create |
//! | `search_link_is_a_uri_template` | Templated links expanded by the client |

use hypermedia::{MediaType, UriTemplate};
use hypermedia_conformance::spawn_server;
use hypermedia_mediatype::{HalLinkDiscoverer, HypermediaCodec};
use hypermedia_server::demo::Employee;
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn get_text(client: &reqwest::Client, url: &str) -> (reqwest::StatusCode, String) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    (status, resp.text().await.unwrap())
}

// ---------------------------------------------------------------------------
// HAL-FORMS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hal_forms_collection_reads_back() {
    let (base, _store) = spawn_server(MediaType::HalForms).await;
    let client = make_client();

    let resp = client.get(format!("{base}/employees")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "application/prs.hal-forms+json"
    );
    let text = resp.text().await.unwrap();

    let model = HypermediaCodec::new()
        .read_collection::<Employee>(MediaType::HalForms, &text)
        .unwrap();
    let names: Vec<&str> = model.values().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Frodo Baggins", "Bilbo Baggins"]);
    assert_eq!(
        model.links.get_link("self").map(|l| l.href.clone()),
        Some(format!("{base}/employees"))
    );
}

#[tokio::test]
async fn follow_self_link_and_submit_default_template() {
    let (base, store) = spawn_server(MediaType::HalForms).await;
    let client = make_client();

    let (_, collection) = get_text(&client, &format!("{base}/employees")).await;
    let collection: Value = serde_json::from_str(&collection).unwrap();
    let first = &collection["_embedded"]["employees"][0];
    let item_url = HalLinkDiscoverer
        .find_link_with_rel("self", &first.to_string())
        .unwrap()
        .expect("embedded item has a self link")
        .href;

    let (status, item) = get_text(&client, &item_url).await;
    assert_eq!(status, 200);
    let item: Value = serde_json::from_str(&item).unwrap();
    let template = &item["_templates"]["default"];
    assert_eq!(template["method"], "PUT");

    // Fill every advertised property from the current state, then change one.
    let mut body = Map::new();
    for property in template["properties"].as_array().unwrap() {
        let name = property["name"].as_str().unwrap();
        body.insert(name.to_string(), item[name].clone());
    }
    body.insert("role".into(), json!("gardener"));

    let method = reqwest::Method::from_bytes(template["method"].as_str().unwrap().as_bytes())
        .unwrap();
    let resp = client
        .request(method, &item_url)
        .json(&Value::Object(body))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(store.get(1).unwrap().role, "gardener");
}

#[tokio::test]
async fn create_then_delete() {
    let (base, store) = spawn_server(MediaType::HalForms).await;
    let client = make_client();

    let resp = client
        .post(format!("{base}/employees"))
        .json(&json!({ "name": "Samwise Gamgee", "role": "gardener" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let location = resp.headers()["location"].to_str().unwrap().to_string();
    assert_eq!(location, format!("{base}/employees/3"));

    let resp = client.delete(&location).send().await.unwrap();
    assert_eq!(resp.status(), 204);
    assert!(store.get(3).is_none());

    let resp = client.get(&location).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}

// ---------------------------------------------------------------------------
// All formats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_format_round_trips_an_entity() {
    let codec = HypermediaCodec::new();
    let client = make_client();
    for media in MediaType::ALL {
        let (base, _store) = spawn_server(media).await;
        let resp = client.get(format!("{base}/employees/1")).send().await.unwrap();
        assert_eq!(resp.status(), 200, "{media}");
        assert_eq!(resp.headers()["content-type"], media.mime(), "{media}");
        let text = resp.text().await.unwrap();

        let model = codec.read_entity::<Employee>(media, &text).unwrap();
        assert_eq!(model.content.name, "Frodo Baggins", "{media}");
        assert_eq!(
            model.links.get_link("self").map(|l| l.href.clone()),
            Some(format!("{base}/employees/1")),
            "{media}"
        );
    }
}

#[tokio::test]
async fn uber_collection_reads_back() {
    let (base, _store) = spawn_server(MediaType::Uber).await;
    let (status, text) = get_text(&make_client(), &format!("{base}/employees")).await;
    assert_eq!(status, 200);
    let model = HypermediaCodec::new()
        .read_collection::<Employee>(MediaType::Uber, &text)
        .unwrap();
    assert_eq!(model.len(), 2);
}

#[tokio::test]
async fn collection_json_template_drives_create() {
    let (base, store) = spawn_server(MediaType::CollectionJson).await;
    let client = make_client();

    let (_, text) = get_text(&client, &format!("{base}/employees")).await;
    let doc: Value = serde_json::from_str(&text).unwrap();
    let collection = &doc["collection"];
    let href = collection["href"].as_str().unwrap().to_string();

    let mut body = Map::new();
    for field in collection["template"]["data"].as_array().unwrap() {
        let name = field["name"].as_str().unwrap();
        let value = match name {
            "name" => "Peregrin Took",
            "role" => "guard",
            _ => "",
        };
        body.insert(name.to_string(), json!(value));
    }

    let resp = client.post(&href).json(&Value::Object(body)).send().await.unwrap();
    assert_eq!(resp.status(), 201);
    assert_eq!(store.search(Some("peregrin"), None).len(), 1);
}

#[tokio::test]
async fn search_link_is_a_uri_template() {
    let (base, _store) = spawn_server(MediaType::Hal).await;
    let client = make_client();

    let (_, text) = get_text(&client, &format!("{base}/employees")).await;
    let search = HalLinkDiscoverer
        .find_link_with_rel("search", &text)
        .unwrap()
        .expect("collection links to search");
    assert!(search.is_templated());

    let url = UriTemplate::new(search.href).expand(
        &[("role".to_string(), "burglar".to_string())]
            .into_iter()
            .collect(),
    );
    assert_eq!(url, format!("{base}/employees/search?role=burglar"));

    let (status, text) = get_text(&client, &url).await;
    assert_eq!(status, 200);
    let model = HypermediaCodec::new()
        .read_collection::<Employee>(MediaType::Hal, &text)
        .unwrap();
    let names: Vec<&str> = model.values().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Bilbo Baggins"]);
}
