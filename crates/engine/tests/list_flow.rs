use std::sync::Arc;
use std::time::Duration;

use atlas_api::{HttpReply, ProviderEndpoints};
use atlas_engine::listing::{ListView, PageControl, ParameterStore, project};
use atlas_engine::{CacheEventKind, QueryClient, QueryTtls, ScriptedReply, ScriptedTransport};
use serde_json::{Value, json};

const RESTRICTED_LIST: &str = "/all?fields=name,region,capital,flags,cca2,cca3,capitalInfo,latlng";

fn country(common: &str, region: &str) -> Value {
    json!({ "name": { "common": common }, "region": region, "cca3": common.chars().take(3).collect::<String>().to_uppercase() })
}

/// 250 countries in reverse order, France among them.
fn full_registry() -> Value {
    let mut entries: Vec<Value> = (0..249).map(|index| country(&format!("Country {index:03}"), "Asia")).collect();
    entries.push(country("France", "Europe"));
    entries.reverse();
    Value::Array(entries)
}

fn client(transport: &Arc<ScriptedTransport>) -> QueryClient {
    QueryClient::new(transport.clone(), Arc::new(ProviderEndpoints::default()), QueryTtls::default())
}

#[tokio::test]
async fn rejected_field_selection_falls_back_to_the_full_list() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(
        RESTRICTED_LIST,
        ScriptedReply::Reply(HttpReply::new(400, r#"{"status":400,"message":"'fields' query not specified"}"#)),
    );
    transport.respond("/all", ScriptedReply::json(200, full_registry()));

    let entities = client(&transport).all_countries().await.expect("countries");

    assert_eq!(entities.len(), 250);
    let names: Vec<&str> = entities.iter().map(|entity| entity.name.common.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(names[0], "Country 000");
    assert_eq!(names[249], "France");

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.ends_with(RESTRICTED_LIST), "{}", requests[0].url);
    assert!(requests[1].url.ends_with("/all"), "{}", requests[1].url);
}

#[tokio::test]
async fn out_of_range_page_is_clamped_and_written_back() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(RESTRICTED_LIST, ScriptedReply::json(200, full_registry()));

    let entities = client(&transport).all_countries().await.expect("countries");
    let store = ParameterStore::from_query_string("?query=fra&region=Europe&page=5&pageSize=20");
    let mut changes = store.subscribe();

    let projection = project(&entities, &store.snapshot());
    assert_eq!(projection.filtered_len, 1);
    assert_eq!(projection.total_pages, 1);
    assert_eq!(projection.page, 1);
    assert_eq!(projection.items[0].name.common, "France");
    assert_eq!(projection.controls, vec![PageControl::Page(1)]);
    assert!(!projection.has_previous() && !projection.has_next());

    assert!(store.reconcile(&projection));
    assert!(changes.has_changed().expect("store alive"));
    assert_eq!(store.snapshot().page, 1);
    assert_eq!(store.to_query_string(), "query=fra&region=Europe");
}

#[tokio::test]
async fn list_view_refresh_keeps_the_store_canonical() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(RESTRICTED_LIST, ScriptedReply::json(200, full_registry()));

    let entities = client(&transport).all_countries().await.expect("countries");
    let view = ListView::new(ParameterStore::from_query_string("region=Asia&page=40"), entities);

    let projection = view.refresh();
    assert_eq!(projection.filtered_len, 249);
    assert_eq!(projection.total_pages, 13);
    assert_eq!(projection.page, 13);
    assert_eq!(projection.items.len(), 9);
    assert_eq!(
        projection.controls,
        vec![PageControl::Page(1), PageControl::Ellipsis, PageControl::Page(12), PageControl::Page(13)]
    );
    assert_eq!(view.store().to_query_string(), "region=Asia&page=13");

    view.store().set_query("country 24");
    let projection = view.refresh();
    // Country 240 through Country 248.
    assert_eq!(projection.filtered_len, 9);
    assert_eq!(projection.page, 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_list_requests_share_one_fetch() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(
        RESTRICTED_LIST,
        ScriptedReply::json(200, full_registry()).delayed(Duration::from_millis(300)),
    );
    let client = client(&transport);

    let (first, second, third) = tokio::join!(client.all_countries(), client.all_countries(), client.all_countries());

    let first = first.expect("first");
    assert!(Arc::ptr_eq(&first, &second.expect("second")));
    assert!(Arc::ptr_eq(&first, &third.expect("third")));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn country_list_is_refetched_after_its_lifetime() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(RESTRICTED_LIST, ScriptedReply::json(200, full_registry()));
    let client = client(&transport);
    let mut events = client.subscribe();

    client.all_countries().await.expect("initial");
    tokio::time::advance(Duration::from_secs(9 * 60)).await;
    client.all_countries().await.expect("still fresh");
    assert_eq!(transport.request_count(), 1);

    tokio::time::advance(Duration::from_secs(2 * 60)).await;
    client.all_countries().await.expect("expired");
    assert_eq!(transport.request_count(), 2);

    let stored = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| event.kind == CacheEventKind::Stored { ok: true })
        .count();
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn failing_list_is_reported_with_both_attempts() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(RESTRICTED_LIST, ScriptedReply::Reply(HttpReply::new(400, "bad fields")));
    transport.respond("/all", ScriptedReply::NetworkFailure("connection reset".into()));

    let error = client(&transport).all_countries().await.expect_err("both attempts fail");
    assert!(error.to_string().contains("connection reset"), "{error}");
    assert_eq!(transport.request_count(), 2);
}
