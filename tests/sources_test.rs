//! Description sources and the fallback chain against mock servers

use flora_id::config::Config;
use flora_id::orchestrator::{collect_descriptions, describe_species};
use flora_id::retry::RetryPolicy;
use flora_id::sources::{build_sources, DescriptionSource, EfloraSource, PowoSource, SourceKind};
use flora_id_common::{Outcome, SpeciesRecord};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EFLORA_DETAIL: &str = r#"<html><body>
<div class="details-bordered">
  <div class="details-bordered-heading">Morphological description</div>
  <div class="details-bordered-body"><p>Erect shrub to 2 m.</p></div>
</div>
</body></html>"#;

const POWO_TAXON: &str = r#"<html><body>
<section id="descriptions">
  <div class="description">
    <button class="collapser"><span class="text">Flora of Tropical East Africa</span></button>
    <dl class="c-article-desc-table">
      <dt><span>Leaves</span></dt><dd>Alternate, linear</dd>
    </dl>
  </div>
</section>
</body></html>"#;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO)
}

fn test_config(eflora: &MockServer, powo: &MockServer) -> Config {
    Config {
        eflora_url: eflora.uri(),
        powo_url: powo.uri(),
        retry_delay_ms: 0,
        species_delay_ms: 0,
        ..Config::default()
    }
}

async fn mount_eflora_hit(server: &MockServer, name: &str, id: u64) {
    Mock::given(method("GET"))
        .and(path("/search/ServersideSearch"))
        .and(query_param("q", name))
        .and(query_param("index", "bodatsa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_source": {"italicspeciesname": name, "speciesid": id}}]
        })))
        .mount(server)
        .await;
}

async fn mount_eflora_miss(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search/ServersideSearch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(server)
        .await;
}

async fn mount_powo_hit(server: &MockServer, name: &str, fq_id: &str) {
    Mock::given(method("GET"))
        .and(path("/api/2/search"))
        .and(query_param("q", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"fqId": fq_id, "name": name}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/taxon/{}/general-information", fq_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(POWO_TAXON))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_eflora_end_to_end() {
    let server = MockServer::start().await;
    mount_eflora_hit(&server, "Passerina rigida", 4321).await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFLORA_DETAIL))
        .expect(1)
        .mount(&server)
        .await;

    let source = EfloraSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Passerina rigida").await;

    assert_eq!(
        result.text(),
        Some(
            "--- According to e-Flora of South Africa (SANBI) ---\n\n\
             --- Morphological description ---\nErect shrub to 2 m."
        )
    );
}

#[tokio::test]
async fn test_eflora_no_match() {
    let server = MockServer::start().await;
    mount_eflora_miss(&server).await;

    let source = EfloraSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Passerina rigida").await;

    assert_eq!(result.failure_reason(), Some("No e-Flora SA match found."));
}

/// Transient failures are retried and then succeed
#[tokio::test]
async fn test_eflora_detail_retried_after_server_error() {
    let server = MockServer::start().await;
    mount_eflora_hit(&server, "Passerina rigida", 4321).await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFLORA_DETAIL))
        .expect(1)
        .mount(&server)
        .await;

    let source = EfloraSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Passerina rigida").await;

    assert!(result.succeeded());
}

#[tokio::test]
async fn test_eflora_fetch_gives_up_after_three_attempts() {
    let server = MockServer::start().await;
    mount_eflora_hit(&server, "Passerina rigida", 4321).await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let source = EfloraSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Passerina rigida").await;

    assert_eq!(
        result.failure_reason(),
        Some("Failed to fetch e-Flora SA page after multiple attempts.")
    );
}

/// A 404 is permanent and is not retried
#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    mount_eflora_hit(&server, "Passerina rigida", 4321).await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let source = EfloraSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    assert!(!source.fetch_description("Passerina rigida").await.succeeded());
}

#[tokio::test]
async fn test_powo_sends_referer() {
    let server = MockServer::start().await;
    let referer = format!("{}/", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/2/search"))
        .and(header("referer", referer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"fqId": "urn:lsid:ipni.org:names:1", "name": "Gnidia pinifolia"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/taxon/urn:lsid:ipni.org:names:1/general-information"))
        .and(header("referer", referer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(POWO_TAXON))
        .expect(1)
        .mount(&server)
        .await;

    let source = PowoSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Gnidia pinifolia").await;

    let text = result.text().expect("description expected");
    assert!(text.starts_with("--- According to Plants of the World Online (POWO) ---"));
    assert!(text.contains("--- Flora of Tropical East Africa ---"));
    assert!(text.contains("Leaves:\nAlternate, linear"));
}

#[tokio::test]
async fn test_powo_no_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let source = PowoSource::new(reqwest::Client::new(), &server.uri(), fast_policy());
    let result = source.fetch_description("Gnidia pinifolia").await;

    assert_eq!(result.failure_reason(), Some("No POWO match found."));
}

/// e-Flora miss falls back to POWO; only POWO's text is kept
#[tokio::test]
async fn test_fallback_to_powo() {
    let eflora = MockServer::start().await;
    let powo = MockServer::start().await;
    mount_eflora_miss(&eflora).await;
    mount_powo_hit(&powo, "Struthiola myrsinites", "urn:lsid:ipni.org:names:2").await;

    let config = test_config(&eflora, &powo);
    let sources = build_sources(&config.source_order, &reqwest::Client::new(), &config);
    let result = describe_species(&sources, &SpeciesRecord::new("Struthiola myrsinites Lam.")).await;

    assert_eq!(result.species_name, "Struthiola myrsinites Lam.");
    let text = result.text().expect("POWO description");
    assert!(text.contains("Plants of the World Online"));
    assert!(!text.contains("e-Flora"));
}

/// Success on the primary source means the secondary is never contacted
#[tokio::test]
async fn test_primary_success_skips_secondary() {
    let eflora = MockServer::start().await;
    let powo = MockServer::start().await;
    mount_eflora_hit(&eflora, "Passerina rigida", 4321).await;
    Mock::given(method("GET"))
        .and(path("/search/detail/4321"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFLORA_DETAIL))
        .mount(&eflora)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&powo)
        .await;

    let config = test_config(&eflora, &powo);
    let sources = build_sources(&config.source_order, &reqwest::Client::new(), &config);
    let result = describe_species(&sources, &SpeciesRecord::new("Passerina rigida")).await;

    assert!(matches!(result.outcome, Outcome::Described(ref t) if t.contains("e-Flora")));
}

#[tokio::test]
async fn test_both_sources_fail() {
    let eflora = MockServer::start().await;
    let powo = MockServer::start().await;
    mount_eflora_miss(&eflora).await;
    Mock::given(method("GET"))
        .and(path("/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&powo)
        .await;

    let config = test_config(&eflora, &powo);
    let sources = build_sources(&config.source_order, &reqwest::Client::new(), &config);
    let results = collect_descriptions(
        &sources,
        &[SpeciesRecord::new("Gnidia pinifolia"), SpeciesRecord::new("Lachnaea aurea")],
        config.species_delay(),
        |_, _, _| {},
    )
    .await;

    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(
            result.failure_reason(),
            Some("No valid description found on e-Flora SA or POWO.")
        );
    }
}

/// A reversed source order consults POWO first
#[tokio::test]
async fn test_reversed_source_order() {
    let eflora = MockServer::start().await;
    let powo = MockServer::start().await;
    mount_powo_hit(&powo, "Gnidia pinifolia", "urn:lsid:ipni.org:names:3").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&eflora)
        .await;

    let config = test_config(&eflora, &powo);
    let sources = build_sources(&[SourceKind::Powo, SourceKind::Eflora], &reqwest::Client::new(), &config);
    let result = describe_species(&sources, &SpeciesRecord::new("Gnidia pinifolia")).await;

    assert!(result.succeeded());
}
