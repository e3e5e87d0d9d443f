//! Identity resolution across the local store, override files, the remote
//! site list, and the URL heuristic.
#![allow(clippy::unwrap_used)]

mod common;

use common::{FALLBACK, Fixture, client, client_unreachable};
use hobaa_core::model::DEFAULT_ICON_SENTINEL;
use hobaa_core::{IconOrigin, ResolveOutcome, Site, SiteOrigin, SiteRegistry};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn active_count(reg: &SiteRegistry) -> usize {
    reg.iter().filter(|s| s.is_active).count()
}

// ── Fresh install ───────────────────────────────────────────────────

#[tokio::test]
async fn plain_name_on_fresh_install_gets_fallback_site() {
    let fx = Fixture::new();
    let resolver = fx.resolver(client(), None);
    let mut reg = SiteRegistry::new();

    let res = resolver.resolve(&mut reg, "github", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Synthesized);
    assert_eq!(res.site.title, "github");
    assert_eq!(res.site.url, FALLBACK);
    assert_eq!(res.site.icon, DEFAULT_ICON_SENTINEL);
    assert!(res.site.is_active);
    assert_eq!(res.icon.as_ref().unwrap().origin, IconOrigin::Default);
    assert!(fx.layout.icon_path("github").is_file());
    assert!(res.requires_sync());

    let persisted = SiteRegistry::load(&fx.layout.sites_path()).unwrap();
    assert_eq!(active_count(&persisted), 1);
    assert_eq!(persisted.active().unwrap().name, "github");
}

#[tokio::test]
async fn url_like_name_is_inferred_and_falls_back_to_default_icon() {
    let fx = Fixture::new();
    let resolver = fx.resolver(client_unreachable("mail.google.com"), None);
    let mut reg = SiteRegistry::new();

    let res = resolver
        .resolve(&mut reg, "mail.google.com", false)
        .await
        .unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Inferred);
    assert_eq!(res.site.url, "https://mail.google.com");
    assert_eq!(res.site.icon, DEFAULT_ICON_SENTINEL);

    let persisted = SiteRegistry::load(&fx.layout.sites_path()).unwrap();
    assert_eq!(persisted.get("mail.google.com").unwrap().url, "https://mail.google.com");
    assert!(res.requires_sync());
}

// ── Local store ─────────────────────────────────────────────────────

#[tokio::test]
async fn active_site_resolves_without_network() {
    let fx = Fixture::new();
    fx.write_icon("shop");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let remote = Url::parse(&format!("{}/sites.json", server.uri())).unwrap();
    let resolver = fx.resolver(client(), Some(remote));
    let mut reg: SiteRegistry = [Site::from_url("shop", "https://shop.example")]
        .into_iter()
        .collect();

    let res = resolver.resolve(&mut reg, "shop", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::AlreadyActive);
    assert_eq!(res.icon.as_ref().unwrap().origin, IconOrigin::Cached);
    assert!(!res.requires_sync());
}

#[tokio::test]
async fn inactive_site_with_cached_icon_is_reactivated() {
    let fx = Fixture::new();
    fx.write_icon("docs");
    let resolver = fx.resolver(client(), None);
    let mut reg: SiteRegistry = [
        Site {
            is_active: false,
            ..Site::from_url("docs", "https://docs.example")
        },
        Site::from_url("other", "https://other.example"),
    ]
    .into_iter()
    .collect();

    let res = resolver.resolve(&mut reg, "docs", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Reactivated);
    assert!(res.requires_sync());
    assert_eq!(reg.active().unwrap().name, "docs");
    assert_eq!(active_count(&reg), 1);
}

#[tokio::test]
async fn forced_and_normal_resolution_agree_on_site_fields() {
    let fx = Fixture::new();
    let resolver = fx.resolver(client(), None);
    let mut reg = SiteRegistry::new();

    let normal = resolver.resolve(&mut reg, "notes", false).await.unwrap();
    reg.get_mut("notes").unwrap().is_active = false;
    let forced = resolver.resolve(&mut reg, "notes", true).await.unwrap();

    assert_eq!(forced.outcome, ResolveOutcome::Forced);
    assert!(!forced.requires_sync());
    assert_eq!(
        (&forced.site.title, &forced.site.url, forced.site.width, forced.site.height),
        (&normal.site.title, &normal.site.url, normal.site.width, normal.site.height)
    );
    assert!(forced.site.is_active);
}

#[tokio::test]
async fn forced_unknown_name_resolves_but_never_syncs() {
    let fx = Fixture::new();
    let resolver = fx.resolver(client(), None);
    let mut reg = SiteRegistry::new();

    let res = resolver.resolve(&mut reg, "brandnew", true).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Synthesized);
    assert!(!res.requires_sync());
}

// ── Overrides ───────────────────────────────────────────────────────

#[tokio::test]
async fn working_dir_override_keeps_local_dimensions() {
    let fx = Fixture::new();
    fx.write_working_sites(&[Site {
        title: "Mail".into(),
        width: 800,
        height: 600,
        ..Site::from_url("mail", "https://mail.example")
    }]);
    let resolver = fx.resolver(client(), None);
    let mut reg: SiteRegistry = [Site {
        is_active: false,
        width: 1400,
        ..Site::from_url("mail", "https://old.example")
    }]
    .into_iter()
    .collect();

    let res = resolver.resolve(&mut reg, "mail", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Adopted(SiteOrigin::WorkingDir));
    assert_eq!(res.site.url, "https://mail.example");
    assert_eq!((res.site.width, res.site.height), (1400, 600));
    assert_eq!(res.site.title, "Mail");
}

#[tokio::test]
async fn remote_site_is_adopted_with_catalog_icon() {
    let fx = Fixture::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {"name":"trello","title":"Trello","url":"https://trello.com","icon":"ico/trello.ico"},
                {"name":"trello","title":"Duplicate","url":"https://dup.example"}
            ]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icons/trello.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(common::TINY_ICO.to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let remote_sites = Url::parse(&format!("{}/sites.json", server.uri())).unwrap();
    let remote_icons = Url::parse(&format!("{}/icons/", server.uri())).unwrap();
    let provisioner = fx.provisioner(client(), Some(remote_icons));
    let resolver = fx.resolver_with(client(), Some(remote_sites), provisioner);
    let mut reg = SiteRegistry::new();

    let res = resolver.resolve(&mut reg, "trello", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Adopted(SiteOrigin::Remote));
    assert_eq!(res.site.title, "Trello");
    assert_eq!(res.icon.as_ref().unwrap().origin, IconOrigin::RemoteCatalog);
    assert_eq!(
        std::fs::read(fx.layout.icon_path("trello")).unwrap(),
        common::TINY_ICO
    );
}

#[tokio::test]
async fn remote_failure_falls_through_to_next_tier() {
    let fx = Fixture::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let remote = Url::parse(&format!("{}/sites.json", server.uri())).unwrap();
    let resolver = fx.resolver(client(), Some(remote));
    let mut reg = SiteRegistry::new();

    let res = resolver.resolve(&mut reg, "intranet", false).await.unwrap();
    assert_eq!(res.outcome, ResolveOutcome::Synthesized);
}

#[tokio::test]
async fn inactive_record_without_icon_falls_through_to_fallback() {
    let fx = Fixture::new();
    let resolver = fx.resolver(client(), None);
    let mut reg: SiteRegistry = [
        Site {
            is_active: false,
            width: 1024,
            height: 700,
            icon: "ico/wiki.ico".into(),
            ..Site::from_url("wiki", "https://wiki.example")
        },
        Site::from_url("other", "https://other.example"),
    ]
    .into_iter()
    .collect();

    let res = resolver.resolve(&mut reg, "wiki", false).await.unwrap();

    assert_eq!(res.outcome, ResolveOutcome::Synthesized);
    assert_eq!(res.site.url, FALLBACK);
    assert_eq!(res.site.icon, DEFAULT_ICON_SENTINEL);
    assert_eq!((res.site.width, res.site.height), (1024, 700));
    assert_eq!(active_count(&reg), 1);
    assert!(!reg.get("other").unwrap().is_active);
}
