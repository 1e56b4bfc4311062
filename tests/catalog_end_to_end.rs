//! Catalog end-to-end tests
//!
//! Builds a small catalog on disk, then resolves, verifies, renders and
//! serves from it.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256, Sha384};
use tempfile::TempDir;
use webres::markup::{render, RenderError, RenderOptions};
use webres::server::{ResourceServer, ServeOutcome};
use webres::{
    verify, FsCatalog, Resolver, ResourceRequest, ScriptType, Settings, SrcRefusal, Verification,
};

const JQUERY: &[u8] = b"/*! jQuery v3.3.1 | (c) JS Foundation */\n!function(e,t){}(window);\n";
const BOOTSTRAP: &[u8] = b"/*! Bootstrap v4.0.0 */\n.btn{display:inline-block}\n";

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Catalog with:
/// - jquery 3.3.1 (local + https mirror, sha256 hex)
/// - jquery 3.3.1 slim (local only, sha384 base64, module/defer)
/// - bootstrap 4.0.0 css (local, served under a prefix)
/// - legacy 1.0 (http mirror with md5 checksum)
/// - broken 1.0 (checksum that does not match)
fn build_catalog() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let js = root.join("jquery/jquery/js");
    write(&js.join("files/jquery-3.3.1.min.js"), JQUERY);
    write(
        &js.join("jquery-3.3.1.json"),
        format!(
            r#"{{
                "filepath": "files/jquery-3.3.1.min.js",
                "checksum": "sha256:{}",
                "lastmod": "2018-01-20T17:24:00-0800",
                "url": "https://code.jquery.com/jquery-3.3.1.min.js",
                "crossorigin": "anonymous"
            }}"#,
            hex::encode(Sha256::digest(JQUERY))
        )
        .as_bytes(),
    );
    write(
        &js.join("jquery-3.3.1-slim.json"),
        format!(
            r#"{{
                "filepath": "files/jquery-3.3.1.min.js",
                "checksum": "sha384:{}",
                "urlpath": "/jquery/jquery-3.3.1.slim.js",
                "type": "module",
                "defer": true
            }}"#,
            STANDARD.encode(Sha384::digest(JQUERY))
        )
        .as_bytes(),
    );

    let css = root.join("twbs/bootstrap/css");
    write(&css.join("bootstrap.min.css"), BOOTSTRAP);
    write(
        &css.join("bootstrap-4.0.0.json"),
        format!(
            r#"{{
                "filepath": "bootstrap.min.css",
                "checksum": "sha256:{}",
                "urlpath": "/twbs/bootstrap.min.css",
                "media": "screen"
            }}"#,
            hex::encode(Sha256::digest(BOOTSTRAP))
        )
        .as_bytes(),
    );

    let legacy = root.join("acme/legacy/js");
    write(
        &legacy.join("legacy-1.0.json"),
        br#"{
            "url": "http://static.example.com/legacy.js",
            "checksum": "md5:d41d8cd98f00b204e9800998ecf8427e"
        }"#,
    );
    write(&legacy.join("broken.js"), b"not what was hashed");
    write(
        &legacy.join("broken-1.0.json"),
        format!(
            r#"{{"filepath": "broken.js", "checksum": "sha256:{}"}}"#,
            hex::encode(Sha256::digest(b"original"))
        )
        .as_bytes(),
    );

    dir
}

// =============================================================================
// Resolve + verify
// =============================================================================

#[test]
fn test_resolve_and_verify() {
    let dir = build_catalog();
    let catalog = FsCatalog::new(dir.path());

    let d = catalog
        .resolve(&ResourceRequest::javascript("jquery", "jquery", "jquery", "3.3.1"))
        .unwrap()
        .unwrap();
    assert!(verify(&d).is_trusted());
    assert_eq!(d.timestamp(), Some(1_516_497_840));

    let slim = catalog
        .resolve(
            &ResourceRequest::javascript("jquery", "jquery", "jquery", "3.3.1").with_variant("slim"),
        )
        .unwrap()
        .unwrap();
    assert!(verify(&slim).is_trusted());
    assert_eq!(slim.script_attributes().unwrap().script_type, ScriptType::Module);

    let broken = catalog
        .resolve(&ResourceRequest::javascript("acme", "legacy", "broken", "1.0"))
        .unwrap()
        .unwrap();
    assert!(matches!(verify(&broken), Verification::NotVerified));
}

// =============================================================================
// Render
// =============================================================================

#[test]
fn test_render_remote_script() {
    let dir = build_catalog();
    let catalog = FsCatalog::new(dir.path());
    let d = catalog
        .resolve(&ResourceRequest::javascript("jquery", "jquery", "jquery", "3.3.1"))
        .unwrap()
        .unwrap();

    let out = render(
        &d,
        &RenderOptions {
            nonce: Some("abc123".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        out.markup,
        format!(
            "<script src=\"https://code.jquery.com/jquery-3.3.1.min.js\" integrity=\"sha256-{}\" crossorigin=\"anonymous\" nonce=\"abc123\"></script>",
            STANDARD.encode(Sha256::digest(JQUERY))
        )
    );
}

#[test]
fn test_render_local_module_with_prefix() {
    let dir = build_catalog();
    let catalog = FsCatalog::new(dir.path());
    let req = ResourceRequest::javascript("jquery", "jquery", "jquery", "3.3.1").with_variant("slim");
    let d = catalog.resolve(&req).unwrap().unwrap();

    let out = render(
        &d,
        &RenderOptions {
            xml: true,
            prefix: Some("/res".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(out
        .markup
        .starts_with("<script type=\"module\" src=\"/res/jquery/jquery-3.3.1.slim.js\" integrity=\"sha384-"));
    assert!(out.markup.ends_with(" defer=\"defer\"/>"));
}

#[test]
fn test_render_stylesheet() {
    let dir = build_catalog();
    let catalog = FsCatalog::new(dir.path());
    let d = catalog
        .resolve(&ResourceRequest::css("twbs", "bootstrap", "bootstrap", "4.0.0"))
        .unwrap()
        .unwrap();
    let out = render(&d, &RenderOptions::default()).unwrap();
    assert!(out.markup.starts_with("<link rel=\"stylesheet\" type=\"text/css\" href=\"/twbs/bootstrap.min.css\""));
    assert!(out.markup.contains(" media=\"screen\""));
}

#[test]
fn test_render_refuses_http_with_md5() {
    let dir = build_catalog();
    let catalog = FsCatalog::new(dir.path());
    let d = catalog
        .resolve(&ResourceRequest::javascript("acme", "legacy", "legacy", "1.0"))
        .unwrap()
        .unwrap();
    match render(&d, &RenderOptions::default()) {
        Err(RenderError::Refused(SrcRefusal::PlaintextWithoutIntegrity { host })) => {
            assert_eq!(host, "static.example.com");
        }
        other => panic!("expected refusal, got {:?}", other),
    }
}

// =============================================================================
// Serve
// =============================================================================

#[test]
fn test_serve_verified_and_refused() {
    let dir = build_catalog();
    let server = ResourceServer::new(FsCatalog::new(dir.path()));

    let mut out = Vec::new();
    let outcome = server
        .serve(&ResourceRequest::css("twbs", "bootstrap", "bootstrap", "4.0.0"), &mut out)
        .unwrap();
    match outcome {
        ServeOutcome::Served(head) => {
            assert_eq!(head.content_type, "text/css");
            assert_eq!(head.content_length, BOOTSTRAP.len() as u64);
        }
        other => panic!("expected Served, got {:?}", other),
    }
    assert_eq!(out, BOOTSTRAP);

    let mut out = Vec::new();
    let outcome = server
        .serve(&ResourceRequest::javascript("acme", "legacy", "broken", "1.0"), &mut out)
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::Refused(Verification::NotVerified)));
    assert!(out.is_empty());

    let outcome = server
        .serve(&ResourceRequest::javascript("acme", "legacy", "legacy", "1.0"), &mut Vec::new())
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::NotLocal));

    let outcome = server
        .serve(&ResourceRequest::javascript("acme", "legacy", "absent", "1.0"), &mut Vec::new())
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::NotFound));
}

// =============================================================================
// Audit + settings
// =============================================================================

#[test]
fn test_audit_counts() {
    let dir = build_catalog();
    let entries = FsCatalog::new(dir.path()).audit().unwrap();

    assert_eq!(entries.len(), 5);
    assert_eq!(entries.iter().filter(|e| e.is_trusted()).count(), 3);
    // legacy has no local file
    assert_eq!(
        entries
            .iter()
            .filter(|e| matches!(&e.outcome, Ok(v) if v.is_indeterminate()))
            .count(),
        1
    );
}

#[test]
fn test_settings_point_at_catalog() {
    let dir = build_catalog();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!("catalog_root = {:?}\nsrc_prefix = \"/res\"\n", dir.path().display().to_string()),
    )
    .unwrap();

    let settings = Settings::load(&config).unwrap();
    let catalog = FsCatalog::new(&settings.catalog_root);
    assert!(catalog
        .resolve(&ResourceRequest::css("twbs", "bootstrap", "bootstrap", "4.0.0"))
        .unwrap()
        .is_some());
}
