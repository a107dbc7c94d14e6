//! End-to-end schema generation over a small network model.
//!
//! Each test exercises: JSON model → DataModel → translate_form → schema text.

use graft::{Graft, JsonModel, TargetType};
use pretty_assertions::assert_eq;

const NETWORK_MODEL: &str = r#"{
    "forms": [
        {
            "name": "inet:ipv4",
            "type": {"name": "inet:ipv4", "lineage": ["IPv4", "IntBase"]},
            "properties": [
                {"name": "asn", "type": {"name": "inet:asn", "lineage": ["IntBase"]}},
                {"name": "latlong", "type": {"name": "geo:latlong", "lineage": ["LatLong"]}},
                {"name": ".seen", "type": {"name": "ival", "lineage": ["Ival"]}}
            ]
        },
        {
            "name": "inet:fqdn",
            "type": {"name": "inet:fqdn", "lineage": ["Fqdn"]},
            "properties": [
                {"name": "issuffix", "type": {"name": "bool", "lineage": ["Bool"]}},
                {"name": "domain", "type": {"name": "inet:fqdn", "lineage": ["Fqdn"]}}
            ]
        },
        {
            "name": "file:path",
            "type": {"name": "file:path", "lineage": ["FilePath"]}
        },
        {
            "name": "inet:dns:a",
            "type": {"name": "inet:dns:a", "lineage": ["Guid"]},
            "properties": [
                {"name": "fqdn", "type": {"name": "inet:fqdn", "lineage": ["Fqdn"]}},
                {"name": "ipv4", "type": {"name": "inet:ipv4", "lineage": ["IPv4", "IntBase"]}}
            ],
            "out_refs": {"prop": ["fqdn", "ipv4"]}
        }
    ]
}"#;

fn graft() -> Graft<JsonModel> {
    Graft::with_provider(JsonModel::text(NETWORK_MODEL))
}

#[test]
fn test_primitive_primary_predicate() {
    let schema = graft().schema().unwrap();
    assert!(schema.lines().any(|l| l == "inet.ipv4: int @index(int) ."), "{schema}");
}

#[test]
fn test_reference_predicates_have_no_index() {
    let schema = graft().schema().unwrap();
    assert!(schema.lines().any(|l| l == "inet.dns.a.fqdn: uid ."));
    assert!(schema.lines().any(|l| l == "inet.dns.a.ipv4: uid ."));
}

#[test]
fn test_type_block_lists_all_form_predicates() {
    let schema = graft().schema().unwrap();
    assert!(schema.contains(
        "type InetDnsA {\n    <inet.dns.a>\n    <inet.dns.a.fqdn>\n    <inet.dns.a.ipv4>\n}\n"
    ));
}

#[test]
fn test_full_schema_text() {
    let schema = graft().schema().unwrap();
    let expected = "\
inet.ipv4: int @index(int) .
inet.ipv4.asn: int @index(int) .
inet.ipv4.latlong: geo @index(geo) .
inet.fqdn: string @index(hash) .
inet.fqdn.issuffix: bool @index(bool) .
inet.fqdn.domain: uid .
file.path: TODO FilePath .
inet.dns.a: string @index(hash) .
inet.dns.a.fqdn: uid .
inet.dns.a.ipv4: uid .

type InetIpv4 {
    <inet.ipv4>
    <inet.ipv4.asn>
    <inet.ipv4.latlong>
}

type InetFqdn {
    <inet.fqdn>
    <inet.fqdn.issuffix>
    <inet.fqdn.domain>
}

type FilePath {
    <file.path>
}

type InetDnsA {
    <inet.dns.a>
    <inet.dns.a.fqdn>
    <inet.dns.a.ipv4>
}
";
    assert_eq!(schema, expected);
}

#[test]
fn test_schema_is_deterministic() {
    let ctx = graft();
    assert_eq!(ctx.schema().unwrap(), ctx.schema().unwrap());
    assert_eq!(ctx.schema().unwrap(), graft().schema().unwrap());
}

#[test]
fn test_translate_form_by_name() {
    let entries = graft().translate_form("inet:dns:a").unwrap();
    let summary: Vec<_> = entries
        .iter()
        .map(|e| (e.predicate.as_str(), e.target_type.clone(), e.origin.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("inet.dns.a", TargetType::String, "inet:dns:a"),
            ("inet.dns.a.fqdn", TargetType::Uid, "inet:fqdn"),
            ("inet.dns.a.ipv4", TargetType::Uid, "inet:ipv4"),
        ]
    );
}

#[test]
fn test_translate_unknown_form() {
    assert!(matches!(
        graft().translate_form("inet:ipv6"),
        Err(graft::Error::NotFound(_))
    ));
}

#[test]
fn test_model_load_error_surfaces() {
    let ctx = Graft::with_provider(JsonModel::text("not json"));
    assert!(matches!(ctx.schema(), Err(graft::Error::Json(_))));
}

#[test]
fn test_model_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("graft-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("model.json");
    std::fs::write(&path, NETWORK_MODEL).unwrap();

    let from_file = Graft::open_json(&path);
    assert_eq!(from_file.schema().unwrap(), graft().schema().unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}
