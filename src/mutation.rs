//! Upsert statement text: mutation entries rendered as N-Quads.
//!
//! ```text
//! translate_node() → [MutationEntry] → build_upsert() → Upsert { query, mutations }
//!   → MutationSink::submit(query, mutations)
//! ```
//!
//! The node's subject is bound by looking its unique primary entry up with
//! `eq()`. Two conditional mutations follow: one creating the node when the
//! lookup is empty, one updating secondary facts when it matched. Edges bind
//! their object through a query variable on the referenced form's primary
//! predicate. Forms without a primary predicate are written to a fresh blank
//! node with a single unconditional mutation.

use serde::{Deserialize, Serialize};

use crate::model::Value;
use crate::translate::MutationEntry;
use crate::types::TargetType;

/// Query variable bound to the node's subject.
const SUBJECT_VAR: &str = "v";
/// Subject used when there is nothing to look the node up by.
const BLANK_SUBJECT: &str = "_:node";

/// One conditional N-Quad batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub cond: Option<String>,
    pub nquads: String,
}

impl Mutation {
    pub fn new(cond: Option<String>, nquads: impl Into<String>) -> Self {
        Self { cond, nquads: nquads.into() }
    }
}

/// A query plus the mutations conditioned on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Upsert {
    pub query: String,
    pub mutations: Vec<Mutation>,
}

/// Quote and escape a value as an N-Quad literal.
pub fn format_literal(value: &Value) -> String {
    let raw = value.to_string();
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    match value {
        Value::Geo { .. } => format!("\"{escaped}\"^^<geo:geojson>"),
        _ => format!("\"{escaped}\""),
    }
}

/// `<subject> <predicate> "<value>" .`
pub fn format_nquad(subject: &str, predicate: &str, value: &Value) -> String {
    format!("{subject} <{predicate}> {} .", format_literal(value))
}

/// `<subject> <predicate> <object> .`
pub fn format_edge(subject: &str, predicate: &str, object: &str) -> String {
    format!("{subject} <{predicate}> {object} .")
}

struct UpsertBuilder {
    subject: String,
    blocks: Vec<String>,
    vars: usize,
}

impl UpsertBuilder {
    /// Bind a fresh variable to nodes whose `predicate` equals `value`.
    fn bind(&mut self, predicate: &str, value: &Value) -> String {
        let var = format!("e{}", self.vars);
        self.vars += 1;
        self.blocks.push(format!(
            "  {var} as var(func: eq(<{predicate}>, {}))",
            format_literal(value)
        ));
        var
    }

    fn statements(&mut self, entry: &MutationEntry) -> Vec<String> {
        let predicate = entry.predicate_name();
        match (&entry.edge_predicate, entry.is_edge) {
            (Some(target), true) => {
                // A list reference binds each member separately.
                let members: Vec<Value> = match entry.target_type {
                    Some(TargetType::UidList) => entry.value.members().cloned().collect(),
                    _ => vec![entry.value.clone()],
                };
                members
                    .iter()
                    .map(|member| {
                        let var = self.bind(target, member);
                        format_edge(&self.subject, predicate, &format!("uid({var})"))
                    })
                    .collect()
            }
            // An edge without a lookup predicate has no object to point at.
            (None, true) => Vec::new(),
            _ => vec![format_nquad(&self.subject, predicate, &entry.value)],
        }
    }
}

/// Render a node's translated entries as an upsert.
pub fn build_upsert(entries: &[MutationEntry]) -> Upsert {
    let primary = entries.iter().find(|e| e.unique);
    let mut builder = UpsertBuilder {
        subject: match primary {
            Some(_) => format!("uid({SUBJECT_VAR})"),
            None => BLANK_SUBJECT.to_string(),
        },
        blocks: Vec::new(),
        vars: 0,
    };

    if let Some(primary) = primary {
        builder.blocks.push(format!(
            "  q(func: eq(<{}>, {})) {{ {SUBJECT_VAR} as uid }}",
            primary.predicate_name(),
            format_literal(&primary.value)
        ));
    }

    let mut create = Vec::new();
    let mut update = Vec::new();
    for entry in entries {
        let lines = builder.statements(entry);
        if !entry.unique && entry.predicate.is_some() {
            update.extend(lines.iter().cloned());
        }
        create.extend(lines);
    }

    let query = if builder.blocks.is_empty() {
        String::new()
    } else {
        format!("{{\n{}\n}}", builder.blocks.join("\n"))
    };

    let mutations = match primary {
        Some(_) => {
            let mut mutations = vec![Mutation::new(
                Some(format!("@if(eq(len({SUBJECT_VAR}), 0))")),
                create.join("\n"),
            )];
            if !update.is_empty() {
                mutations.push(Mutation::new(
                    Some(format!("@if(eq(len({SUBJECT_VAR}), 1))")),
                    update.join("\n"),
                ));
            }
            mutations
        }
        None => vec![Mutation::new(None, create.join("\n"))],
    };

    Upsert { query, mutations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataModel, Form, Node, StaticModel, TypeDescriptor};
    use crate::translate::translate_node;
    use pretty_assertions::assert_eq;

    fn ty(name: &str, lineage: &[&str]) -> TypeDescriptor {
        TypeDescriptor::new(name).with_lineage(lineage.iter().copied())
    }

    /// Upsert for `node` against `form` plus the forms its edges point at.
    fn upsert_for(node: &Node, form: Form) -> Upsert {
        let provider = StaticModel::new()
            .with_form(Form::new("inet:fqdn", ty("inet:fqdn", &["Fqdn"])))
            .with_form(form);
        let model = DataModel::load(&provider).unwrap();
        build_upsert(&translate_node(node, &model).unwrap())
    }

    #[test]
    fn test_format_literal_escapes() {
        assert_eq!(format_literal(&Value::from("a\"b")), r#""a\"b""#);
        assert_eq!(format_literal(&Value::Int(5)), r#""5""#);
        assert_eq!(
            format_literal(&Value::Geo { lat: 1.0, lon: 2.0 }),
            r#""{\"type\":\"Point\",\"coordinates\":[2,1]}"^^<geo:geojson>"#
        );
    }

    #[test]
    fn test_primary_only_upsert() {
        let form = Form::new("inet:ipv4", ty("inet:ipv4", &["IPv4", "IntBase"]));
        let node = Node::new("inet:ipv4", 16909060i64);
        let upsert = upsert_for(&node, form);

        assert_eq!(upsert.query, "{\n  q(func: eq(<inet.ipv4>, \"16909060\")) { v as uid }\n}");
        assert_eq!(upsert.mutations.len(), 1);
        assert_eq!(upsert.mutations[0].cond.as_deref(), Some("@if(eq(len(v), 0))"));
        assert_eq!(
            upsert.mutations[0].nquads,
            "uid(v) <inet.ipv4> \"16909060\" .\nuid(v) <dgraph.type> \"InetIpv4\" ."
        );
    }

    #[test]
    fn test_secondary_props_in_both_branches() {
        let form = Form::new("inet:ipv4", ty("inet:ipv4", &["IPv4", "IntBase"]))
            .with_property("asn", ty("inet:asn", &["IntBase"]));
        let node = Node::new("inet:ipv4", 1i64).with_property("asn", 64512i64);
        let upsert = upsert_for(&node, form);

        assert_eq!(upsert.mutations.len(), 2);
        assert!(upsert.mutations[0].nquads.ends_with("uid(v) <inet.ipv4.asn> \"64512\" ."));
        assert_eq!(upsert.mutations[1].cond.as_deref(), Some("@if(eq(len(v), 1))"));
        assert_eq!(upsert.mutations[1].nquads, "uid(v) <inet.ipv4.asn> \"64512\" .");
    }

    #[test]
    fn test_edges_bind_query_vars() {
        let form = Form::new("inet:dns:a", ty("inet:dns:a", &["Comp"]))
            .with_property("fqdn", ty("inet:fqdn", &["Fqdn"]))
            .with_ref("prop", "fqdn");
        let node = Node::new("inet:dns:a", "(woot.com,1.2.3.4)").with_property("fqdn", "woot.com");
        let upsert = upsert_for(&node, form);

        assert_eq!(upsert.query, "{\n  e0 as var(func: eq(<inet.fqdn>, \"woot.com\"))\n}");
        assert_eq!(
            upsert.mutations,
            vec![Mutation::new(
                None,
                "_:node <dgraph.type> \"InetDnsA\" .\n_:node <inet.dns.a.fqdn> uid(e0) ."
            )]
        );
    }

    #[test]
    fn test_list_edges_bind_each_member() {
        let form = Form::new("inet:dns:query", ty("inet:dns:query", &["StrBase"]))
            .with_property("answers", ty("inet:fqdn", &["Fqdn"]))
            .with_ref("array", "answers");
        let node = Node::new("inet:dns:query", "q1")
            .with_property("answers", vec!["a.com", "b.com"]);
        let upsert = upsert_for(&node, form);

        assert!(upsert.query.contains("e0 as var(func: eq(<inet.fqdn>, \"a.com\"))"));
        assert!(upsert.query.contains("e1 as var(func: eq(<inet.fqdn>, \"b.com\"))"));
        assert_eq!(
            upsert.mutations[1].nquads,
            "uid(v) <inet.dns.query.answers> uid(e0) .\nuid(v) <inet.dns.query.answers> uid(e1) ."
        );
    }

    #[test]
    fn test_edge_without_lookup_predicate_writes_nothing() {
        let entry = MutationEntry {
            predicate: Some("inet.dns.answer.a".into()),
            value: Value::from("(woot.com,1.2.3.4)"),
            unique: false,
            target_type: Some(TargetType::Uid),
            form: "inet:dns:answer".into(),
            is_edge: true,
            edge_predicate: None,
        };
        let upsert = build_upsert(&[entry]);
        assert_eq!(upsert.query, "");
        assert_eq!(upsert.mutations, vec![Mutation::new(None, "")]);
    }
}
