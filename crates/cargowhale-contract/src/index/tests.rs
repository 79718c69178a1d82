// crates/cargowhale-contract/src/index/tests.rs
// ============================================================================
// Module: Contract Index Unit Tests
// Description: Unit coverage for flattening, path joining, and lookups.
// Purpose: Ensure the index is total, lossless, and fails closed on bad trees.
// Dependencies: cargowhale-contract
// ============================================================================

//! ## Overview
//! Exercises the flattening walk directly, including arena-only shapes (back
//! edges, shared children, dangling references) that the owned authoring tree
//! cannot express.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::ContractIndex;
use super::IndexKey;
use super::LookupError;
use super::join_path;
use crate::ContractError;
use crate::model::ContractModel;
use crate::model::HttpVerb;
use crate::model::MediaType;
use crate::model::Method;
use crate::model::Resource;
use crate::model::Response;
use crate::model::StatusCode;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Returns a GET method answering 200 with one JSON example.
fn get_json(example: &str) -> Method {
    Method::new(HttpVerb::Get)
        .with_response(Response::new(StatusCode::OK).with_body(MediaType::json(), example))
}

// ============================================================================
// SECTION: Path Joining
// ============================================================================

#[test]
fn join_path_normalizes_separators() {
    assert_eq!(join_path("", ""), "/");
    assert_eq!(join_path("", "/"), "/");
    assert_eq!(join_path("/", "/containers"), "/containers");
    assert_eq!(join_path("/containers", "json"), "/containers/json");
    assert_eq!(join_path("/containers/", "/{id}"), "/containers/{id}");
    assert_eq!(join_path("/containers", ""), "/containers");
    assert_eq!(join_path("/containers", "a//b"), "/containers/a/b");
    assert_eq!(join_path("//containers", "//{id}//logs/"), "/containers/{id}/logs");
}

#[test]
fn repeated_separators_resolve_to_one_key() {
    let root = Resource::new("")
        .with_child(Resource::new("containers//{id}").with_method(get_json("{}")));
    let index = ContractIndex::from_tree(root).unwrap();
    assert!(index.paths().contains("/containers/{id}"));
    assert_eq!(index.lookup("/containers//{id}", "GET", 200, "application/json").unwrap(), "{}");
}

#[test]
fn separator_variants_of_one_path_are_duplicates() {
    let root = Resource::new("")
        .with_child(Resource::new("a//b").with_method(get_json("x")))
        .with_child(Resource::new("a/b").with_method(get_json("y")));
    let err = ContractIndex::from_tree(root).unwrap_err();
    assert!(matches!(err, ContractError::Malformed(_)));
}

// ============================================================================
// SECTION: Flattening
// ============================================================================

#[test]
fn root_resource_is_indexed_under_slash() {
    let root = Resource::new("").with_method(get_json("{}"));
    let index = ContractIndex::from_tree(root).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup("/", "GET", 200, "application/json").unwrap(), "{}");
}

#[test]
fn nested_paths_are_concatenated_from_the_root() {
    let root = Resource::new("").with_child(
        Resource::new("/containers")
            .with_child(Resource::new("/json").with_method(get_json("[]")))
            .with_child(
                Resource::new("/{id}")
                    .with_child(Resource::new("/top").with_method(get_json("{\"Titles\":[]}"))),
            ),
    );
    let index = ContractIndex::from_tree(root).unwrap();
    assert_eq!(index.len(), 2);
    let paths: Vec<&str> = index.paths().into_iter().collect();
    assert_eq!(paths, vec!["/containers/json", "/containers/{id}/top"]);
}

#[test]
fn empty_branches_contribute_nothing() {
    let root = Resource::new("")
        .with_child(Resource::new("/bare"))
        .with_child(Resource::new("/silent").with_method(Method::new(HttpVerb::Delete)))
        .with_child(
            Resource::new("/no-body")
                .with_method(Method::new(HttpVerb::Post).with_response(Response::new(StatusCode::NO_CONTENT))),
        );
    let index = ContractIndex::from_tree(root).unwrap();
    assert!(index.is_empty());
}

#[test]
fn deep_chain_does_not_exhaust_the_stack() {
    let mut leaf = Resource::new("/leaf").with_method(get_json("deep"));
    for depth in 0..3_000 {
        leaf = Resource::new(format!("/n{depth}")).with_child(leaf);
    }
    let model = ContractModel::from_tree(leaf);
    let index = ContractIndex::build(&model).unwrap();
    assert_eq!(index.len(), 1);
    let (key, example) = index.iter().next().unwrap();
    assert!(key.path.ends_with("/n0/leaf"));
    assert_eq!(example, "deep");
}

#[test]
fn nested_view_matches_flat_entries() {
    let root = Resource::new("/containers").with_method(
        Method::new(HttpVerb::Get)
            .with_response(
                Response::new(StatusCode::OK)
                    .with_body(MediaType::json(), "[]")
                    .with_body(MediaType::text(), "none"),
            )
            .with_response(Response::new(StatusCode::INTERNAL_SERVER_ERROR).with_body(MediaType::json(), "{}")),
    );
    let index = ContractIndex::from_tree(root).unwrap();
    let nested = index.nested();
    let statuses = &nested["/containers"][&HttpVerb::Get];
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[&StatusCode::OK][&MediaType::text()], "none");
    assert_eq!(index.methods_for("/containers/").len(), 1);
}

// ============================================================================
// SECTION: Malformed Trees
// ============================================================================

#[test]
fn back_edge_is_rejected_as_malformed() {
    let mut model = ContractModel::new("");
    let containers = model.add_resource(model.root(), "/containers", vec![get_json("[]")]).unwrap();
    let by_id = model.add_resource(containers, "/{id}", Vec::new()).unwrap();
    model.link(by_id, containers).unwrap();

    let err = ContractIndex::build(&model).unwrap_err();
    assert!(matches!(err, ContractError::Malformed(_)));
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn self_loop_is_rejected_as_malformed() {
    let mut model = ContractModel::new("");
    let root = model.root();
    model.link(root, root).unwrap();
    assert!(matches!(ContractIndex::build(&model), Err(ContractError::Malformed(_))));
}

#[test]
fn shared_child_is_rejected_as_malformed() {
    let mut model = ContractModel::new("");
    let left = model.add_resource(model.root(), "/left", Vec::new()).unwrap();
    let right = model.add_resource(model.root(), "/right", Vec::new()).unwrap();
    let shared = model.add_resource(left, "/shared", vec![get_json("x")]).unwrap();
    model.link(right, shared).unwrap();
    assert!(matches!(ContractIndex::build(&model), Err(ContractError::Malformed(_))));
}

#[test]
fn link_rejects_unknown_nodes() {
    let mut model = ContractModel::new("");
    let other = ContractModel::from_tree(
        Resource::new("").with_child(Resource::new("/a")).with_child(Resource::new("/b")),
    );
    let foreign = other.node(other.root()).unwrap().children[1];
    assert!(model.link(model.root(), foreign).is_err());
}

#[test]
fn duplicate_sibling_paths_are_rejected() {
    let root = Resource::new("")
        .with_child(Resource::new("/containers").with_method(get_json("a")))
        .with_child(Resource::new("containers").with_method(get_json("b")));
    let err = ContractIndex::from_tree(root).unwrap_err();
    assert!(err.to_string().contains("duplicate resource path /containers"));
}

#[test]
fn duplicate_verbs_statuses_and_media_types_are_rejected() {
    let verbs = Resource::new("/x").with_method(get_json("a")).with_method(get_json("b"));
    assert!(ContractIndex::from_tree(verbs).unwrap_err().to_string().contains("duplicate method"));

    let statuses = Resource::new("/x").with_method(
        Method::new(HttpVerb::Get)
            .with_response(Response::new(StatusCode::OK))
            .with_response(Response::new(StatusCode::OK)),
    );
    assert!(ContractIndex::from_tree(statuses).unwrap_err().to_string().contains("duplicate status"));

    let media = Resource::new("/x").with_method(
        Method::new(HttpVerb::Get).with_response(
            Response::new(StatusCode::OK)
                .with_body(MediaType::parse("Application/JSON").unwrap(), "a")
                .with_body(MediaType::json(), "b"),
        ),
    );
    assert!(ContractIndex::from_tree(media).unwrap_err().to_string().contains("duplicate media type"));
}

// ============================================================================
// SECTION: Lookups
// ============================================================================

#[test]
fn lookup_normalizes_key_components() {
    let root = Resource::new("/containers").with_method(get_json("[]"));
    let index = ContractIndex::from_tree(root).unwrap();
    assert_eq!(index.lookup("containers", "get", 200, " APPLICATION/json ").unwrap(), "[]");
}

#[test]
fn lookup_reports_missing_and_invalid_keys() {
    let index = ContractIndex::from_tree(Resource::new("/containers").with_method(get_json("[]"))).unwrap();

    let missing = index.lookup("/containers", "GET", 404, "application/json").unwrap_err();
    assert!(matches!(missing, LookupError::NotFound { .. }));

    assert!(matches!(
        index.lookup("/containers", "FETCH", 200, "application/json"),
        Err(LookupError::InvalidKey(_))
    ));
    assert!(matches!(
        index.lookup("/containers", "GET", 999, "application/json"),
        Err(LookupError::InvalidKey(_))
    ));
    assert!(matches!(
        index.lookup("/containers", "GET", 200, "json"),
        Err(LookupError::InvalidKey(_))
    ));
}

#[test]
fn charset_values_match_regardless_of_case() {
    let method = Method::new(HttpVerb::Get).with_response(
        Response::new(StatusCode::OK)
            .with_body(MediaType::parse("application/json; charset=UTF-8").unwrap(), "[]"),
    );
    let index = ContractIndex::from_tree(Resource::new("/containers").with_method(method)).unwrap();
    assert_eq!(index.lookup("/containers", "GET", 200, "application/json;charset=utf-8").unwrap(), "[]");
    assert_eq!(index.lookup("/containers", "GET", 200, "application/json;CHARSET=Utf-8").unwrap(), "[]");
    assert_eq!(
        MediaType::parse("text/plain;charset=UTF-8;format=Flowed").unwrap().as_str(),
        "text/plain;charset=utf-8;format=Flowed"
    );
}

#[test]
fn typed_key_lookup_matches_raw_lookup() {
    let index = ContractIndex::from_tree(Resource::new("/containers").with_method(get_json("[]"))).unwrap();
    let key = IndexKey::new("/containers", HttpVerb::Get, StatusCode::OK, MediaType::json());
    assert_eq!(index.get(&key), Some("[]"));
    assert_eq!(index.lookup_key(&key).unwrap(), "[]");
}
