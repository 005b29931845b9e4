//! Prim search by type name or kind.

use vfxi_usd::{Path, Prim, PrimPredicate, Stage};

/// Collect the paths of prims whose type name equals `type_name` or whose
/// `kind` equals `kind`, depth first starting at `prim`.
///
/// An empty `type_name` or `kind` never matches. Matching prims are not
/// descended into. With `include_abstract`, children are enumerated with
/// the all-prims predicate (class prims, inactive and undefined prims are
/// searched); otherwise with the default predicate. Instance proxies are
/// searched in both modes.
pub fn find_type_or_kind(
    result: &mut Vec<Path>,
    prim: &Prim<'_>,
    type_name: &str,
    kind: &str,
    include_abstract: bool,
) {
    let type_matches = !type_name.is_empty() && prim.type_name() == type_name;
    let kind_matches = !kind.is_empty() && prim.kind() == Some(kind);

    if type_matches || kind_matches {
        result.push(prim.path().clone());
        return;
    }

    let predicate = if include_abstract {
        PrimPredicate::all_prims()
    } else {
        PrimPredicate::default_predicate()
    };

    for child in prim.filtered_children(predicate.traverse_instance_proxies()) {
        find_type_or_kind(result, &child, type_name, kind, include_abstract);
    }
}

/// Search a whole stage from its pseudo-root.
pub fn find_in_stage(stage: &Stage, type_name: &str, kind: &str, include_abstract: bool) -> Vec<Path> {
    let mut result = Vec::new();
    find_type_or_kind(&mut result, &stage.pseudo_root(), type_name, kind, include_abstract);
    log::debug!(
        "Found {} prims matching type {type_name:?} / kind {kind:?}",
        result.len()
    );
    result
}
