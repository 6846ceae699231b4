//! This module holds the static knowledge of which BPEL elements are
//! activities, and the activity-tree queries built on top of it.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::document::NodeRef;

/// The element names BPEL defines as activities.
/// Initialized once at startup and read-only afterwards, so it is safe to
/// consult from any number of threads.
pub static BPEL_ACTIVITIES: LazyLock<HashSet<&'static str, ahash::RandomState>> =
    LazyLock::new(|| {
        [
            "invoke",
            "receive",
            "reply",
            "wait",
            "exit",
            "empty",
            "throw",
            "rethrow",
            "validate",
            "assign",
            "compensate",
            "compensatescope",
            "pick",
            "onmessage",
            "onalarm",
            "sequence",
            "while",
            "repeatuntil",
            "foreach",
            "flow",
            "scope",
        ]
        .into_iter()
        .collect()
    });

/// Checks whether an element name denotes a BPEL activity.
/// The comparison is a case-sensitive exact match against [`BPEL_ACTIVITIES`].
pub fn is_activity(element_name: &str) -> bool {
    BPEL_ACTIVITIES.contains(element_name)
}

/// An element qualifies when its tag is in the activity set; text nodes never do
fn is_activity_node(node: &NodeRef<'_>) -> bool {
    node.element_name().is_some_and(is_activity)
}

/// Checks whether the node has a direct child that is a BPEL activity.
pub fn has_activity_child(node: NodeRef<'_>) -> bool {
    node.children().any(|child| is_activity_node(&child))
}

/// Get the direct child of the node that is a BPEL activity.
/// Every child is scanned and the last activity encountered wins, matching
/// the last-wins lookup of [`NodeRef::specific_child`].
pub fn activity_child(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.children().filter(is_activity_node).last()
}

/// Get all direct children of the node that are BPEL activities, in document order.
pub fn all_activity_children(node: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    node.children().filter(is_activity_node).collect()
}

/// Get every activity in the subtree below the node, in document order.
/// A matched activity is collected and then descended into, so nested
/// activities surface alongside their containers. The node itself is never
/// part of the result, and text children are skipped at every level.
pub fn all_activity_descendants(node: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    let mut found = Vec::new();
    collect_activity_descendants(node, &mut found);
    found
}

fn collect_activity_descendants<'doc>(node: NodeRef<'doc>, found: &mut Vec<NodeRef<'doc>>) {
    for child in node.children().filter(is_activity_node) {
        found.push(child);
        collect_activity_descendants(child, found);
    }
}

/// Checks whether the optional attribute createInstance is set to yes for a
/// specific node. That relates to receive and pick activities.
pub fn is_create_instance_set(node: NodeRef<'_>) -> bool {
    node.boolean_attribute("createInstance", "yes")
}

/// Checks whether any activity below the node has createInstance set.
pub fn has_create_instance_descendant(node: NodeRef<'_>) -> bool {
    all_activity_descendants(node)
        .into_iter()
        .any(is_create_instance_set)
}

/// Checks whether the node maps to exactly one target construct rather than
/// a compound structure. That holds for assign and validate only.
pub fn maps_to_single_activity(node: NodeRef<'_>) -> bool {
    matches!(
        node.element_name(),
        Some(name) if name.eq_ignore_ascii_case("assign") || name.eq_ignore_ascii_case("validate")
    )
}

/// Checks whether an invoke activity is synchronous or not. That depends on
/// the definition of output data, either set via the attribute
/// outputVariable or a toParts construct.
pub fn is_synchronous_invoke(node: NodeRef<'_>) -> bool {
    let is_invoke = node
        .element_name()
        .is_some_and(|name| name.eq_ignore_ascii_case("invoke"));
    if !is_invoke {
        return false;
    }
    node.attribute("outputVariable").is_some() || node.specific_child("toParts").is_some()
}
