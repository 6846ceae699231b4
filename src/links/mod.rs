//! This module resolves BPEL control links: the source/target edges that
//! order activities independently of their structural nesting, the join
//! conditions guarding link targets, and the inherited suppressJoinFailure
//! policy.

use tracing::trace;

use crate::document::NodeRef;
use crate::error::Error;

/// Checks whether the node is the target of at least one control link.
pub fn has_incoming_links(node: NodeRef<'_>) -> bool {
    node.specific_child("targets")
        .is_some_and(|targets| !targets.specific_children("target").is_empty())
}

/// Checks whether the node is the source of at least one control link.
pub fn has_outgoing_links(node: NodeRef<'_>) -> bool {
    node.specific_child("sources")
        .is_some_and(|sources| !sources.specific_children("source").is_empty())
}

/// The names of all control links arriving at the node, in document order.
/// A node without a targets child has no incoming links.
pub fn incoming_link_names(node: NodeRef<'_>) -> Result<Vec<&str>, Error> {
    link_names(node, "targets", "target")
}

/// The names of all control links leaving the node, in document order.
pub fn outgoing_link_names(node: NodeRef<'_>) -> Result<Vec<&str>, Error> {
    link_names(node, "sources", "source")
}

fn link_names<'doc>(
    node: NodeRef<'doc>,
    group: &str,
    member: &'static str,
) -> Result<Vec<&'doc str>, Error> {
    let Some(group_node) = node.specific_child(group) else {
        return Ok(Vec::new());
    };
    group_node
        .specific_children(member)
        .into_iter()
        .map(|link| link_name(link, member))
        .collect()
}

/// A source or target element without a linkName is a malformed document; fail fast
fn link_name<'doc>(link: NodeRef<'doc>, element: &'static str) -> Result<&'doc str, Error> {
    link.attribute("linkName")
        .ok_or(Error::MissingLinkName { element })
}

/// Gets the join condition for a node with incoming control links.
///
/// An explicit joincondition element wins and its text is returned
/// verbatim. Without one, the implicit join condition is constructed: the
/// names of all incoming links joined with " OR ", in document order of the
/// target elements. A node without incoming links yields the empty string.
pub fn join_condition(node: NodeRef<'_>) -> Result<String, Error> {
    let Some(targets) = node.specific_child("targets") else {
        return Ok(String::new());
    };
    if let Some(condition) = targets.specific_child("joincondition") {
        return Ok(condition.text_content());
    }
    // There is no explicit join condition, so we construct the implicit one
    let names = targets
        .specific_children("target")
        .into_iter()
        .map(|target| link_name(target, "target"))
        .collect::<Result<Vec<_>, _>>()?;
    trace!(links = names.len(), "constructed implicit join condition");
    Ok(names.join(" OR "))
}

/// Resolves the suppressJoinFailure flag for the node.
///
/// The node's own attribute settles the answer when present. Otherwise the
/// flag is inherited from the enclosing scopes, all the way up to the
/// process root; a document whose chain never sets it does not suppress.
pub fn is_join_failure_suppressed(node: NodeRef<'_>) -> bool {
    if node.attribute("suppressJoinFailure").is_some() {
        return node.boolean_attribute("suppressJoinFailure", "yes");
    }
    match node.parent() {
        Some(parent) => is_join_failure_suppressed(parent),
        None => false,
    }
}
