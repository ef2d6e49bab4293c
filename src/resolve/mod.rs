//! Variable substitution.
//!
//! Fills may reference the document's variable table as `$name`. This pass
//! replaces every such reference with the variable's literal value, in
//! place, so layout and rendering only ever see concrete colors.

use std::collections::BTreeMap;

use log::trace;

use crate::error::{PenError, Result};
use crate::model::{Document, Fill, Frame, Node, Variable};

/// Replace `$name` references in frame and text fills with variable values.
///
/// A document with no variable table at all is left untouched, references
/// included. An empty table still rejects every `$name`.
pub fn resolve(document: &mut Document) -> Result<()> {
    let Some(variables) = document.variables.as_ref() else {
        return Ok(());
    };

    for child in &mut document.children {
        resolve_node(child, variables)?;
    }
    Ok(())
}

fn resolve_node(node: &mut Node, variables: &BTreeMap<String, Variable>) -> Result<()> {
    match node {
        Node::Frame(frame) => resolve_frame(frame, variables),
        Node::Text(text) => {
            if let Some(value) = lookup(&text.fill, &text.id, variables)? {
                text.fill = value;
            }
            Ok(())
        }
    }
}

fn resolve_frame(frame: &mut Frame, variables: &BTreeMap<String, Variable>) -> Result<()> {
    if let Some(Fill::Solid { color }) = &mut frame.fill {
        if let Some(value) = lookup(color, &frame.id, variables)? {
            *color = value;
        }
    }

    for child in &mut frame.children {
        resolve_node(child, variables)?;
    }
    Ok(())
}

/// `Ok(None)` when `value` is not a reference.
fn lookup(value: &str, node: &str, variables: &BTreeMap<String, Variable>) -> Result<Option<String>> {
    let Some(name) = value.strip_prefix('$') else {
        return Ok(None);
    };

    let variable = variables
        .get(name)
        .ok_or_else(|| PenError::UndefinedVariable {
            node: node.to_string(),
            name: name.to_string(),
        })?;

    let resolved = variable
        .as_str()
        .ok_or_else(|| PenError::VariableNotString {
            node: node.to_string(),
            name: name.to_string(),
        })?;

    trace!("{node}: ${name} -> {resolved}");
    Ok(Some(resolved.to_string()))
}
