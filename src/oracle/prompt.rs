//! Prompt construction for namespace suggestions.

use std::fmt::Write as _;

use crate::assign::AllowList;
use crate::core::config::CUSTOM_LABEL;

use super::types::ContextPacket;

pub(crate) const SYSTEM_PROMPT: &str =
    "You are an experienced AL developer who assigns namespaces to Business Central objects.";

const OUTPUT_SHAPE: &str =
    r#"{"namespace": "...", "reason": "...", "alternatives": [{"namespace": "...", "reason": "..."}]}"#;

/// Render the user prompt for one object.
pub fn build_prompt(packet: &ContextPacket, allow_list: &AllowList, reason_language: &str) -> String {
    let mut prompt = String::with_capacity(packet.excerpt.len() + 4096);

    prompt.push_str(
        "Analyse the AL object below and choose the namespace it belongs to. \
         Follow the conventions of the Microsoft Base Application: when referenced base objects \
         already live in a namespace, prefer that namespace so that all product lines agree.\n",
    );
    let _ = writeln!(
        prompt,
        "Write the reason and every alternative's reason in {reason_language}."
    );
    prompt.push_str(
        "Use only the short label from this list in the \"namespace\" field, never a dotted path:\n",
    );
    for (name, description) in allow_list.entries() {
        if description.is_empty() {
            let _ = writeln!(prompt, "- {name}");
        } else {
            let _ = writeln!(prompt, "- {name}: {description}");
        }
    }
    let _ = writeln!(
        prompt,
        "If none of these fits, answer '{CUSTOM_LABEL}' and explain why in detail.\n"
    );

    let _ = writeln!(prompt, "Object type: {}", packet.kind);
    let _ = writeln!(prompt, "Object name: {}", packet.name);
    if let Some(solution) = &packet.solution {
        let _ = writeln!(prompt, "Product line: {solution}");
    }
    let _ = writeln!(prompt, "AL code:\n{}", packet.excerpt);
    if packet.truncated {
        prompt.push_str("[source truncated]\n");
    }

    if !packet.references.is_empty() {
        prompt.push_str("\nReferenced objects:\n");
        for reference in &packet.references {
            let _ = writeln!(
                prompt,
                "- Name: {}, Type: {}, Namespace: {}, Directory: {}",
                reference.name,
                reference.kind,
                reference.namespace.as_deref().unwrap_or("unknown"),
                reference.directory
            );
        }
    }

    if !packet.neighbors.is_empty() {
        prompt.push_str("\nSimilar objects that already have a namespace:\n");
        for neighbor in &packet.neighbors {
            let _ = writeln!(
                prompt,
                "- Name: {}, Type: {}, Namespace: {}, Location: {}",
                neighbor.name, neighbor.kind, neighbor.namespace, neighbor.location
            );
        }
    }

    let _ = write!(
        prompt,
        "\nReturn a single JSON object in exactly this shape and nothing else:\n{OUTPUT_SHAPE}\n"
    );
    prompt
}
