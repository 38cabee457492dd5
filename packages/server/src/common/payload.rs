//! Bounded key search over untyped JSON trees.
//!
//! Webhook bodies nest the account id at different depths depending on the
//! event kind. The search is breadth-first, so the shallowest match wins, and
//! stops at a fixed depth and node budget.

use std::collections::VecDeque;

use serde_json::Value;

pub const MAX_SEARCH_DEPTH: usize = 6;
pub const MAX_SEARCH_NODES: usize = 2_000;

/// First value stored under one of `keys`, searching at most `max_depth`
/// levels below `root`. Keys are tried in order at each object.
pub fn find_key<'a>(root: &'a Value, keys: &[&str], max_depth: usize) -> Option<&'a Value> {
    let mut queue = VecDeque::from([(root, 0usize)]);
    let mut visited = 0;

    while let Some((node, depth)) = queue.pop_front() {
        visited += 1;
        if visited > MAX_SEARCH_NODES {
            tracing::warn!(visited, "Payload key search hit node budget");
            return None;
        }

        let children: Box<dyn Iterator<Item = &Value>> = match node {
            Value::Object(map) => {
                if let Some(found) = keys.iter().find_map(|k| map.get(*k)) {
                    if !found.is_null() {
                        return Some(found);
                    }
                }
                Box::new(map.values())
            }
            Value::Array(items) => Box::new(items.iter()),
            _ => continue,
        };

        if depth < max_depth {
            queue.extend(children.map(|child| (child, depth + 1)));
        }
    }

    None
}

/// Like [`find_key`] but only accepts identifier-shaped values: a non-empty
/// string or a non-negative integer, returned as a string.
pub fn find_id(root: &Value, keys: &[&str], max_depth: usize) -> Option<String> {
    match find_key(root, keys, max_depth)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}
