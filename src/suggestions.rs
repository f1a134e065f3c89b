//! # Error Suggestions
//!
//! Helpers that build user-facing errors carrying hints, so a failed command
//! says both what went wrong and how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagsync::suggestions;
//!
//! if !path.exists() {
//!     return Err(suggestions::desired_not_found(path));
//! }
//! ```

use std::path::Path;

/// The desired-state file does not exist.
pub fn desired_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Desired state file not found: {path}\n\n\
         hint: Export the current workspace with 'tagsync snapshot --output {path}'\n\
         hint: Use --desired to point at a different JSON or YAML file",
        path = path.display()
    )
}

/// The store state file does not exist.
pub fn state_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Workspace state file not found: {path}\n\n\
         hint: Use --state to point at a different file\n\
         hint: Set the TAGSYNC_STATE environment variable",
        path = path.display()
    )
}

/// The named workspace does not exist in the selected container.
pub fn workspace_not_found(name: &str, container: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Workspace '{name}' not found in {container}\n\n\
         hint: Run 'tagsync sync' without --dry-run to create it\n\
         hint: Use --workspace-name to select an existing workspace"
    )
}

/// A target key is not present in the target mapping.
pub fn unknown_target_key(key: &str, available: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(key, available)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();
    let listed = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };

    anyhow::anyhow!(
        "Unknown target key: {key}{did_you_mean}\n\n\
         Available target keys: {listed}\n\
         hint: Run 'tagsync targets' to list the configured targets"
    )
}

/// Find the candidate closest to `input`.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance over two rolling rows.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
