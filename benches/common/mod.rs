//! Common utilities for benchmarks.
//!
//! Provides patch generators with fixed seeds for reproducibility.

#![allow(dead_code)]

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fixed seed for reproducible benchmark data
const SEED: u64 = 42;

/// Body lines per generated hunk
const HUNK_LINES: usize = 30;

/// Create a seeded RNG for reproducible test data
pub fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

/// Generate a line of realistic Rust-like code
fn generate_code_line(rng: &mut ChaCha8Rng, line_num: usize) -> String {
    let templates = [
        "    let x = value.unwrap_or_default();",
        "    fn process_data(input: &str) -> Result<String> {",
        "    }",
        "    if condition { return Ok(()); }",
        "    for item in items.iter() {",
        "    match result {",
        "        Ok(v) => v,",
        "        Err(e) => return Err(e),",
        "    use std::collections::HashMap;",
        "    pub struct Config {",
        "        field: String,",
        "    impl Default for Config {",
        "    #[derive(Debug, Clone)]",
        "    /// Documentation comment",
        "    // Regular comment",
        "    assert_eq!(expected, actual);",
        "\tprintln!(\"Debug: {}\", value);",
        "    self.inner.lock().unwrap()",
        "    async fn fetch_data() -> Result<Vec<u8>> {",
        "    .map(|x| x * 2)",
    ];

    let idx = rng.random_range(0..templates.len());
    format!("{} // line {}", templates[idx], line_num)
}

/// Generate one hunk with consistent header counts.
///
/// Roughly 20% removed, 20% added, 60% context lines; removed lines are
/// followed by a slightly edited replacement so that char refinement runs.
fn generate_hunk(
    rng: &mut ChaCha8Rng,
    left_start: usize,
    right_start: usize,
) -> (String, usize, usize) {
    let mut body = Vec::with_capacity(HUNK_LINES);
    let (mut left_count, mut right_count) = (0, 0);

    for i in 0..HUNK_LINES {
        let content = generate_code_line(rng, left_start + i);
        match rng.random_range(0..10u8) {
            0..=1 => {
                body.push(format!("-{}", content));
                body.push(format!("+{}", content.replace("value", "other")));
                left_count += 1;
                right_count += 1;
            }
            2..=3 => {
                body.push(format!("+{}", content));
                right_count += 1;
            }
            _ => {
                body.push(format!(" {}", content));
                left_count += 1;
                right_count += 1;
            }
        }
    }

    let header = format!(
        "@@ -{},{} +{},{} @@ fn generated() {{",
        left_start, left_count, right_start, right_count
    );
    (format!("{}\n{}\n", header, body.join("\n")), left_count, right_count)
}

/// Generate a git patch with `file_count` files of `hunks_per_file` hunks each
pub fn generate_git_patch(file_count: usize, hunks_per_file: usize) -> String {
    let mut rng = seeded_rng();
    let mut patch = String::new();

    for file in 0..file_count {
        let name = format!("src/module_{}.rs", file);
        patch.push_str(&format!(
            "diff --git a/{0} b/{0}\nindex 1234567..89abcde 100644\n--- a/{0}\n+++ b/{0}\n",
            name
        ));

        let (mut left_start, mut right_start) = (1, 1);
        for _ in 0..hunks_per_file {
            let (hunk, left_count, right_count) =
                generate_hunk(&mut rng, left_start, right_start);
            patch.push_str(&hunk);
            // Leave a gap so every hunk after the first gets a skip block
            left_start += left_count + 50;
            right_start += right_count + 50;
        }
    }

    patch
}

/// Generate a unified (non-git) patch for the fallback path
pub fn generate_unified_patch(hunks: usize) -> String {
    let git = generate_git_patch(1, hunks);
    git.lines()
        .filter(|line| !line.starts_with("diff --git") && !line.starts_with("index "))
        .map(|line| format!("{}\n", line))
        .collect()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_generate_git_patch_reproducible() {
        let patch1 = super::generate_git_patch(2, 3);
        let patch2 = super::generate_git_patch(2, 3);
        assert_eq!(patch1, patch2);
    }

    #[test]
    fn test_generate_git_patch_file_count() {
        let patch = super::generate_git_patch(4, 2);
        assert_eq!(patch.matches("diff --git ").count(), 4);
        assert_eq!(patch.matches("\n@@ -").count(), 8);
    }

    #[test]
    fn test_generate_unified_patch_has_no_git_header() {
        let patch = super::generate_unified_patch(3);
        assert!(!patch.contains("diff --git"));
        assert!(patch.starts_with("--- a/"));
    }
}
