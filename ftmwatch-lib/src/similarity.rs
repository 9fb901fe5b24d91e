//! Line-level similarity scoring between an extracted contract body and the reference
//! templates, used to pick the closest known template for a newly discovered contract.
//!
//! The distance metric is the number of non-blank changed lines across a classic
//! LCS-based line diff (insertions + deletions; a substitution counts as one of each).
//! Cost is O(lines_a x lines_b) per pair which is fine here: the template set is small
//! and scoring only runs for newly discovered, keyword-matched contracts.

use crate::template::Template;

/// Returns the number of non-blank lines that differ between `a` and `b`.
pub fn line_diff_distance(a: &str, b: &str) -> usize {
    let lines_a: Vec<&str> = a.lines().collect();
    let lines_b: Vec<&str> = b.lines().collect();

    let (matched_a, matched_b) = lcs_matches(&lines_a, &lines_b);

    let changed = |lines: &[&str], matched: &[bool]| {
        lines
            .iter()
            .zip(matched)
            .filter(|(line, is_matched)| !**is_matched && !line.trim().is_empty())
            .count()
    };

    changed(&lines_a, &matched_a) + changed(&lines_b, &matched_b)
}

/// Returns the template with the minimum diff distance to `code`; ties are broken by
/// enumeration order (first wins), which [`crate::template::load`] keeps stable by
/// sorting templates by name.
pub fn closest_template<'a>(code: &str, templates: &'a [Template]) -> Option<&'a Template> {
    let mut closest: Option<(&Template, usize)> = None;

    for template in templates {
        let distance = line_diff_distance(&template.code, code);

        match closest {
            Some((_, min_distance)) if distance >= min_distance => (),
            _ => closest = Some((template, distance)),
        }
    }

    closest.map(|(template, _)| template)
}

/// Standard LCS dynamic program over lines; returns per-line flags marking which lines of
/// each side are part of the common subsequence.
fn lcs_matches(lines_a: &[&str], lines_b: &[&str]) -> (Vec<bool>, Vec<bool>) {
    let n = lines_a.len();
    let m = lines_b.len();

    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = match lines_a[i] == lines_b[j] {
                true => table[i + 1][j + 1] + 1,
                false => table[i + 1][j].max(table[i][j + 1]),
            };
        }
    }

    let mut matched_a = vec![false; n];
    let mut matched_b = vec![false; m];

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if lines_a[i] == lines_b[j] {
            matched_a[i] = true;
            matched_b[j] = true;
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }

    (matched_a, matched_b)
}

#[cfg(test)]
mod tests {
    use crate::similarity::closest_template;
    use crate::similarity::line_diff_distance;
    use crate::template::Template;

    fn template(name: &str, code: &str) -> Template {
        Template {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn identical_inputs_have_distance_zero() {
        let code = "contract Foo {\n    uint256 bar;\n}";
        assert_eq!(line_diff_distance(code, code), 0);
    }

    #[test]
    fn substitution_counts_as_one_insertion_plus_one_deletion() {
        let a = "contract Foo {\n    uint256 bar;\n}";
        let b = "contract Foo {\n    uint256 baz;\n}";
        assert_eq!(line_diff_distance(a, b), 2);
    }

    #[test]
    fn blank_line_changes_are_not_counted() {
        let a = "contract Foo {\n}";
        let b = "contract Foo {\n\n   \n}";
        assert_eq!(line_diff_distance(a, b), 0);
    }

    #[test]
    fn pure_insertion_counts_inserted_lines() {
        let a = "contract Foo {\n}";
        let b = "contract Foo {\n    uint256 bar;\n    uint256 baz;\n}";
        assert_eq!(line_diff_distance(a, b), 2);
    }

    #[test]
    fn closest_template_exact_match() {
        let templates = vec![
            template("Vault", "contract Vault {\n    uint256 shares;\n}"),
            template("Token", "contract Token {\n    uint256 supply;\n}"),
        ];

        let closest = closest_template("contract Token {\n    uint256 supply;\n}", &templates);
        assert_eq!(closest.unwrap().name, "Token");
    }

    #[test]
    fn closest_template_no_overlap_prefers_fewest_lines() {
        let templates = vec![
            template("Big", "a\nb\nc\nd\ne"),
            template("Small", "a\nb"),
        ];

        // Zero common lines on both sides, so distances reduce to line counts
        let closest = closest_template("x\ny\nz", &templates);
        assert_eq!(closest.unwrap().name, "Small");
    }

    #[test]
    fn closest_template_tie_breaks_on_enumeration_order() {
        let templates = vec![
            template("First", "a\nb"),
            template("Second", "a\nb"),
        ];

        let closest = closest_template("a\nb", &templates);
        assert_eq!(closest.unwrap().name, "First");
    }

    #[test]
    fn closest_template_empty_set_is_none() {
        assert!(closest_template("a", &[]).is_none());
    }
}
