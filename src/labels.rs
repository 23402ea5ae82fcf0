use crate::error::{Result, TraceError};

/// Produce one label per (pattern, file) pair, pattern-major.
///
/// User labels are passed through unchanged when their count equals
/// `patterns * files`. Without user labels each pair gets
/// `"<file>: <selector_a> - <selector_b>"`.
pub fn resolve_labels<F, P>(
    labels: Option<&[String]>,
    file_names: &[F],
    raw_patterns: &[P],
) -> Result<Vec<String>>
where
    F: AsRef<str>,
    P: AsRef<str>,
{
    let expected = raw_patterns.len() * file_names.len();
    if let Some(labels) = labels {
        if labels.len() != expected {
            return Err(TraceError::LabelCountMismatch {
                given: labels.len(),
                expected,
                patterns: raw_patterns.len(),
                files: file_names.len(),
            });
        }
        return Ok(labels.to_vec());
    }

    let mut resolved = Vec::with_capacity(expected);
    for pattern in raw_patterns {
        for file in file_names {
            resolved.push(default_label(file.as_ref(), pattern.as_ref()));
        }
    }
    Ok(resolved)
}

pub fn default_label(file_name: &str, raw_pattern: &str) -> String {
    format!("{}: {}", file_name, join_selectors(raw_pattern))
}

// Replace only the whitespace run separating the two selectors with " - ".
fn join_selectors(raw: &str) -> String {
    let lead = raw.len() - raw.trim_start().len();
    let body = &raw[lead..];
    let Some(end_a) = body.find(char::is_whitespace) else {
        return raw.to_string();
    };
    let tail = &body[end_a..];
    let start_b = tail.len() - tail.trim_start().len();
    format!("{}{} - {}", &raw[..lead], &body[..end_a], &tail[start_b..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels_follow_pattern_major_order() {
        let labels = resolve_labels(None, &["f0.tsv", "f1.tsv"], &["A B", "C D"]).unwrap();
        assert_eq!(
            labels,
            vec![
                "f0.tsv: A - B",
                "f1.tsv: A - B",
                "f0.tsv: C - D",
                "f1.tsv: C - D",
            ]
        );
    }

    #[test]
    fn default_label_keeps_regex_text() {
        assert_eq!(
            default_label("5xnd.tsv", "A:ILE:51:CD1 A:PHE:103:C[GDEZ].*"),
            "5xnd.tsv: A:ILE:51:CD1 - A:PHE:103:C[GDEZ].*"
        );
    }

    #[test]
    fn only_the_delimiting_whitespace_is_replaced() {
        assert_eq!(join_selectors("A\t\tB"), "A - B");
        assert_eq!(join_selectors(" A  B "), " A - B ");
    }

    #[test]
    fn exact_label_count_is_accepted_verbatim() {
        let given: Vec<String> = ["w", "x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let labels = resolve_labels(Some(given.as_slice()), &["f0", "f1"], &["A B", "C D"]).unwrap();
        assert_eq!(labels, given);
    }

    #[test]
    fn one_label_short_is_rejected() {
        let given: Vec<String> = ["w", "x", "y"].iter().map(|s| s.to_string()).collect();
        let err = resolve_labels(Some(given.as_slice()), &["f0", "f1"], &["A B", "C D"]).unwrap_err();
        match err {
            TraceError::LabelCountMismatch {
                given,
                expected,
                patterns,
                files,
            } => {
                assert_eq!((given, expected, patterns, files), (3, 4, 2, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
