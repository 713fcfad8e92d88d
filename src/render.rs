//! Response rendering for GemChat
//!
//! Splits a model response into alternating prose and fenced-code
//! segments so the chat surface can display code blocks distinctly.
//! Fences are triple-backtick markers with an optional language tag on
//! the opening fence. An unterminated fence is rendered as a code block
//! extending to the end of the input; nothing is ever dropped.

use colored::Colorize;

/// Fence marker
const FENCE: &str = "```";

/// One display segment of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text outside any fence
    Prose(String),
    /// Fenced code with its (possibly empty) language hint
    Code {
        /// Language tag from the opening fence
        language: String,
        /// Literal code content
        content: String,
    },
}

/// Split a response string into ordered prose/code segments
///
/// # Examples
///
/// ```
/// use gemchat::render::{split_fences, Segment};
///
/// let segments = split_fences("see ```rust\nfn main() {}\n``` above");
/// assert_eq!(segments.len(), 3);
/// assert!(matches!(&segments[1], Segment::Code { language, .. } if language == "rust"));
/// ```
pub fn split_fences(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find(FENCE) {
        if open > 0 {
            segments.push(Segment::Prose(rest[..open].to_string()));
        }

        let after_marker = &rest[open + FENCE.len()..];

        // A closing fence on the opening line ends the block right
        // there; the language hint never extends past a backtick
        let line_end = after_marker.find('\n').unwrap_or(after_marker.len());
        if let Some(close) = after_marker[..line_end].find(FENCE) {
            segments.push(Segment::Code {
                language: after_marker[..close].trim().to_string(),
                content: String::new(),
            });
            rest = &after_marker[close + FENCE.len()..];
            continue;
        }

        // The language hint occupies the remainder of the opening line
        let (language, body) = match after_marker.find('\n') {
            Some(newline) => (
                after_marker[..newline].trim().to_string(),
                &after_marker[newline + 1..],
            ),
            // Fence opened at the very end of input: hint only, no body
            None => (after_marker.trim().to_string(), ""),
        };

        match body.find(FENCE) {
            Some(close) => {
                let mut content = &body[..close];
                // The closing fence sits on its own line; the newline that
                // put it there belongs to the fence, not the code
                if let Some(stripped) = content.strip_suffix('\n') {
                    content = stripped;
                }
                segments.push(Segment::Code {
                    language,
                    content: content.to_string(),
                });
                rest = &body[close + FENCE.len()..];
            }
            None => {
                // Unterminated fence: code extends to end of input
                segments.push(Segment::Code {
                    language,
                    content: body.to_string(),
                });
                rest = "";
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Prose(rest.to_string()));
    }

    segments
}

/// Print a response to the terminal, code blocks set apart
///
/// Prose prints as-is; code blocks print with a dimmed fence line
/// carrying the language hint and yellow content.
pub fn print_response(text: &str) {
    for segment in split_fences(text) {
        match segment {
            Segment::Prose(prose) => {
                let trimmed = prose.trim_matches('\n');
                if !trimmed.is_empty() {
                    println!("{}", trimmed);
                }
            }
            Segment::Code { language, content } => {
                println!("{}", format!("```{}", language).dimmed());
                println!("{}", content.yellow());
                println!("{}", "```".dimmed());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prose(text: &str) -> Segment {
        Segment::Prose(text.to_string())
    }

    fn code(language: &str, content: &str) -> Segment {
        Segment::Code {
            language: language.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_split_prose_code_prose() {
        let segments = split_fences("hello ```python\nprint(1)\n``` world");
        assert_eq!(
            segments,
            vec![
                prose("hello "),
                code("python", "print(1)"),
                prose(" world"),
            ]
        );
    }

    #[test]
    fn test_no_fences_single_prose_segment() {
        let input = "just a plain reply, nothing fenced";
        assert_eq!(split_fences(input), vec![prose(input)]);
    }

    #[test]
    fn test_empty_input_yields_no_segments() {
        assert!(split_fences("").is_empty());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let segments = split_fences("```\nno hint\n```");
        assert_eq!(segments, vec![code("", "no hint")]);
    }

    #[test]
    fn test_fence_at_start_of_input() {
        let segments = split_fences("```sh\nls -la\n```\ndone");
        assert_eq!(segments, vec![code("sh", "ls -la"), prose("\ndone")]);
    }

    #[test]
    fn test_multiple_fences() {
        let segments = split_fences("a ```py\n1\n``` b ```rb\n2\n``` c");
        assert_eq!(
            segments,
            vec![
                prose("a "),
                code("py", "1"),
                prose(" b "),
                code("rb", "2"),
                prose(" c"),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_extends_to_end() {
        let segments = split_fences("before ```python\nprint(1)\nprint(2)");
        assert_eq!(
            segments,
            vec![prose("before "), code("python", "print(1)\nprint(2)")]
        );
    }

    #[test]
    fn test_unterminated_fence_with_no_body() {
        let segments = split_fences("trailing ```rust");
        assert_eq!(segments, vec![prose("trailing "), code("rust", "")]);
    }

    #[test]
    fn test_one_line_fence_pair() {
        // The closing marker on the opening line must not leak into
        // the language hint
        let segments = split_fences("a ```x``` b");
        assert_eq!(segments, vec![prose("a "), code("x", ""), prose(" b")]);
    }

    #[test]
    fn test_one_line_fence_pair_before_real_block() {
        let segments = split_fences("``````\n```sh\nls\n```");
        assert_eq!(segments, vec![code("", ""), prose("\n"), code("sh", "ls")]);
    }

    #[test]
    fn test_language_tag_is_trimmed() {
        let segments = split_fences("``` python  \nx\n```");
        assert_eq!(segments, vec![code("python", "x")]);
    }

    #[test]
    fn test_multiline_code_preserves_inner_newlines() {
        let segments = split_fences("```\nline1\n\nline3\n```");
        assert_eq!(segments, vec![code("", "line1\n\nline3")]);
    }
}
