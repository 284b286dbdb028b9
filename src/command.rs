/// One pipeline stage, built from a parsed segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Assigned sequentially by the resolver once the executable is found.
    /// `None` marks an unresolved command, which never launches.
    pub process_index: Option<usize>,
    /// argv[0] is the executable name, rewritten in place on resolution.
    pub argv: Vec<String>,
    /// 0 = no outbound pipe, 1 = pipe to the next stage, N = N stages ahead.
    pub pipe_offset: usize,
    /// When set, stdout goes to this file instead of any pipe target.
    pub output_file: Option<String>,
}

impl Command {
    fn from_segment(mut tokens: Vec<String>) -> Option<Command> {
        let mut pipe_offset = 0;

        if let Some(last) = tokens.last() {
            if last.contains('|') {
                pipe_offset = if last.chars().count() == 1 {
                    1
                } else {
                    let mut suffix = last.chars();
                    suffix.next();
                    parse_offset(suffix.as_str())
                };
                tokens.pop();
            }
        }

        let mut output_file = None;
        if tokens.len() > 2 && tokens[tokens.len() - 2] == ">" {
            output_file = tokens.pop();
            tokens.pop();
        }

        if tokens.is_empty() {
            return None;
        }

        Some(Command {
            process_index: None,
            argv: tokens,
            pipe_offset,
            output_file,
        })
    }
}

/// Leading-digit parse of a pipe-target suffix, atoi style: `"2"` and `"2x"`
/// both give 2, anything without leading digits gives 0. The zero fallback
/// mirrors the legacy behavior rather than rejecting the token.
fn parse_offset(suffix: &str) -> usize {
    let digits: String = suffix.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Build one `Command` per segment, in pipeline order. Segments that would
/// leave an empty argv (e.g. a lone pipe token) are dropped.
pub fn build_commands(segments: Vec<Vec<String>>) -> Vec<Command> {
    segments.into_iter().filter_map(Command::from_segment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_pipe_means_next_stage() {
        let cmds = build_commands(vec![seg(&["cat", "|"])]);
        assert_eq!(cmds[0].argv, vec!["cat"]);
        assert_eq!(cmds[0].pipe_offset, 1);
        assert_eq!(cmds[0].process_index, None);
    }

    #[test]
    fn numbered_pipe_parses_offset() {
        let cmds = build_commands(vec![seg(&["cat", "|3"])]);
        assert_eq!(cmds[0].pipe_offset, 3);
    }

    #[test]
    fn offset_parse_is_atoi_style() {
        let cmds = build_commands(vec![seg(&["a", "|2x"]), seg(&["b", "|x"])]);
        assert_eq!(cmds[0].pipe_offset, 2);
        assert_eq!(cmds[1].pipe_offset, 0);
    }

    #[test]
    fn extracts_output_redirect() {
        let cmds = build_commands(vec![seg(&["ls", ">", "out.txt"])]);
        assert_eq!(cmds[0].argv, vec!["ls"]);
        assert_eq!(cmds[0].output_file.as_deref(), Some("out.txt"));
    }

    #[test]
    fn redirect_needs_more_than_two_tokens() {
        // A two-token segment never counts as a redirect.
        let cmds = build_commands(vec![seg(&[">", "out.txt"])]);
        assert_eq!(cmds[0].argv, vec![">", "out.txt"]);
        assert_eq!(cmds[0].output_file, None);
    }

    #[test]
    fn pipe_token_extracted_before_redirect() {
        let cmds = build_commands(vec![seg(&["ls", ">", "out.txt", "|"])]);
        assert_eq!(cmds[0].pipe_offset, 1);
        assert_eq!(cmds[0].output_file.as_deref(), Some("out.txt"));
        assert_eq!(cmds[0].argv, vec!["ls"]);
    }

    #[test]
    fn lone_pipe_segment_is_dropped() {
        assert!(build_commands(vec![seg(&["|"])]).is_empty());
    }
}
