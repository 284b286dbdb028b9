use crate::tokenizer::Tokenizer;

/// Split a raw command line into pipeline segments.
///
/// Returns `None` when the line contains a path separator: executables may
/// only be named bare and found through PATH, never invoked by explicit path.
/// The caller is expected to report the refusal to the user.
///
/// Otherwise the line is tokenized and partitioned: any token containing a
/// pipe symbol closes the current segment (the pipe token itself stays in the
/// segment it closes), and a trailing run of tokens with no closing pipe
/// becomes the final segment.
pub fn parse_line(tokenizer: &dyn Tokenizer, line: &str) -> Option<Vec<Vec<String>>> {
    if line.contains('/') {
        return None;
    }

    let mut segments = Vec::new();
    let mut current = Vec::new();

    for token in tokenizer.split(line) {
        let is_pipe_token = token.contains('|');
        current.push(token);

        if is_pipe_token {
            segments.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    Some(segments)
}
