/// Byte offsets of line starts, for mapping parser offsets to 1-based lines.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(contents: &str) -> Self {
        let mut starts = vec![0];
        for (idx, byte) in contents.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(idx + 1);
            }
        }
        LineIndex { starts }
    }

    pub(crate) fn line_of(&self, byte: usize) -> usize {
        self.starts.partition_point(|start| *start <= byte)
    }
}

/// Byte offset where the document body begins, past a leading YAML front
/// matter block. An unterminated block swallows the whole document.
pub(crate) fn front_matter_end(contents: &str) -> usize {
    let mut offset = 0usize;
    let mut active = false;

    for (idx, segment) in contents.split_inclusive('\n').enumerate() {
        let trimmed = segment.trim();
        offset += segment.len();

        if idx == 0 {
            if trimmed != "---" {
                return 0;
            }
            active = true;
            continue;
        }

        if active && (trimmed == "---" || trimmed == "...") {
            return offset;
        }
    }

    if active {
        contents.len()
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_offsets_to_lines() {
        let index = LineIndex::new("one\ntwo\n\nfour");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(4), 2);
        assert_eq!(index.line_of(8), 3);
        assert_eq!(index.line_of(9), 4);
    }

    #[test]
    fn skips_front_matter() {
        let contents = "---\ntitle: Example\n---\n# Body\n";
        assert_eq!(&contents[front_matter_end(contents)..], "# Body\n");
    }

    #[test]
    fn documents_without_front_matter_start_at_zero() {
        assert_eq!(front_matter_end("# Title\n---\n"), 0);
        assert_eq!(front_matter_end(""), 0);
    }

    #[test]
    fn unterminated_front_matter_consumes_everything() {
        let contents = "---\ntitle: Example\n# Not a heading\n";
        assert_eq!(front_matter_end(contents), contents.len());
    }
}
