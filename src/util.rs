const LABEL_MAX_CHARS: usize = 10;
const LABEL_KEEP_CHARS: usize = 5;

/// Short on-canvas label: the full id up to ten characters, otherwise the first and
/// last five joined by an ellipsis.
pub fn node_label(id: &str) -> String {
    let count = id.chars().count();
    if count <= LABEL_MAX_CHARS {
        return id.to_owned();
    }

    let head = id.chars().take(LABEL_KEEP_CHARS).collect::<String>();
    let tail = id.chars().skip(count - LABEL_KEEP_CHARS).collect::<String>();
    format!("{head}…{tail}")
}
