/// Escapes user text for an HTML email body, keeping line breaks as `<br>`.
pub fn escape_multiline(input: &str) -> String {
    input
        .lines()
        .map(ammonia::clean_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

pub fn escape(input: &str) -> String {
    ammonia::clean_text(input)
}
