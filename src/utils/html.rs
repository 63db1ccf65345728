use ammonia;

/// Clean user-submitted HTML (exam details) using the ammonia library.
///
/// Whitelist-based: safe formatting tags (<b>, <p>, <a href>) survive, while
/// <script>, <iframe> and event-handler attributes are stripped, including the
/// contents of <script>. Plain text passes through unchanged apart from
/// entity escaping of stray `<`/`>`.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
