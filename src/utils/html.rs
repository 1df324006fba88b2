use crate::models::question::CreateQuestionRequest;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags
/// (like <script>, <iframe>) and event-handler attributes are stripped.
/// Question text is rendered by every client, so it goes through here before storage.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes every free-text field of a question form in place.
pub fn clean_question(req: &mut CreateQuestionRequest) {
    req.text = clean_html(req.text.trim());
    req.category = clean_html(req.category.trim());
    req.explanation = clean_html(req.explanation.trim());
    for opt in &mut req.options {
        *opt = clean_html(opt.trim());
    }
}
