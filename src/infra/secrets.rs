use std::panic;

const REDACTED: &str = "[REDACTED]";

const MIN_TOKEN_SECRET_LEN: usize = 30;

/// Replaces anything shaped like a bot token (`<digits>:<secret>`) with a marker.
///
/// Tokens embedded in Bot API URLs (`/bot<token>/sendMessage`) are caught too.
pub fn redact_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chunk = String::new();

    for ch in input.chars() {
        if is_separator(ch) {
            push_redacted(&mut output, &chunk);
            chunk.clear();
            output.push(ch);
        } else {
            chunk.push(ch);
        }
    }
    push_redacted(&mut output, &chunk);

    output
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "tgcast panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("tgcast panic: {}", scrubbed);
        }
    }));
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '/' | '?' | '&' | '=' | '"' | '\'' | '(' | ')')
}

fn push_redacted(output: &mut String, chunk: &str) {
    let candidate = chunk.strip_prefix("bot").unwrap_or(chunk);

    if looks_like_bot_token(candidate) || looks_like_bot_token(chunk) {
        output.push_str(REDACTED);
    } else {
        output.push_str(chunk);
    }
}

fn looks_like_bot_token(value: &str) -> bool {
    let Some((bot_id, secret)) = value.split_once(':') else {
        return false;
    };

    !bot_id.is_empty()
        && bot_id.chars().all(|ch| ch.is_ascii_digit())
        && secret.len() >= MIN_TOKEN_SECRET_LEN
        && secret
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
