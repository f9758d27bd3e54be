//! Text cleanup for feed fields.

/// Remove every `<![CDATA[` and `]]>` marker.
pub fn strip_cdata(s: &str) -> String {
    s.replace("<![CDATA[", "").replace("]]>", "")
}

/// Remove `<...>` markup. A `<` with no closing `>` is kept.
pub fn strip_tags(s: &str) -> String {
    strip_markup(s, |_| true)
}

/// Remove only tag-shaped markup: `<` directly followed by an ASCII
/// letter, `/` or `!`. Comparisons such as `3 < 4` survive.
pub fn strip_tag_shapes(s: &str) -> String {
    strip_markup(s, |c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn strip_markup(s: &str, opens_tag: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let is_tag = after.chars().next().is_some_and(&opens_tag);
        match after.find('>') {
            Some(close) if close > 0 && is_tag => rest = &after[close + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode XML/HTML character references.
///
/// Named references outside the common set are left untouched, as is
/// any `&` that does not start a reference.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markup-free plain text for titles and descriptions.
pub fn clean_text(raw: &str) -> String {
    let text = strip_tags(&strip_cdata(raw));
    // Escaped markup (`&lt;p&gt;`) only becomes visible after decoding.
    let text = strip_tag_shapes(&decode_entities(&text));
    collapse_whitespace(&text)
}

/// Clean a URL-valued field (link, guid, attribute).
pub fn clean_url(raw: &str) -> String {
    decode_entities(strip_cdata(raw).trim())
}

/// Keep at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
