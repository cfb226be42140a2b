use serde_json::Number;

/// Plain decimal text for a JSON number; never uses exponent notation.
pub fn format_json_number(number: &Number) -> String {
    if let Some(value) = number.as_i64() {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value).to_string();
    }
    if let Some(value) = number.as_u64() {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value).to_string();
    }
    match number.as_f64() {
        Some(value) => format_f64(value),
        None => number.to_string(),
    }
}

/// Shortest text that parses back to `value`.
///
/// Non-finite values use the spellings `str::parse::<f64>` accepts.
pub fn format_f64(value: f64) -> String {
    if let Some(text) = non_finite(value.is_nan(), value.is_infinite(), value < 0.0) {
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu::Buffer::new();
    normalize_number_str(buffer.format_finite(value))
}

pub fn format_f32(value: f32) -> String {
    if let Some(text) = non_finite(value.is_nan(), value.is_infinite(), value < 0.0) {
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu::Buffer::new();
    normalize_number_str(buffer.format_finite(value))
}

fn non_finite(nan: bool, infinite: bool, negative: bool) -> Option<&'static str> {
    match (nan, infinite, negative) {
        (true, _, _) => Some("NaN"),
        (_, true, true) => Some("-inf"),
        (_, true, false) => Some("inf"),
        _ => None,
    }
}

fn normalize_number_str(raw: &str) -> String {
    if raw.contains('e') || raw.contains('E') {
        return expand_exponent(raw);
    }
    trim_number(raw.to_string())
}

fn expand_exponent(raw: &str) -> String {
    let (mantissa, exponent) = match raw.find(['e', 'E']) {
        Some(at) => (&raw[..at], &raw[at + 1..]),
        None => (raw, "0"),
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let exp: i32 = exponent.parse().unwrap_or(0);

    let mut digits = String::with_capacity(mantissa.len());
    let mut dot_pos = None;
    for ch in mantissa.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            '.' => dot_pos = Some(digits.len()),
            _ => {}
        }
    }

    let dot_pos = dot_pos.unwrap_or(digits.len()) as i32;
    let new_pos = dot_pos + exp;
    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if new_pos <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', new_pos.unsigned_abs() as usize));
        out.push_str(&digits);
        return trim_number(out);
    }

    let pos = new_pos as usize;
    if pos >= digits.len() {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', pos - digits.len()));
        return trim_number(out);
    }

    out.push_str(&digits[..pos]);
    out.push('.');
    out.push_str(&digits[pos..]);
    trim_number(out)
}

fn trim_number(mut value: String) -> String {
    if let Some(dot) = value.find('.') {
        let mut end = value.len();
        while end > dot + 1 && value.as_bytes()[end - 1] == b'0' {
            end -= 1;
        }
        value.truncate(end);
        if value.ends_with('.') {
            value.pop();
        }
    }
    if value
        .trim_start_matches('-')
        .bytes()
        .all(|byte| byte == b'0' || byte == b'.')
    {
        return "0".to_string();
    }
    value
}
