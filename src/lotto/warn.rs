fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if !ch.is_control() && ch != '=' {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WarnEvent<'a> {
    pub code: &'a str,
    pub stage: &'a str,
    pub action: &'a str,
    pub target: &'a str,
    pub reason: &'a str,
    pub err: &'a str,
}

impl WarnEvent<'_> {
    pub fn render(&self) -> String {
        format!(
            "LOTTO_WARN code={} stage={} action={} target={} reason={} err={}",
            sanitize_value(self.code),
            sanitize_value(self.stage),
            sanitize_value(self.action),
            sanitize_value(self.target),
            sanitize_value(self.reason),
            sanitize_value(self.err),
        )
    }
}

pub fn emit(event: WarnEvent<'_>) {
    eprintln!("{}", event.render());
}
