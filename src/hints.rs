/// A hint to paint after the buffer: an optional argument template (e.g.
/// `"[src] [dst]"`) and a free-form description, plus the ANSI color used to
/// render both.
#[derive(Debug, Clone)]
pub struct Hint {
    pub args_template: String,
    pub description: String,
    /// ANSI SGR parameters, e.g. `"90"` for bright black.
    pub color: String,
}

impl Hint {
    pub fn new(args_template: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            args_template: args_template.into(),
            description: description.into(),
            color: "90".to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Produces an inline hint for the current buffer, or `None`.
pub trait HintsProducer {
    fn hint(&mut self, buf: &str) -> Option<Hint>;
}

/// Default producer for hosts with no hints source.
pub struct NoHints;

impl HintsProducer for NoHints {
    fn hint(&mut self, _buf: &str) -> Option<Hint> {
        None
    }
}

/// Splits `"[a] [b] [c]"` into its bracketed placeholders, in order.
pub fn split_placeholders(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('[') {
        if let Some(end) = rest[start..].find(']') {
            out.push(&rest[start..=start + end]);
            rest = &rest[start + end + 1..];
        } else {
            break;
        }
    }
    out
}
