//! Writers for text log fragments and JSON documents.

/// Escape a value for a double-quoted text log field.
pub fn escape_text_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Append ` key="value"` to a text log line, escaping the value.
pub fn append_text_field(buffer: &mut String, key: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(key);
    buffer.push_str("=\"");
    buffer.push_str(&escape_text_value(value));
    buffer.push('"');
}

/// A streaming JSON writer that tracks commas between members.
///
/// All leaf values are written as JSON strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonBuffer {
    out: String,
    // One entry per open object or array: whether it has no members yet.
    scopes: Vec<bool>,
}

impl JsonBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an object, as a member when `key` is given.
    pub fn begin_object(&mut self, key: Option<&str>) {
        self.start_member(key);
        self.out.push('{');
        self.scopes.push(true);
    }

    /// Close the innermost object.
    pub fn end_object(&mut self) {
        self.scopes.pop();
        self.out.push('}');
    }

    /// Open an array, as a member when `key` is given.
    pub fn begin_array(&mut self, key: Option<&str>) {
        self.start_member(key);
        self.out.push('[');
        self.scopes.push(true);
    }

    /// Close the innermost array.
    pub fn end_array(&mut self) {
        self.scopes.pop();
        self.out.push(']');
    }

    /// Append a string member (`"key":"value"`) or array element (`"value"`).
    pub fn append_string(&mut self, key: Option<&str>, value: &str) {
        self.start_member(key);
        self.out.push_str(&quote(value));
    }

    /// The document written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the buffer, returning the document.
    pub fn into_string(self) -> String {
        self.out
    }

    fn start_member(&mut self, key: Option<&str>) {
        if let Some(first) = self.scopes.last_mut() {
            if *first {
                *first = false;
            } else {
                self.out.push(',');
            }
        }
        if let Some(key) = key {
            self.out.push_str(&quote(key));
            self.out.push(':');
        }
    }
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}
