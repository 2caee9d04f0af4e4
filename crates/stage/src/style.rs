/// An element's inline style declaration.
///
/// Property order is preserved so a snapshot taken from an element can be
/// restored to byte-identical css text later.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleDecl {
    props: Vec<(String, String)>,
}

impl StyleDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse css text of the form `"opacity: 0; transform: scale(1)"`.
    /// Entries without a colon are skipped.
    pub fn parse(text: &str) -> Self {
        let mut decl = StyleDecl::new();
        for chunk in text.split(';') {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            if let Some(colon) = chunk.find(':') {
                let name = chunk[..colon].trim();
                let value = chunk[colon + 1..].trim();
                if !name.is_empty() {
                    decl.set(name, value);
                }
            }
        }
        decl
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing an existing entry in place so property
    /// order stays stable across repeated writes.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.props.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.props.push((name.to_string(), value));
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let len_before = self.props.len();
        self.props.retain(|(n, _)| n != name);
        self.props.len() < len_before
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn to_css_text(&self) -> String {
        self.props
            .iter()
            .map(|(n, v)| format!("{}: {}", n, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let decl = StyleDecl::parse("opacity: 0; transform: translateY(16px)");
        assert_eq!(decl.get("opacity"), Some("0"));
        assert_eq!(decl.get("transform"), Some("translateY(16px)"));
        assert_eq!(decl.to_css_text(), "opacity: 0; transform: translateY(16px)");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut decl = StyleDecl::parse("opacity: 0; color: red");
        decl.set("opacity", "1");
        assert_eq!(decl.to_css_text(), "opacity: 1; color: red");
    }

    #[test]
    fn test_parse_skips_malformed_chunks() {
        let decl = StyleDecl::parse("opacity 0; ; color: blue;");
        assert_eq!(decl.get("opacity"), None);
        assert_eq!(decl.get("color"), Some("blue"));
    }

    #[test]
    fn test_remove() {
        let mut decl = StyleDecl::parse("opacity: 0; color: red");
        assert!(decl.remove("opacity"));
        assert!(!decl.remove("opacity"));
        assert_eq!(decl.to_css_text(), "color: red");
    }
}
