//! Rendered element tree and locator resolution

use std::ptr;

use crate::driver::Locator;

/// What interacting with an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Act {
    None,
    /// Text input bound to a form field
    Input(&'static str),
    /// Opens the options list of a dropdown field
    Dropdown(&'static str),
    /// Picks an option (or autocomplete suggestion) into a field
    Choose(&'static str, String),
    File,
    Press(Press),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Press {
    Login,
    ForgotPassword,
    UserMenu,
    Logout,
    Goto(&'static str),
    TopMenu(&'static str),
    Search,
    Reset,
    Add,
    Save,
    Cancel,
    Apply,
    CreateLogin,
    JobTab,
    Edit(Target),
    Delete(Target),
    ConfirmDelete,
    CancelDelete,
    Approve(u64),
    Reject(u64),
    DialogOk,
}

/// Row a table action applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Employee(u64),
    User(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    selectors: Vec<&'static str>,
    text: String,
    pub(crate) act: Act,
    children: Vec<Node>,
}

impl Node {
    pub(crate) fn new(selectors: &[&'static str]) -> Self {
        Self {
            selectors: selectors.to_vec(),
            text: String::new(),
            act: Act::None,
            children: Vec::new(),
        }
    }

    pub(crate) fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn act(mut self, act: Act) -> Self {
        self.act = act;
        self
    }

    pub(crate) fn press(self, press: Press) -> Self {
        self.act(Act::Press(press))
    }

    pub(crate) fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    fn matches(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| *s == selector)
    }

    /// Own text followed by every descendant's, like `textContent`
    pub(crate) fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    fn collect<'n>(&'n self, selector: &str, out: &mut Vec<&'n Node>) {
        for child in &self.children {
            if child.matches(selector) && !out.iter().any(|n| ptr::eq(*n, child)) {
                out.push(child);
            }
            child.collect(selector, out);
        }
    }

    /// Every match of `locator` below this node, in document order
    pub(crate) fn resolve<'n>(&'n self, locator: &Locator) -> Vec<&'n Node> {
        let scopes = match &locator.parent {
            Some(parent) => self.resolve(parent),
            None => vec![self],
        };

        let mut found = Vec::new();
        for scope in scopes {
            scope.collect(&locator.selector, &mut found);
        }

        if let Some(text) = &locator.has_text {
            let needle = text.to_lowercase();
            found.retain(|n| n.text_content().to_lowercase().contains(&needle));
        }

        match locator.index {
            Some(i) => found.into_iter().nth(i).into_iter().collect(),
            None => found,
        }
    }

    /// Indented outline of the tree, written in place of screenshots
    pub(crate) fn outline(&self, depth: usize, out: &mut String) {
        let selector = self.selectors.first().copied().unwrap_or("#root");
        out.push_str(&"  ".repeat(depth));
        out.push_str(selector);
        if !self.text.is_empty() {
            out.push_str(&format!(" \"{}\"", self.text));
        }
        out.push('\n');
        for child in &self.children {
            child.outline(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Node {
        let row = |id: &str, status: &str| {
            Node::new(&[".oxd-table-body .oxd-table-row"])
                .child(Node::new(&[".oxd-table-cell"]).text(id))
                .child(Node::new(&[".oxd-table-cell"]).text(status))
        };
        Node::new(&[]).child(
            Node::new(&[".oxd-table"])
                .child(row("1", "Pending Approval"))
                .child(row("2", "Scheduled")),
        )
    }

    #[test]
    fn test_resolve_nested_nth() {
        let root = table();
        let cell = Locator::css(".oxd-table-body .oxd-table-row")
            .nth(1)
            .child(".oxd-table-cell")
            .nth(1);
        let found = root.resolve(&cell);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text_content(), "Scheduled");
    }

    #[test]
    fn test_has_text_is_case_insensitive() {
        let root = table();
        let rows = Locator::css(".oxd-table-body .oxd-table-row").with_text("pending");
        assert_eq!(root.resolve(&rows).len(), 1);
        assert!(root.resolve(&Locator::css("h6")).is_empty());
    }
}
