//! A tolerant LaTeX node walker.
//!
//! Produces a flat-per-level node tree: text runs (whitespace included),
//! comments, brace groups, macros with arguments, environments and math.
//! Macro arguments follow a small built-in argument table; macros not in the
//! table take no arguments and any braces after them become `Group` nodes.
//!
//! Parsing never fails. Unclosed groups, environments and math regions end at
//! the end of the input, and a stray closing brace is kept as text.

/// One argument slot of a macro or environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// `*`
    Star,
    /// `[ ... ]`
    Optional,
    /// `{ ... }`
    Mandatory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroArg {
    pub kind: ArgKind,
    pub nodes: Vec<Node>,
}

impl MacroArg {
    /// Text of the first node when that node is a text run.
    pub fn first_chars(&self) -> Option<&str> {
        match self.nodes.first()? {
            Node::Chars(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroNode {
    pub name: String,
    /// One entry per slot of the macro's argument spec; `None` when absent.
    pub args: Vec<Option<MacroArg>>,
}

impl MacroNode {
    pub fn arg(&self, slot: usize) -> Option<&MacroArg> {
        self.args.get(slot)?.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentNode {
    pub name: String,
    pub args: Vec<Option<MacroArg>>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathNode {
    pub display: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Chars(String),
    Comment(String),
    Group(Vec<Node>),
    Macro(MacroNode),
    Environment(EnvironmentNode),
    Math(MathNode),
}

impl Node {
    pub fn as_macro(&self) -> Option<&MacroNode> {
        match self {
            Node::Macro(m) => Some(m),
            _ => None,
        }
    }

    /// True for a macro node with the given name.
    pub fn is_macro(&self, name: &str) -> bool {
        self.as_macro().is_some_and(|m| m.name == name)
    }

    /// Child nodes of a group or environment.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Group(nodes) => Some(nodes),
            Node::Environment(env) => Some(&env.children),
            _ => None,
        }
    }
}

/// Argument spec of the macros the walker knows about.
fn macro_arg_spec(name: &str) -> &'static str {
    match name {
        "part" | "chapter" | "section" | "subsection" | "subsubsection" | "paragraph" | "subparagraph" => "*[{",
        "input" | "include" | "label" | "ref" | "eqref" | "cite" | "url" => "{",
        "includegraphics" => "*[{",
        "documentclass" | "usepackage" => "[{",
        "caption" => "[{",
        "textbf" | "textit" | "emph" | "underline" | "texttt" | "textsc" | "textsf" | "textrm" | "mbox" => "{",
        "href" => "{{",
        "newcommand" | "renewcommand" => "*{[[{",
        "end" => "{",
        _ => "",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    Brace,
    Bracket,
    End,
}

/// Parse `src` into top-level nodes.
pub fn parse(src: &str) -> Vec<Node> {
    let mut walker = Walker { src, pos: 0 };
    walker.parse_nodes(Stop::Eof)
}

struct Walker<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Walker<'a> {
    fn rest(&self) -> &'a str { &self.src[self.pos..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn parse_nodes(&mut self, stop: Stop) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '}' if stop == Stop::Brace => break,
                ']' if stop == Stop::Bracket => break,
                '}' => {
                    self.bump();
                    nodes.push(Node::Chars("}".to_string()));
                }
                '%' => nodes.push(self.parse_comment()),
                '{' => {
                    self.bump();
                    let children = self.parse_nodes(Stop::Brace);
                    self.eat('}');
                    nodes.push(Node::Group(children));
                }
                '$' => nodes.push(self.parse_dollar_math()),
                '\\' => {
                    if stop == Stop::End && self.rest().starts_with("\\end") && !starts_with_letter(&self.rest()[4..]) {
                        break;
                    }
                    nodes.push(self.parse_escape());
                }
                _ => nodes.push(self.parse_chars(stop)),
            }
        }
        nodes
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_chars(&mut self, stop: Stop) -> Node {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '\\' | '{' | '}' | '%' | '$') || (c == ']' && stop == Stop::Bracket) {
                break;
            }
            self.bump();
        }
        Node::Chars(self.src[start..self.pos].to_string())
    }

    fn parse_comment(&mut self) -> Node {
        self.bump();
        let rest = self.rest();
        let len = rest.find('\n').unwrap_or(rest.len());
        self.pos += len;
        Node::Comment(rest[..len].to_string())
    }

    fn parse_dollar_math(&mut self) -> Node {
        let display = self.rest().starts_with("$$");
        let delim = if display { "$$" } else { "$" };
        self.pos += delim.len();
        let content = self.take_until(delim);
        Node::Math(MathNode { display, content })
    }

    /// Consume up to and including `delim`, returning the text before it.
    fn take_until(&mut self, delim: &str) -> String {
        let rest = self.rest();
        match rest.find(delim) {
            Some(idx) => {
                self.pos += idx + delim.len();
                rest[..idx].to_string()
            }
            None => {
                self.pos = self.src.len();
                rest.to_string()
            }
        }
    }

    fn parse_escape(&mut self) -> Node {
        self.bump();
        let Some(c) = self.peek() else {
            return Node::Chars("\\".to_string());
        };
        if !c.is_ascii_alphabetic() {
            self.bump();
            return match c {
                '[' => Node::Math(MathNode { display: true, content: self.take_until("\\]") }),
                '(' => Node::Math(MathNode { display: false, content: self.take_until("\\)") }),
                _ => Node::Macro(MacroNode { name: c.to_string(), args: Vec::new() }),
            };
        }
        let name = self.read_letters();
        if name == "begin" {
            return self.parse_environment();
        }
        let spec = macro_arg_spec(&name);
        if spec.is_empty() {
            self.skip_inline_space();
        }
        let args = self.parse_args(spec);
        Node::Macro(MacroNode { name, args })
    }

    fn read_letters(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn skip_inline_space(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.bump();
        }
    }

    fn parse_environment(&mut self) -> Node {
        let name = self.parse_args("{").pop().flatten().and_then(|arg| arg.first_chars().map(str::trim).map(String::from));
        let name = name.unwrap_or_default();
        let args = if self.peek() == Some('[') { self.parse_args("[") } else { Vec::new() };
        let children = self.parse_nodes(Stop::End);
        self.eat_end(&name);
        Node::Environment(EnvironmentNode { name, args, children })
    }

    /// Consume `\end{name}` when it closes the current environment.
    fn eat_end(&mut self, name: &str) {
        let start = self.pos;
        if !self.rest().starts_with("\\end") {
            return;
        }
        self.pos += "\\end".len();
        let closing = self.parse_args("{").pop().flatten();
        let matches = closing.as_ref().and_then(MacroArg::first_chars).is_some_and(|n| n.trim() == name);
        if !matches {
            // closes an enclosing environment; this one ends unclosed
            self.pos = start;
        }
    }

    fn parse_args(&mut self, spec: &str) -> Vec<Option<MacroArg>> {
        spec.chars().map(|slot| self.parse_arg(slot)).collect()
    }

    fn parse_arg(&mut self, slot: char) -> Option<MacroArg> {
        let start = self.pos;
        match slot {
            '*' => {
                if self.eat('*') {
                    return Some(MacroArg { kind: ArgKind::Star, nodes: Vec::new() });
                }
                None
            }
            '[' => {
                self.skip_inline_space();
                if self.eat('[') {
                    let nodes = self.parse_nodes(Stop::Bracket);
                    self.eat(']');
                    return Some(MacroArg { kind: ArgKind::Optional, nodes });
                }
                self.pos = start;
                None
            }
            _ => {
                self.skip_whitespace();
                if self.eat('{') {
                    let nodes = self.parse_nodes(Stop::Brace);
                    self.eat('}');
                    return Some(MacroArg { kind: ArgKind::Mandatory, nodes });
                }
                self.pos = start;
                None
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }
}

fn starts_with_letter(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
