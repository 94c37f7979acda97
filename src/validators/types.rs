//! Type expressions used in tag type lists.
//!
//! Grammar, informally:
//!
//! ```text
//! list  := expr ("," expr)*
//! expr  := "#" ident                    duck type
//!        | ":" ident                    symbol
//!        | quoted                       string literal
//!        | name "<" list ">"            generic collection
//!        | name "(" list ")"            fixed collection
//!        | name "{" list "=>" list "}"  hash
//!        | name
//! name  := "::"? ident ("::" ident)*
//! ```

use std::fmt;

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A constant or literal name (`String`, `Foo::Bar`, `nil`, `true`).
    Name(String),
    /// `#to_s`
    Duck(String),
    /// `:symbol`
    Symbol(String),
    /// `'text'` or `"text"`
    Literal(String),
    /// `Array<String>`
    Generic { name: String, args: Vec<TypeExpr> },
    /// `Array(String, Integer)`
    Fixed { name: String, items: Vec<TypeExpr> },
    /// `Hash{Symbol => String}`
    Hash {
        name: String,
        keys: Vec<TypeExpr>,
        values: Vec<TypeExpr>,
    },
}

impl TypeExpr {
    /// Every constant name referenced by this expression.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Name(name) => out.push(name),
            TypeExpr::Duck(_) | TypeExpr::Symbol(_) | TypeExpr::Literal(_) => {}
            TypeExpr::Generic { name, args } => {
                out.push(name);
                args.iter().for_each(|a| a.collect_names(out));
            }
            TypeExpr::Fixed { name, items } => {
                out.push(name);
                items.iter().for_each(|i| i.collect_names(out));
            }
            TypeExpr::Hash { name, keys, values } => {
                out.push(name);
                keys.iter().chain(values).for_each(|t| t.collect_names(out));
            }
        }
    }

    /// Visit this expression and every nested one.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TypeExpr)) {
        visit(self);
        match self {
            TypeExpr::Generic { args, .. } => args.iter().for_each(|a| a.walk(visit)),
            TypeExpr::Fixed { items, .. } => items.iter().for_each(|i| i.walk(visit)),
            TypeExpr::Hash { keys, values, .. } => {
                keys.iter().chain(values).for_each(|t| t.walk(visit))
            }
            _ => {}
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => f.write_str(name),
            TypeExpr::Duck(name) => write!(f, "#{}", name),
            TypeExpr::Symbol(name) => write!(f, ":{}", name),
            TypeExpr::Literal(text) => write!(f, "'{}'", text),
            TypeExpr::Generic { name, args } => {
                write!(f, "{}<", name)?;
                write_list(f, args)?;
                f.write_str(">")
            }
            TypeExpr::Fixed { name, items } => {
                write!(f, "{}(", name)?;
                write_list(f, items)?;
                f.write_str(")")
            }
            TypeExpr::Hash { name, keys, values } => {
                write!(f, "{}{{", name)?;
                write_list(f, keys)?;
                f.write_str(" => ")?;
                write_list(f, values)?;
                f.write_str("}")
            }
        }
    }
}

/// Why a type expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntaxError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for TypeSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

/// Parse a comma-separated list of type expressions.
pub fn parse_types(input: &str) -> Result<Vec<TypeExpr>, TypeSyntaxError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let list = parser.list()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{}'", c)));
    }
    Ok(list)
}

/// Deepest nesting of `<>`, `()` and `{}` a type expression may use.
pub const MAX_NESTING: usize = 64;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn eat(&mut self, expected: &str) -> bool {
        self.skip_ws();
        let end = self.pos + expected.chars().count();
        if end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(expected.chars())
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &str) -> Result<(), TypeSyntaxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn list(&mut self) -> Result<Vec<TypeExpr>, TypeSyntaxError> {
        let mut items = vec![self.expr()?];
        while self.eat(",") {
            items.push(self.expr()?);
        }
        Ok(items)
    }

    /// Parse a bracketed list one level deeper.
    fn nested_list(&mut self) -> Result<Vec<TypeExpr>, TypeSyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_NESTING)));
        }
        self.depth += 1;
        let list = self.list();
        self.depth -= 1;
        list
    }

    fn ident(&mut self) -> Result<String, TypeSyntaxError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '?' | '!'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn name(&mut self) -> Result<String, TypeSyntaxError> {
        let mut name = String::new();
        if self.eat("::") {
            name.push_str("::");
        }
        self.skip_ws();
        name.push_str(&self.ident()?);
        while self.peek() == Some(':') && self.chars.get(self.pos + 1) == Some(&':') {
            self.pos += 2;
            name.push_str("::");
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn expr(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of type")),
            Some('#') => {
                self.pos += 1;
                Ok(TypeExpr::Duck(self.ident()?))
            }
            Some(':') if self.chars.get(self.pos + 1) != Some(&':') => {
                self.pos += 1;
                Ok(TypeExpr::Symbol(self.ident()?))
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated string literal"));
                }
                let text = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(TypeExpr::Literal(text))
            }
            Some(_) => {
                let name = self.name()?;
                self.skip_ws();
                match self.peek() {
                    Some('<') => {
                        self.pos += 1;
                        let args = self.nested_list()?;
                        self.expect(">")?;
                        Ok(TypeExpr::Generic { name, args })
                    }
                    Some('(') => {
                        self.pos += 1;
                        let items = self.nested_list()?;
                        self.expect(")")?;
                        Ok(TypeExpr::Fixed { name, items })
                    }
                    Some('{') => {
                        self.pos += 1;
                        let keys = self.nested_list()?;
                        self.expect("=>")?;
                        let values = self.nested_list()?;
                        self.expect("}")?;
                        Ok(TypeExpr::Hash { name, keys, values })
                    }
                    _ => Ok(TypeExpr::Name(name)),
                }
            }
        }
    }
}
