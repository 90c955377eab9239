//! Reader for the textual atom form.
//!
//! ```text
//! ; comment to end of line
//! (Define (Schema "double") (Add (Variable "$x") (Variable "$x")))
//! (Concatenate (Type "List") (Link (Link (Concept "a"))))
//! ```
//!
//! Leaves are `(TypeName "name")` with `\"` and `\\` escapes; compounds are
//! `(TypeName child ...)`.
//!
//! Each top-level form is read completely before anything is added to the
//! target space, so a syntax error leaves the space untouched. A form that
//! reads but fails construction (bad arity, a conflicting binding) removes
//! the bindings it had already registered; the plain atoms it built stay
//! interned. Forms before the failing one in a multi-form input are kept.
//!
//! Errors are [`KernelError::MalformedInput`] with the byte offset of the
//! offending position.

use crate::error::{KernelError, KernelResult};
use crate::store::AtomSpace;
use crate::types::{AtomType, Handle};

/// Maximum nesting depth accepted by the reader.
pub const MAX_NESTING: usize = 512;

/// Parse every top-level expression in `input` into `space`.
pub fn parse(space: &AtomSpace, input: &str) -> KernelResult<Vec<Handle>> {
    let mut reader = Reader::new(space, input);
    let mut atoms = Vec::new();
    loop {
        reader.skip_trivia();
        if reader.at_end() {
            return Ok(atoms);
        }
        let form = reader.form(0)?;
        atoms.push(build_form(space, &form)?);
    }
}

/// Parse exactly one expression.
pub fn parse_one(space: &AtomSpace, input: &str) -> KernelResult<Handle> {
    let mut reader = Reader::new(space, input);
    reader.skip_trivia();
    if reader.at_end() {
        return Err(KernelError::malformed(reader.pos, "empty input"));
    }
    let form = reader.form(0)?;
    reader.skip_trivia();
    if !reader.at_end() {
        return Err(KernelError::malformed(reader.pos, "trailing input after expression"));
    }
    build_form(space, &form)
}

/// A form that has been read but not yet added to a space.
enum Form {
    Leaf {
        atom_type: AtomType,
        name: String,
        at: usize,
    },
    Compound {
        atom_type: AtomType,
        children: Vec<Form>,
        at: usize,
    },
}

/// Add a read form to `space`, undoing its new bindings on failure.
fn build_form(space: &AtomSpace, form: &Form) -> KernelResult<Handle> {
    let mut registered = Vec::new();
    let built = build(space, form, &mut registered);
    if built.is_err() {
        for binding in registered.iter().rev() {
            space.remove_binding(binding);
        }
    }
    built
}

fn build(space: &AtomSpace, form: &Form, registered: &mut Vec<Handle>) -> KernelResult<Handle> {
    match form {
        Form::Leaf {
            atom_type,
            name,
            at,
        } => space
            .add_node(*atom_type, name.as_str())
            .map_err(|e| located(*at, e)),
        Form::Compound {
            atom_type,
            children,
            at,
        } => {
            let outgoing = children
                .iter()
                .map(|child| build(space, child, registered))
                .collect::<KernelResult<Vec<_>>>()?;
            let (atom, inserted) = space
                .add_link_tracked(*atom_type, outgoing)
                .map_err(|e| located(*at, e))?;
            if inserted {
                registered.push(atom.clone());
            }
            Ok(atom)
        }
    }
}

struct Reader<'a> {
    space: &'a AtomSpace,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(space: &'a AtomSpace, input: &'a str) -> Self {
        Self {
            space,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b';' => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b if b.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn expect(&mut self, want: u8) -> KernelResult<()> {
        match self.peek() {
            Some(b) if b == want => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(KernelError::malformed(
                self.pos,
                format!("expected '{}', found '{}'", want as char, b as char),
            )),
            None => Err(KernelError::malformed(
                self.pos,
                format!("expected '{}', found end of input", want as char),
            )),
        }
    }

    fn form(&mut self, depth: usize) -> KernelResult<Form> {
        if depth >= MAX_NESTING {
            return Err(KernelError::malformed(self.pos, "nesting too deep"));
        }
        self.expect(b'(')?;
        self.skip_trivia();

        let type_at = self.pos;
        let type_name = self.symbol();
        if type_name.is_empty() {
            return Err(KernelError::malformed(type_at, "expected type name"));
        }
        let atom_type = self
            .space
            .registry()
            .from_name(type_name)
            .ok_or_else(|| KernelError::malformed(type_at, format!("unknown type {type_name:?}")))?;

        self.skip_trivia();
        if atom_type.is_node() {
            let name_at = self.pos;
            let name = self.string()?;
            self.skip_trivia();
            self.expect(b')')?;
            return Ok(Form::Leaf {
                atom_type,
                name,
                at: name_at,
            });
        }

        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(b'(') => children.push(self.form(depth + 1)?),
                Some(b) => {
                    return Err(KernelError::malformed(
                        self.pos,
                        format!("expected '(' or ')', found '{}'", b as char),
                    ))
                }
                None => return Err(KernelError::malformed(self.pos, "unexpected end of input")),
            }
        }
        Ok(Form::Compound {
            atom_type,
            children,
            at: type_at,
        })
    }

    fn symbol(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // ASCII-only range, always a char boundary.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }

    fn string(&mut self) -> KernelResult<String> {
        let start = self.pos;
        self.expect(b'"')?;
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => return Err(KernelError::malformed(start, "unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                        None => return Err(KernelError::malformed(start, "unterminated string")),
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(out).map_err(|e| KernelError::malformed(start, e.to_string()))
    }
}

/// Construction failures surface as malformed input at the form's offset;
/// binding violations pass through unchanged.
fn located(offset: usize, err: KernelError) -> KernelError {
    match err {
        KernelError::Construction { atom_type, reason } => {
            KernelError::malformed(offset, format!("{atom_type}: {reason}"))
        }
        other => other,
    }
}
