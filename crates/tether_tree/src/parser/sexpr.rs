//! A small s-expression language used by the CLI demos and the tests.
//!
//! `(class Main (method run) (field count))` parses into a `class` node named
//! `Main` with two children. The first atom of a form is its kind, a second
//! atom becomes its name; further atoms are ignored. Forms without a head atom
//! get the kind `list`. `;` starts a comment running to the end of the line.

use super::{Parser, TreeBuilder};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(text: &str) -> Vec<(Token<'_>, u32, u32)> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                tokens.push((Token::Open, i as u32, i as u32 + 1));
                i += 1;
            }
            b')' => {
                tokens.push((Token::Close, i as u32, i as u32 + 1));
                i += 1;
            }
            b';' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < bytes.len()
                    && !matches!(bytes[i], b'(' | b')' | b';')
                    && !bytes[i].is_ascii_whitespace()
                {
                    i += 1;
                }
                tokens.push((Token::Atom(&text[start..i]), start as u32, i as u32));
            }
        }
    }
    tokens
}

/// Parser for `(kind name ...)` forms.
#[derive(Clone, Copy, Debug, Default)]
pub struct SexprParser;

impl Parser for SexprParser {
    fn parse(&self, text: &str, builder: &mut TreeBuilder) {
        let tokens = tokenize(text);
        // Atoms consumed so far by each open form.
        let mut atoms: Vec<usize> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let (token, start, end) = tokens[i];
            match token {
                Token::Open => {
                    match tokens.get(i + 1) {
                        Some(&(Token::Atom(head), _, _)) => {
                            builder.start_node(head, start);
                            atoms.push(1);
                            i += 1;
                        }
                        _ => {
                            builder.start_node("list", start);
                            atoms.push(1);
                        }
                    }
                }
                Token::Close => {
                    if atoms.pop().is_some() {
                        builder.finish_node(end);
                    }
                }
                Token::Atom(atom) => {
                    if let Some(count) = atoms.last_mut() {
                        if *count == 1 {
                            builder.set_name(atom);
                        }
                        *count += 1;
                    }
                }
            }
            i += 1;
        }
    }
}
