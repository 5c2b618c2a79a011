use crate::instructions::{self, Descriptor};

use regex::Regex;

/// Classified operand token. The backend only ever inspects the class
/// and value; descriptor storage stays in the static table.
#[derive(Debug, Clone)]
pub enum Token {
    /// a mnemonic or modifier recognized in the instruction table
    Instr(&'static Descriptor),
    /// numeric literal (octal by default)
    Number(i64),
    /// identifier that is not a mnemonic
    Name(String),
    /// any other single character
    Char(char),
}

/// The seam between the generic front end and this backend: a token
/// stream with one-token lookahead-plus-pushback at both the character
/// and the token level, plus the front end's delay-buffer primitives.
///
/// The pushback discipline is what lets optional modifiers be
/// grammatically absent: peek one token, and if it doesn't match, push
/// it back unconsumed.
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Token>;
    fn unread_token(&mut self, t: Token);
    fn next_char(&mut self) -> Option<char>;
    fn unread_char(&mut self, c: char);

    /// Start deferring emission until `close` is seen in the input.
    fn delay_save(&mut self, close: char);
    /// Reconcile the deferred emission now.
    fn delay_reload(&mut self);
    /// True while a deferred emission is outstanding.
    fn delay_waiting(&self) -> bool;
}

/// Reference lexer over in-memory source text. Input is folded to
/// lowercase and '%' comments are stripped up front. Numbers are octal
/// unless they contain a digit 8 or 9, in which case they are read as
/// decimal.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    char_stack: Vec<char>,
    tok_stack: Vec<Token>,
    delay_close: Option<char>,
    waiting: bool,
}

lazy_static::lazy_static! {
    static ref RE_COMMENT: Regex = Regex::new(r"%[^\n]*").unwrap();
    static ref RE_OCTAL: Regex = Regex::new(r"^[0-7]+$").unwrap();
}

impl Lexer {
    pub fn new(src: &str) -> Lexer {
        let lowered = src.to_ascii_lowercase();
        let clean = RE_COMMENT.replace_all(&lowered, "");
        Lexer {
            chars: clean.chars().collect(),
            pos: 0,
            char_stack: Vec::new(),
            tok_stack: Vec::new(),
            delay_close: None,
            waiting: false,
        }
    }

    fn number(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        while let Some(c) = self.next_char() {
            if c.is_ascii_digit() {
                s.push(c);
            } else {
                self.unread_char(c);
                break;
            }
        }
        let val = if RE_OCTAL.is_match(&s) {
            i64::from_str_radix(&s, 8).unwrap_or(0)
        } else {
            s.parse::<i64>().unwrap_or(0)
        };
        Token::Number(val)
    }

    fn name(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        while let Some(c) = self.next_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                s.push(c);
            } else {
                self.unread_char(c);
                break;
            }
        }
        match instructions::name_to_descriptor(&s) {
            Some(desc) => Token::Instr(desc),
            None => Token::Name(s),
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Option<Token> {
        if let Some(t) = self.tok_stack.pop() {
            return Some(t);
        }
        loop {
            let c = self.next_char()?;
            if c == ' ' || c == '\t' {
                continue;
            }
            return Some(if c.is_ascii_digit() {
                self.number(c)
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.name(c)
            } else {
                Token::Char(c)
            });
        }
    }

    fn unread_token(&mut self, t: Token) { self.tok_stack.push(t) }

    fn next_char(&mut self) -> Option<char> {
        let c = match self.char_stack.pop() {
            Some(c) => c,
            None => {
                if self.pos >= self.chars.len() {
                    return None;
                }
                let c = self.chars[self.pos];
                self.pos += 1;
                c
            }
        };
        if self.delay_close == Some(c) {
            // capture complete; still waiting for the reload
            self.delay_close = None;
        }
        Some(c)
    }

    fn unread_char(&mut self, c: char) { self.char_stack.push(c) }

    fn delay_save(&mut self, close: char) {
        self.delay_close = Some(close);
        self.waiting = true;
    }

    fn delay_reload(&mut self) { self.waiting = false }

    fn delay_waiting(&self) -> bool { self.waiting }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::InstrClass;

    #[test]
    fn classifies_mnemonics_numbers_and_names() {
        let mut lx = Lexer::new("LDA ,x disp+10");
        match lx.next_token() {
            Some(Token::Instr(d)) => assert_eq!(d.class, InstrClass::Ea),
            t => panic!("expected instruction token, got {:?}", t),
        }
        assert!(matches!(lx.next_token(), Some(Token::Char(','))));
        // 'x' alone is not a mnemonic
        assert!(matches!(lx.next_token(), Some(Token::Name(ref s)) if s == "x"));
        assert!(matches!(lx.next_token(), Some(Token::Name(ref s)) if s == "disp"));
        assert!(matches!(lx.next_token(), Some(Token::Char('+'))));
        assert!(matches!(lx.next_token(), Some(Token::Number(8))));
        assert!(lx.next_token().is_none());
    }

    #[test]
    fn numbers_default_to_octal() {
        let mut lx = Lexer::new("17 19");
        assert!(matches!(lx.next_token(), Some(Token::Number(15))));
        // digits 8 and 9 force decimal
        assert!(matches!(lx.next_token(), Some(Token::Number(19))));
    }

    #[test]
    fn comments_are_stripped() {
        let mut lx = Lexer::new("wait % this text vanishes\nexit");
        assert!(matches!(lx.next_token(), Some(Token::Instr(d)) if d.name == "wait"));
        assert!(matches!(lx.next_token(), Some(Token::Char('\n'))));
        assert!(matches!(lx.next_token(), Some(Token::Instr(d)) if d.name == "exit"));
    }

    #[test]
    fn pushback_round_trips() {
        let mut lx = Lexer::new("sa 7");
        let t = lx.next_token().unwrap();
        lx.unread_token(t);
        assert!(matches!(lx.next_token(), Some(Token::Instr(d)) if d.name == "sa"));
        let c = lx.next_char().unwrap();
        assert_eq!(c, ' ');
        lx.unread_char(c);
        assert_eq!(lx.next_char(), Some(' '));
        assert!(matches!(lx.next_token(), Some(Token::Number(7))));
    }

    #[test]
    fn delay_waits_until_reload() {
        let mut lx = Lexer::new("x]y");
        lx.delay_save(']');
        assert!(lx.delay_waiting());
        while let Some(_c) = lx.next_char() {}
        // the closing bracket completes the capture but not the wait
        assert!(lx.delay_waiting());
        lx.delay_reload();
        assert!(!lx.delay_waiting());
    }
}
