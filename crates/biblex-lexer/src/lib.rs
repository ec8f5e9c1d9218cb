//! biblex-lexer - Tokenizer for BibTeX bibliography sources
//!
//! This crate turns a BibTeX buffer into a sequence of tokens for an entry
//! parser to consume.
//!
//! # Features
//!
//! - Two lexical modes: Root (between entries) and Entry (inside `@type{...}`)
//! - Raw braced and quoted values, nested braces balanced
//! - `%` comment lines skipped between entries
//! - Line, column and character offset on every token
//! - Truncated input reported as an `EndOfInput` token, never a panic
//!
//! # Example
//!
//! ```rust
//! use biblex_lexer::{Lexer, TokenKind};
//!
//! let source = r#"
//! @article{key,
//!   author = {Jones},
//!   title = "A Title"
//! }
//! "#;
//!
//! let mut lexer = Lexer::new(source, 0);
//! let tokens = lexer.tokenize().unwrap();
//!
//! assert_eq!(tokens[0].kind, TokenKind::At);
//! for token in &tokens {
//!     println!("{:?} {:?}", token.kind, token.text);
//! }
//! ```

pub mod lexer;
pub mod mode;
pub mod report;
pub mod token;

pub use lexer::{Lexer, Tokens, Truncation};
pub use mode::Mode;
pub use report::{check, tokenize};
pub use token::{Token, TokenKind};
