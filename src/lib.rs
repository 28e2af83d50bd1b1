pub mod ast;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod tac;
pub mod token;
