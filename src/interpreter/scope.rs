use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::DeclaredType;

use super::value::Value;

#[derive(Debug, Clone)]
pub(super) struct Symbol {
    pub(super) name: String,
    pub(super) declared_type: DeclaredType,
    pub(super) value: Value,
}

/// One lexical scope: symbols in declaration order plus a name index.
#[derive(Debug, Default)]
pub(super) struct Scope {
    symbols: Vec<Symbol>,
    index: FxHashMap<String, usize>,
}

impl Scope {
    /// Returns the symbol back when the name is already declared here.
    pub(super) fn declare(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        if self.index.contains_key(&symbol.name) {
            return Err(symbol);
        }
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&slot| &self.symbols[slot])
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.index.get(name).map(|&slot| &mut self.symbols[slot])
    }

    #[cfg(test)]
    pub(super) fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|symbol| symbol.name.as_str()).collect()
    }
}

/// Scope stack split into call frames. The bottom frame is the main
/// program; every function call pushes a frame whose first scope holds the
/// parameters. Lookups search the current frame innermost-first and then the
/// global scope, never a caller's frame.
#[derive(Debug)]
pub(super) struct ScopeStack {
    global: Scope,
    frames: Vec<Vec<Scope>>,
    declared: FxHashSet<String>,
}

impl ScopeStack {
    pub(super) fn new() -> Self {
        Self {
            global: Scope::default(),
            frames: vec![Vec::new()],
            declared: FxHashSet::default(),
        }
    }

    pub(super) fn push_scope(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(Scope::default());
        }
    }

    pub(super) fn pop_scope(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pop();
        }
    }

    pub(super) fn push_frame(&mut self, parameters: Scope) {
        for symbol in &parameters.symbols {
            self.declared.insert(symbol.name.clone());
        }
        self.frames.push(vec![parameters]);
    }

    pub(super) fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declares in the innermost scope; the global scope when the main
    /// program has no open block.
    pub(super) fn declare(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        self.declared.insert(symbol.name.clone());
        match self.frames.last_mut().and_then(|frame| frame.last_mut()) {
            Some(scope) => scope.declare(symbol),
            None => self.global.declare(symbol),
        }
    }

    pub(super) fn declare_global(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        self.declared.insert(symbol.name.clone());
        self.global.declare(symbol)
    }

    pub(super) fn lookup(&self, name: &str) -> Option<&Symbol> {
        let frame = self.frames.last()?;
        frame
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.global.get(name))
    }

    pub(super) fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let frame = self.frames.last_mut()?;
        if let Some(scope) = frame.iter_mut().rev().find(|scope| scope.get(name).is_some()) {
            return scope.get_mut(name);
        }
        self.global.get_mut(name)
    }

    /// Whether `name` was declared at any point of this run, visible or not.
    pub(super) fn was_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    #[cfg(test)]
    pub(super) fn global(&self) -> &Scope {
        &self.global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, value: f64) -> Symbol {
        Symbol {
            name: name.to_string(),
            declared_type: DeclaredType::Integer,
            value: Value::Number(value),
        }
    }

    fn number(stack: &ScopeStack, name: &str) -> Option<f64> {
        match stack.lookup(name).map(|symbol| &symbol.value) {
            Some(Value::Number(value)) => Some(*value),
            _ => None,
        }
    }

    #[test]
    fn inner_scope_shadows_and_pops() {
        let mut stack = ScopeStack::new();
        stack.declare(symbol("x", 1.0)).unwrap();
        stack.push_scope();
        stack.declare(symbol("x", 2.0)).unwrap();
        assert_eq!(number(&stack, "x"), Some(2.0));
        stack.pop_scope();
        assert_eq!(number(&stack, "x"), Some(1.0));
    }

    #[test]
    fn rejects_redeclaration_in_same_scope() {
        let mut stack = ScopeStack::new();
        stack.declare(symbol("x", 1.0)).unwrap();
        assert!(stack.declare(symbol("x", 2.0)).is_err());
    }

    #[test]
    fn call_frame_hides_caller_blocks_but_not_globals() {
        let mut stack = ScopeStack::new();
        stack.declare(symbol("global", 1.0)).unwrap();
        stack.push_scope();
        stack.declare(symbol("local", 2.0)).unwrap();

        stack.push_frame(Scope::default());
        assert_eq!(number(&stack, "global"), Some(1.0));
        assert!(stack.lookup("local").is_none());
        assert!(stack.was_declared("local"));
        stack.pop_frame();

        assert_eq!(number(&stack, "local"), Some(2.0));
    }

    #[test]
    fn keeps_declaration_order() {
        let mut stack = ScopeStack::new();
        stack.declare(symbol("b", 1.0)).unwrap();
        stack.declare(symbol("a", 2.0)).unwrap();
        assert_eq!(stack.global().names(), ["b", "a"]);
    }
}
