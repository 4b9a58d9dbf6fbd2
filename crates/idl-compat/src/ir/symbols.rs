//! Named-symbol table of a parsed file.

use std::collections::HashMap;

use super::{EnumType, ScalarType, Struct};

/// A named declaration a type reference can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Type(ScalarType),
    Enum(EnumType),
    Struct(Struct),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(t) => &t.name,
            Symbol::Enum(e) => &e.name,
            Symbol::Struct(s) => &s.name,
        }
    }
}

/// Types, enums and structs visible from one file.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// Adds a symbol, handing back any previous one with the same name.
    pub fn insert(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.symbols.insert(symbol.name().to_string(), symbol)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn get_struct(&self, name: &str) -> Option<&Struct> {
        match self.symbols.get(name) {
            Some(Symbol::Struct(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
