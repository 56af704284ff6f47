use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A symbol value. Two symbols are the same only if they were created by the same
/// `SymbolData::new` call; the description is informational.
pub struct SymbolData {
    id: Uuid,
    description: String,
}

impl SymbolData {
    pub fn new(description: String) -> Self {
        SymbolData {
            id: Uuid::new_v4(),
            description,
        }
    }
}
impl Clone for SymbolData {
    fn clone(&self) -> Self {
        SymbolData {
            id: self.id,
            description: self.description.to_string(),
        }
    }
}
impl PartialEq for SymbolData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for SymbolData {}
impl Hash for SymbolData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Display for SymbolData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}
impl fmt::Debug for SymbolData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.description, self.id.to_simple())
    }
}

/* Well known symbols */
lazy_static! {
    pub static ref SYMBOL_HAS_INSTANCE: SymbolData =
        SymbolData::new("Symbol.hasInstance".to_string());
}
