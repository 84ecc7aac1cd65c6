//! Identifier generation for fuzzing.

use arbitrary::{Arbitrary, Unstructured};

/// A variable name accepted by the default grammar.
#[derive(Debug, Clone)]
pub struct FuzzIdent(pub String);

impl FuzzIdent {
    pub fn to_source(&self) -> String {
        self.0.clone()
    }
}

impl<'a> Arbitrary<'a> for FuzzIdent {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        // Operation tokens of the default grammar
        const RESERVED: &[&str] = &["let", "print", "exit", "kill", "wait", "fork", "PPID"];

        // Small pool so that names are reused across statements
        const PREFIXES: &[&str] = &["x", "y", "z", "pid", "child", "n", "_tmp"];

        let prefix_idx: usize = u.arbitrary()?;
        let prefix = PREFIXES[prefix_idx % PREFIXES.len()];

        let add_suffix: bool = u.arbitrary()?;
        let ident = if add_suffix {
            let suffix: u8 = u.arbitrary()?;
            format!("{}{}", prefix, suffix % 10)
        } else {
            prefix.to_string()
        };

        if RESERVED.contains(&ident.as_str()) {
            Ok(FuzzIdent(format!("{}_", ident)))
        } else {
            Ok(FuzzIdent(ident))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_generation() {
        let data = [0u8; 32];
        let mut u = Unstructured::new(&data);
        let ident = FuzzIdent::arbitrary(&mut u).unwrap();
        assert!(!ident.0.is_empty());
        let first = ident.0.chars().next().unwrap();
        assert!(first.is_lowercase() || first == '_');
    }
}
